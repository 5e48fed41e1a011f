use std::time::Duration;
use rand::Rng;

use crate::event::{Element, InputEvent, OutputEvent, ScreenId, Surface};
use crate::executor::{CLICK, DEFAULT_PORTRAIT};
use crate::runtime::{Ctx, Interval, Timers};

use super::Screen;

const FIRST_LINE: Duration = Duration::from_millis(2000);
const IDLE_PERIOD: Duration = Duration::from_millis(15000);
const COFFEE_LINE_HOLD: Duration = Duration::from_millis(8000);
const LINE_HOLD: Duration = Duration::from_millis(6000);
const SLURP_DELAY: Duration = Duration::from_millis(400);
const REACTION_HOLD: Duration = Duration::from_millis(10000);
const COFFEE_BREAK: Duration = Duration::from_millis(20000);
/// Idle lines that skip the coffee ones after a cup.
const COFFEE_COOLDOWN: u8 = 2;
const HAPPY_PORTRAIT: &str = "Mol_happy_coffee.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuTimer {
    FirstLine,
    HideBubble,
    Slurp,
    RestartIdle,
}

/// The hub. Mostly buttons, plus the narrator muttering to herself.
pub struct MenuScreen {
    idle: Interval,
    timers: Timers<MenuTimer>,
    last_line: Option<usize>,
    coffee_cooldown: u8,
    coffee_offered: bool,
    happy: bool,
}

impl MenuScreen {
    pub fn new() -> Self {
        Self {
            idle: Interval::stopped(IDLE_PERIOD),
            timers: Timers::default(),
            last_line: None,
            coffee_cooldown: 0,
            coffee_offered: false,
            happy: false,
        }
    }

    /// True while any menu timer could still fire.
    pub fn is_idling(&self) -> bool {
        self.idle.is_running() || !self.timers.is_empty()
    }

    pub fn coffee_offered(&self) -> bool {
        self.coffee_offered
    }

    fn portrait(&self, ctx: &mut Ctx, image: &str) {
        ctx.push(OutputEvent::SetImage { element: Element::Portrait(ScreenId::Menu), image: image.to_string() });
    }

    fn pick_line(&mut self, ctx: &mut Ctx) -> Option<usize> {
        let lines = &ctx.story.menu.idle_lines;
        let resting = self.coffee_cooldown > 0;
        let allowed: Vec<usize> = (0..lines.len())
            .filter(|&i| !(resting && lines[i].coffee))
            .collect();
        let fresh: Vec<usize> = allowed.iter().copied().filter(|&i| Some(i) != self.last_line).collect();
        // a repeat beats a coffee line during the cooldown
        let pool = if !fresh.is_empty() {
            fresh
        } else if !allowed.is_empty() {
            allowed
        } else {
            (0..lines.len()).collect()
        };
        if pool.is_empty() {
            return None;
        }
        let index = pool[ctx.rng.random_range(0..pool.len())];
        self.last_line = Some(index);
        self.coffee_cooldown = self.coffee_cooldown.saturating_sub(1);
        Some(index)
    }

    fn show_idle_line(&mut self, ctx: &mut Ctx) {
        self.timers.cancel_where(|t| *t == MenuTimer::HideBubble);
        if self.happy {
            self.happy = false;
            self.portrait(ctx, DEFAULT_PORTRAIT);
        }
        let Some(index) = self.pick_line(ctx) else {
            return;
        };
        let story = ctx.story.clone();
        let line = &story.menu.idle_lines[index];
        log::debug!("Menu idle line #{}", index);
        ctx.push(OutputEvent::SetText { surface: Surface::MenuBubble, text: line.text.clone() });

        self.coffee_offered = line.coffee;
        ctx.show(Element::CoffeeButton, line.coffee);
        let witnesses_done = ctx.session.progress.all_witnesses_done(story.witnesses.witnesses.len());
        let sprites = &story.menu.special_sprites;
        if !line.coffee && witnesses_done && !sprites.is_empty() && ctx.rng.random_bool(0.5) {
            let sprite = &sprites[ctx.rng.random_range(0..sprites.len())];
            self.portrait(ctx, sprite);
        } else {
            self.portrait(ctx, DEFAULT_PORTRAIT);
        }
        ctx.show(Element::SpeechBubble, true);
        let hold = if line.coffee { COFFEE_LINE_HOLD } else { LINE_HOLD };
        self.timers.after(hold, MenuTimer::HideBubble);
    }

    fn give_coffee(&mut self, ctx: &mut Ctx) -> bool {
        if !self.coffee_offered {
            return false;
        }
        self.coffee_offered = false;
        ctx.play_sfx(CLICK);
        self.timers.cancel_where(|t| *t == MenuTimer::HideBubble);
        self.idle.stop();

        ctx.play_sfx("sparkle");
        self.timers.after(SLURP_DELAY, MenuTimer::Slurp);
        self.happy = true;
        self.portrait(ctx, HAPPY_PORTRAIT);
        self.coffee_cooldown = COFFEE_COOLDOWN;

        let reactions = &ctx.story.menu.coffee_reactions;
        if !reactions.is_empty() {
            let reaction = reactions[ctx.rng.random_range(0..reactions.len())].clone();
            ctx.push(OutputEvent::SetText { surface: Surface::MenuBubble, text: reaction });
        }
        ctx.show(Element::CoffeeButton, false);
        self.timers.after(REACTION_HOLD, MenuTimer::HideBubble);
        self.timers.after(COFFEE_BREAK, MenuTimer::RestartIdle);
        true
    }

    fn open(&mut self, ctx: &mut Ctx, screen: ScreenId) -> bool {
        match screen {
            ScreenId::Leads | ScreenId::Evidence | ScreenId::Witness => {}
            ScreenId::Identify if ctx.identify_unlocked() => {}
            other => {
                log::debug!("Menu cannot open {:?} now", other);
                return false;
            }
        }
        ctx.play_sfx(CLICK);
        ctx.request_screen(screen);
        true
    }

    fn hide_bubble(&mut self, ctx: &mut Ctx) {
        self.coffee_offered = false;
        ctx.show(Element::SpeechBubble, false);
        ctx.show(Element::CoffeeButton, false);
    }
}

impl Default for MenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for MenuScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Menu
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        let unlocked = ctx.identify_unlocked();
        ctx.push(OutputEvent::SetEnabled { element: Element::IdentifyButton, enabled: unlocked });
        self.timers.clear();
        self.timers.after(FIRST_LINE, MenuTimer::FirstLine);
        self.idle.restart();
    }

    fn leave(&mut self, ctx: &mut Ctx) {
        self.idle.stop();
        self.timers.clear();
        self.hide_bubble(ctx);
        if self.happy {
            self.happy = false;
            self.portrait(ctx, DEFAULT_PORTRAIT);
        }
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        match input {
            InputEvent::Open { screen } => self.open(ctx, *screen),
            InputEvent::GiveCoffee => self.give_coffee(ctx),
            _ => false,
        }
    }

    fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        for timer in self.timers.tick(dt) {
            match timer {
                MenuTimer::FirstLine => self.show_idle_line(ctx),
                MenuTimer::HideBubble => self.hide_bubble(ctx),
                MenuTimer::Slurp => ctx.play_sfx("slurp"),
                MenuTimer::RestartIdle => self.idle.restart(),
            }
        }
        for _ in 0..self.idle.tick(dt) {
            self.show_idle_line(ctx);
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AudioCommand;
    use crate::testing::ctx;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    fn bubble_lines(events: &[OutputEvent]) -> Vec<String> {
        events.iter()
            .filter_map(|e| match e {
                OutputEvent::SetText { surface: Surface::MenuBubble, text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_line_after_two_seconds_then_every_fifteen() {
        let mut ctx = ctx();
        let mut menu = MenuScreen::new();
        menu.enter(&mut ctx);
        menu.tick(&mut ctx, MS(1999));
        assert!(bubble_lines(&ctx.drain()).is_empty());
        menu.tick(&mut ctx, MS(1));
        assert_eq!(bubble_lines(&ctx.drain()).len(), 1);

        menu.tick(&mut ctx, MS(13000));
        assert_eq!(bubble_lines(&ctx.drain()).len(), 1);
        menu.tick(&mut ctx, MS(15000));
        assert_eq!(bubble_lines(&ctx.drain()).len(), 1);
    }

    #[test]
    fn never_repeats_a_line_back_to_back() {
        let mut ctx = ctx();
        let mut menu = MenuScreen::new();
        menu.enter(&mut ctx);
        let mut previous = None;
        for _ in 0..40 {
            menu.tick(&mut ctx, IDLE_PERIOD);
            let line = menu.last_line;
            assert_ne!(line, previous);
            previous = line;
        }
    }

    #[test]
    fn coffee_skips_coffee_lines_and_pauses_the_idle_chatter() {
        let mut ctx = ctx();
        let mut menu = MenuScreen::new();
        menu.enter(&mut ctx);
        menu.coffee_offered = true;
        assert!(menu.give_coffee(&mut ctx));
        assert!(!menu.give_coffee(&mut ctx));
        let events = ctx.drain();
        assert!(events.contains(&OutputEvent::Audio(AudioCommand::Sfx { name: "sparkle".into() })));

        let story = ctx.story.clone();
        let is_coffee = |text: &String| story.menu.idle_lines.iter().any(|l| l.coffee && l.text == *text);

        menu.tick(&mut ctx, MS(19000));
        assert!(!menu.idle.is_running());
        let paused = ctx.drain();
        assert!(paused.contains(&OutputEvent::Audio(AudioCommand::Sfx { name: "slurp".into() })));
        assert!(!bubble_lines(&paused).iter().any(is_coffee));

        menu.tick(&mut ctx, MS(1000) + IDLE_PERIOD);
        assert!(menu.idle.is_running());
        let resumed = bubble_lines(&ctx.drain());
        assert_eq!(resumed.len(), 1);
        assert!(!resumed.iter().any(is_coffee));
    }

    #[test]
    fn cooldown_never_picks_a_coffee_line() {
        let mut ctx = ctx();
        let mut menu = MenuScreen::new();
        let story = ctx.story.clone();
        for _ in 0..200 {
            menu.coffee_cooldown = COFFEE_COOLDOWN;
            let index = menu.pick_line(&mut ctx).expect("idle lines exist");
            assert!(!story.menu.idle_lines[index].coffee);
        }
    }

    #[test]
    fn leaving_stops_every_timer() {
        let mut ctx = ctx();
        let mut menu = MenuScreen::new();
        menu.enter(&mut ctx);
        menu.tick(&mut ctx, MS(2500));
        menu.leave(&mut ctx);
        assert!(!menu.is_idling());
        ctx.drain();
        menu.tick(&mut ctx, MS(60000));
        assert!(bubble_lines(&ctx.drain()).is_empty());
    }
}
