//! The last screen: profile items, then the fears, the dreams and the finale.
//!
//! Each later stage is its own small machine with its own sequencer. The
//! screen only routes input and ticks to whichever one is live and moves to
//! the next stage when one reports its outcome.

pub mod dreams;
pub mod fears;
pub mod finale;

use std::time::Duration;

use crate::event::{Element, FloatVariant, GridItem, InputEvent, ItemState, OutputEvent, ScreenId, Surface};
use crate::executor::{Flow, Sequencer, StepHooks, Then, CLICK};
use crate::floating::{FloatOptions, FloatingText};
use crate::runtime::{Ctx, Timers};
use crate::script::{Action, DialogueStep};

use super::{drive, set_dialogue, Screen};
use dreams::{DreamOutcome, DreamSequence};
use fears::{say_or, FearOutcome, FearSequence};
use finale::Finale;

pub use fears::FearWord;

const SCREEN: ScreenId = ScreenId::Identify;
const FINAL_TRACK: &str = "bgm-final";
const TRACK_FADE: Duration = Duration::from_millis(2000);
const GRID_FADE: Duration = Duration::from_millis(1000);
const FEARS_DELAY: Duration = Duration::from_millis(1000);
const TRAIT_FLOAT: Duration = Duration::from_millis(4000);
const TRAIT_SETTLE: Duration = Duration::from_millis(3000);
const TRAIT_COPIES: usize = 12;

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Intro,
    Grid,
    Item(String),
    /// The trait hidden behind the item floats around before it is written down.
    Revealing(String),
    AfterEvidence,
    Fears,
    Dreams,
    Finale,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    ScriptDone,
    Grid,
    StartFears,
}

#[derive(Debug, Clone, PartialEq)]
enum IdentifyTimer {
    Reveal(String),
    ItemDone,
}

#[derive(Default)]
struct IdentifyHooks {
    signals: Vec<Signal>,
    beat: bool,
}

impl IdentifyHooks {
    fn grid(&self, ctx: &mut Ctx, enabled: bool) {
        ctx.push(OutputEvent::SetEnabled { element: Element::IdentifyGrid, enabled });
    }
}

impl StepHooks for IdentifyHooks {
    fn on_step(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        match step.action {
            Action::MusicChange => {
                ctx.audio.fade_to_track(FINAL_TRACK, TRACK_FADE);
                ctx.flush_audio();
                ctx.show(Element::LeadsList, false);
                Some(say_or(step, Then::AwaitInput))
            }
            Action::ShowGrid | Action::HideGrid | Action::StartFears => Some(say_or(step, Then::Resume)),
            _ => None,
        }
    }

    fn resume(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match step.action {
            Action::ShowGrid => {
                ctx.show(Element::IdentifyGrid, true);
                self.grid(ctx, true);
                self.signals.push(Signal::Grid);
                Then::Halt
            }
            Action::HideGrid if self.beat => {
                self.beat = false;
                ctx.show(Element::IdentifyGrid, false);
                ctx.flag(Element::IdentifyGrid, "fade-out", false);
                Then::AwaitInput
            }
            Action::HideGrid => {
                self.beat = true;
                ctx.flag(Element::IdentifyGrid, "fade-out", true);
                Then::Pause(GRID_FADE, Box::new(Then::Resume))
            }
            Action::StartFears if self.beat => {
                self.beat = false;
                self.signals.push(Signal::StartFears);
                Then::Halt
            }
            Action::StartFears => {
                self.beat = true;
                Then::Pause(FEARS_DELAY, Box::new(Then::Resume))
            }
            _ => Then::AwaitInput,
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.signals.push(Signal::ScriptDone);
    }
}

/// Putting the profile together, and what happens once it is complete.
pub struct IdentifyScreen {
    seq: Sequencer,
    hooks: IdentifyHooks,
    phase: Phase,
    revealed: Vec<String>,
    floating: Option<FloatingText>,
    timers: Timers<IdentifyTimer>,
    fears: Option<FearSequence>,
    dreams: Option<DreamSequence>,
    finale: Option<Finale>,
}

impl IdentifyScreen {
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(SCREEN),
            hooks: IdentifyHooks::default(),
            phase: Phase::Intro,
            revealed: Vec::new(),
            floating: None,
            timers: Timers::default(),
            fears: None,
            dreams: None,
            finale: None,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    pub fn fears(&self) -> Option<&FearSequence> {
        self.fears.as_ref()
    }

    pub fn dreams(&self) -> Option<&DreamSequence> {
        self.dreams.as_ref()
    }

    pub fn finale(&self) -> Option<&Finale> {
        self.finale.as_ref()
    }

    /// Profile items whose trait has been written down.
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }

    pub fn in_grid(&self) -> bool {
        self.phase == Phase::Grid
    }

    fn select(&mut self, ctx: &mut Ctx, id: &str) -> bool {
        if self.phase != Phase::Grid || self.revealed.iter().any(|r| r == id) {
            return false;
        }
        let Some(item) = ctx.story.profile_item(id) else {
            log::debug!("No profile item '{}'", id);
            return false;
        };
        let dialogue = item.dialogue.clone();
        ctx.play_sfx(CLICK);
        self.hooks.grid(ctx, false);
        self.phase = Phase::Item(id.to_string());
        self.seq.start(ctx, &mut self.hooks, dialogue);
        self.settle(ctx);
        true
    }

    fn float_trait(&mut self, ctx: &mut Ctx, id: String) {
        let Some(name) = ctx.story.profile_item(&id).map(|i| i.trait_name.clone()) else {
            return;
        };
        let options = FloatOptions {
            variant: FloatVariant::Soft,
            interval: Duration::from_millis(800),
            lifetime: Duration::from_millis(5000),
            looping: false,
            size: (1.5, 3.2),
            opacity: (0.12, 0.35),
        };
        self.floating = Some(FloatingText::start(vec![name; TRAIT_COPIES], options, ctx));
        self.timers.after(TRAIT_FLOAT, IdentifyTimer::Reveal(id.clone()));
        self.phase = Phase::Revealing(id);
    }

    fn write_trait(&mut self, ctx: &mut Ctx, id: String) {
        if let Some(floating) = self.floating.as_mut() {
            floating.stop();
        }
        if let Some(item) = ctx.story.profile_item(&id) {
            let label = item.trait_name.clone();
            log::info!("Profile item '{}' revealed: {}", id, label);
            ctx.push(OutputEvent::SetItem { element: Element::IdentifyGrid, id: id.clone(), state: ItemState::Revealed { label } });
        }
        self.revealed.push(id);
        self.timers.after(TRAIT_SETTLE, IdentifyTimer::ItemDone);
    }

    fn item_done(&mut self, ctx: &mut Ctx) {
        if self.revealed.len() >= ctx.story.identify.items.len() {
            self.phase = Phase::AfterEvidence;
            ctx.push(OutputEvent::ClearText { surface: Surface::Dialogue(SCREEN) });
            let script = ctx.story.identify.after_evidence.clone();
            self.seq.start(ctx, &mut self.hooks, script);
            self.settle(ctx);
        } else {
            self.phase = Phase::Grid;
            set_dialogue(ctx, SCREEN, "Select another item to examine.");
            self.hooks.grid(ctx, true);
        }
    }

    /// Reacts to whatever the hooks and the stage machines reported.
    fn settle(&mut self, ctx: &mut Ctx) {
        for signal in std::mem::take(&mut self.hooks.signals) {
            match (signal, self.phase.clone()) {
                (Signal::Grid, Phase::Intro) => {
                    self.seq.stop();
                    self.phase = Phase::Grid;
                }
                (Signal::ScriptDone, Phase::Item(id)) => self.float_trait(ctx, id),
                (Signal::StartFears, _) => {
                    self.seq.stop();
                    self.phase = Phase::Fears;
                    self.fears = Some(FearSequence::start(ctx));
                }
                (signal, phase) => log::debug!("Identify: {:?} ignored in {:?}", signal, phase),
            }
        }

        if let Some(outcome) = self.fears.as_mut().and_then(FearSequence::take_outcome) {
            match outcome {
                FearOutcome::Dreams => {
                    self.phase = Phase::Dreams;
                    self.dreams = Some(DreamSequence::start(ctx));
                }
                FearOutcome::Complete => self.phase = Phase::Complete,
            }
        }
        if let Some(outcome) = self.dreams.as_mut().and_then(DreamSequence::take_outcome) {
            match outcome {
                DreamOutcome::Finale => {
                    self.phase = Phase::Finale;
                    if let Some(fears) = self.fears.as_mut() {
                        fears.stop(ctx);
                    }
                    self.finale = Some(Finale::start(ctx));
                }
                DreamOutcome::Complete => self.phase = Phase::Complete,
            }
        }
        if self.phase == Phase::Finale && self.finale.as_ref().is_some_and(Finale::is_ended) {
            self.phase = Phase::Complete;
            ctx.request_screen(ScreenId::End);
        }
    }

    fn stop_all(&mut self, ctx: &mut Ctx) {
        self.seq.stop();
        self.timers.clear();
        if let Some(mut floating) = self.floating.take() {
            floating.clear(ctx);
        }
        if let Some(mut fears) = self.fears.take() {
            fears.stop(ctx);
        }
        if let Some(mut dreams) = self.dreams.take() {
            dreams.stop();
        }
        if let Some(mut finale) = self.finale.take() {
            finale.stop(ctx);
        }
    }
}

impl Default for IdentifyScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for IdentifyScreen {
    fn id(&self) -> ScreenId {
        SCREEN
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        self.stop_all(ctx);
        self.hooks = IdentifyHooks::default();
        self.revealed.clear();
        self.phase = Phase::Intro;

        ctx.show(Element::LeadsList, false);
        ctx.show(Element::IdentifyGrid, false);
        let items = ctx.story.identify.items.iter()
            .map(|i| GridItem { id: i.id.clone(), label: i.name.clone() })
            .collect();
        ctx.push(OutputEvent::MountItems { element: Element::IdentifyGrid, items });
        ctx.push(OutputEvent::ClearText { surface: Surface::Dialogue(SCREEN) });

        let intro = ctx.story.identify.intro.clone();
        self.seq.start(ctx, &mut self.hooks, intro);
        self.settle(ctx);
    }

    fn leave(&mut self, ctx: &mut Ctx) {
        self.stop_all(ctx);
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        let handled = match input {
            InputEvent::Select { id } => self.select(ctx, id),
            InputEvent::ClickWord { index } => match self.fears.as_mut() {
                Some(fears) if self.phase == Phase::Fears => fears.click(ctx, *index),
                _ => false,
            },
            InputEvent::ClickDream { index } => match self.dreams.as_mut() {
                Some(dreams) if self.phase == Phase::Dreams => dreams.click(ctx, *index),
                _ => false,
            },
            InputEvent::SubmitText { text } if self.phase == Phase::Finale => match self.finale.as_mut() {
                Some(finale) => finale.submit(ctx, text),
                None => false,
            },
            _ => drive(&mut self.seq, ctx, &mut self.hooks, input),
        };
        self.settle(ctx);
        handled
    }

    fn on_typed(&mut self, ctx: &mut Ctx) {
        match self.phase {
            Phase::Fears => {
                if let Some(fears) = self.fears.as_mut() {
                    fears.on_typed(ctx);
                }
            }
            Phase::Dreams => {
                if let Some(dreams) = self.dreams.as_mut() {
                    dreams.on_typed(ctx);
                }
            }
            Phase::Finale => {
                if let Some(finale) = self.finale.as_mut() {
                    finale.on_typed(ctx);
                }
            }
            _ => self.seq.on_typed(ctx, &mut self.hooks),
        }
        self.settle(ctx);
    }

    fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        if let Some(floating) = self.floating.as_mut() {
            floating.tick(dt, ctx);
        }
        for timer in self.timers.tick(dt) {
            match timer {
                IdentifyTimer::Reveal(id) => self.write_trait(ctx, id),
                IdentifyTimer::ItemDone => self.item_done(ctx),
            }
        }
        self.seq.tick(ctx, &mut self.hooks, dt);
        if let Some(fears) = self.fears.as_mut() {
            fears.tick(ctx, dt);
        }
        if let Some(dreams) = self.dreams.as_mut() {
            dreams.tick(ctx, dt);
        }
        if let Some(finale) = self.finale.as_mut() {
            finale.tick(ctx, dt);
        }
        self.settle(ctx);
    }

    fn reset(&mut self) {
        self.seq.stop();
        self.hooks = IdentifyHooks::default();
        self.phase = Phase::Intro;
        self.revealed.clear();
        self.floating = None;
        self.timers.clear();
        self.fears = None;
        self.dreams = None;
        self.finale = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ctx;

    const STEP: Duration = Duration::from_millis(50);

    /// Plays the screen forward, picking the first choice everywhere, until `done`.
    fn play_until(ctx: &mut Ctx, screen: &mut IdentifyScreen, done: impl Fn(&IdentifyScreen) -> bool) {
        for _ in 0..20_000 {
            if done(screen) {
                return;
            }
            ctx.tick(STEP);
            screen.tick(ctx, STEP);
            if ctx.take_typed() {
                screen.on_typed(ctx);
            } else if !ctx.is_typing() {
                screen.feed(ctx, &InputEvent::Advance);
                screen.feed(ctx, &InputEvent::Choose { index: 0 });
            }
        }
        panic!("screen never reached the expected state");
    }

    fn grid_ready(ctx: &mut Ctx) -> IdentifyScreen {
        let mut screen = IdentifyScreen::new();
        screen.enter(ctx);
        play_until(ctx, &mut screen, IdentifyScreen::in_grid);
        screen
    }

    #[test]
    fn items_are_locked_until_the_intro_shows_the_grid() {
        let mut ctx = ctx();
        let mut screen = IdentifyScreen::new();
        screen.enter(&mut ctx);
        let first = ctx.story.identify.items[0].id.clone();
        assert!(!screen.feed(&mut ctx, &InputEvent::Select { id: first.clone() }));

        let mut screen = grid_ready(&mut ctx);
        assert!(screen.feed(&mut ctx, &InputEvent::Select { id: first.clone() }));
        assert!(!screen.feed(&mut ctx, &InputEvent::Select { id: first }));
    }

    #[test]
    fn a_finished_item_reveals_its_trait_after_the_float() {
        let mut ctx = ctx();
        let mut screen = grid_ready(&mut ctx);
        let item = ctx.story.identify.items[0].clone();
        screen.feed(&mut ctx, &InputEvent::Select { id: item.id.clone() });
        play_until(&mut ctx, &mut screen, |s| matches!(s.phase, Phase::Revealing(_)));
        assert_eq!(screen.phase, Phase::Revealing(item.id.clone()));
        ctx.drain();

        screen.tick(&mut ctx, TRAIT_FLOAT);
        let revealed = OutputEvent::SetItem {
            element: Element::IdentifyGrid,
            id: item.id.clone(),
            state: ItemState::Revealed { label: item.trait_name.clone() },
        };
        assert!(ctx.drain().contains(&revealed));
        assert_eq!(screen.revealed(), [item.id]);

        screen.tick(&mut ctx, TRAIT_SETTLE);
        assert!(screen.in_grid());
    }
}
