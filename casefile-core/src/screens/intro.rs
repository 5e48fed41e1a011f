use crate::event::{InputEvent, ScreenId, Surface};
use crate::executor::{Flow, Sequencer, StepHooks, Then, CLICK};
use crate::runtime::Ctx;
use crate::script::DialogueStep;
use crate::text::RevealOptions;

use super::{drive, Screen};

/// Opening dialogue with the name prompt.
pub struct IntroScreen {
    seq: Sequencer,
    hooks: IntroHooks,
}

struct IntroHooks;

impl StepHooks for IntroHooks {
    fn on_text(&mut self, ctx: &mut Ctx, _step: &DialogueStep, text: &str) -> Option<Flow> {
        ctx.play_sfx(CLICK);
        let name = text.trim();
        if name.is_empty() {
            return None;
        }
        log::info!("Player name set to '{}'", name);
        ctx.session.player_name = Some(name.to_string());
        Some(Flow::say(
            format!("Is your name {}?", name),
            RevealOptions::speech(Surface::Dialogue(ScreenId::Intro)),
            Then::Confirm,
        ))
    }

    fn on_complete(&mut self, ctx: &mut Ctx) {
        ctx.request_screen(ScreenId::Title);
    }
}

impl IntroScreen {
    pub fn new() -> Self {
        Self { seq: Sequencer::new(ScreenId::Intro), hooks: IntroHooks }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }
}

impl Default for IntroScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for IntroScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Intro
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        let script = ctx.story.intro.clone();
        self.seq.start(ctx, &mut self.hooks, script);
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        drive(&mut self.seq, ctx, &mut self.hooks, input)
    }

    fn on_typed(&mut self, ctx: &mut Ctx) {
        self.seq.on_typed(ctx, &mut self.hooks);
    }

    fn reset(&mut self) {
        self.seq.stop();
    }
}

/// The title card between the intro and the menu.
#[derive(Default)]
pub struct TitleScreen;

impl Screen for TitleScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Title
    }

    fn enter(&mut self, _ctx: &mut Ctx) {}

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        match input {
            InputEvent::Continue | InputEvent::Advance => {
                ctx.play_sfx(CLICK);
                ctx.request_screen(ScreenId::Menu);
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {}
}
