//! One state machine per story screen.
//!
//! Every screen except the menu walks its scripts with the shared
//! [`Sequencer`]; the screen owns the sequencer and a hooks value side by
//! side so both can be borrowed mutably at once.

pub mod evidence;
pub mod identify;
pub mod intro;
pub mod leads;
pub mod menu;
pub mod witness;

use std::time::Duration;

use crate::event::{Element, InputEvent, OutputEvent, ScreenId, Surface};
use crate::executor::{Sequencer, StepHooks, CLICK};
use crate::runtime::Ctx;

pub use evidence::EvidenceScreen;
pub use identify::IdentifyScreen;
pub use intro::{IntroScreen, TitleScreen};
pub use leads::LeadsScreen;
pub use menu::MenuScreen;
pub use witness::WitnessScreen;

const BACK_LABEL: &str = "Back to Menu";

pub trait Screen {
    fn id(&self) -> ScreenId;

    /// The router just switched to this screen.
    fn enter(&mut self, ctx: &mut Ctx);

    /// Called before the router switches away. Timers die here.
    fn leave(&mut self, _ctx: &mut Ctx) {}

    /// Returns `true` when the input was consumed.
    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool;

    /// A reveal started while this screen was active has finished.
    fn on_typed(&mut self, _ctx: &mut Ctx) {}

    fn tick(&mut self, _ctx: &mut Ctx, _dt: Duration) {}

    /// Back to the state of a fresh session.
    fn reset(&mut self);
}

/// Maps the dialogue-level inputs onto a sequencer.
pub(crate) fn drive<H: StepHooks>(seq: &mut Sequencer, ctx: &mut Ctx, hooks: &mut H, input: &InputEvent) -> bool {
    match input {
        InputEvent::Advance => seq.advance(ctx, hooks),
        InputEvent::Choose { index } => seq.choose(ctx, hooks, *index),
        InputEvent::Continue => seq.press_button(ctx, hooks),
        InputEvent::SubmitText { text } => seq.submit_text(ctx, hooks, text),
        InputEvent::Confirm { yes } => seq.confirm(ctx, hooks, *yes),
        _ => false,
    }
}

/// Shows `text` in the screen's dialogue box without typing it.
pub(crate) fn set_dialogue(ctx: &mut Ctx, screen: ScreenId, text: &str) {
    ctx.push(OutputEvent::SetText {
        surface: Surface::Dialogue(screen),
        text: text.to_string(),
    });
}

/// Turns the screen's continue button into a way back to the menu.
pub(crate) fn offer_back(ctx: &mut Ctx, screen: ScreenId) {
    ctx.push(OutputEvent::ShowButton {
        element: Element::ContinueButton(screen),
        label: BACK_LABEL.to_string(),
    });
}

pub(crate) fn back_to_menu(ctx: &mut Ctx, screen: ScreenId) {
    ctx.show(Element::ContinueButton(screen), false);
    ctx.play_sfx(CLICK);
    ctx.request_screen(ScreenId::Menu);
}
