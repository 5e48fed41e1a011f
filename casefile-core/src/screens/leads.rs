use std::time::Duration;

use crate::event::{Element, InputEvent, OutputEvent, ScreenId, Surface};
use crate::executor::{say_step, Flow, Sequencer, StepHooks, Then};
use crate::runtime::Ctx;
use crate::script::{Action, DialogueStep};
use crate::text::{Pace, RevealOptions};

use super::{back_to_menu, drive, offer_back, set_dialogue, Screen};

const PAPERS: &str = "papers";
const OVERLAY_IMAGE: &str = "Kola.png";
const STRIKE_DELAY: Duration = Duration::from_millis(400);
const DEFAULT_END: &str = "That's all for now.";

/// The case briefing. Fills the persistent leads list.
pub struct LeadsScreen {
    seq: Sequencer,
    hooks: LeadsHooks,
}

#[derive(Default)]
struct LeadsHooks {
    /// Waiting out the pause before a strike.
    striking: bool,
    struck: bool,
}

impl StepHooks for LeadsHooks {
    fn on_step(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        if self.struck {
            ctx.flag(Element::DialogueBox(ScreenId::Leads), "strikethrough", false);
            self.struck = false;
        }
        match &step.action {
            Action::ColoredText { color, .. } => {
                let mut options = RevealOptions::speech(Surface::Dialogue(ScreenId::Leads))
                    .pace(Pace::Fixed)
                    .class(format!("hair-{}", color));
                options.detect_shouty = false;
                Some(Flow::say(step.text(), options, Then::Resume))
            }
            Action::ShowOverlay | Action::HideOverlay => {
                let visible = step.action == Action::ShowOverlay;
                ctx.play_sfx(PAPERS);
                ctx.push(OutputEvent::SetImage { element: Element::Overlay, image: OVERLAY_IMAGE.to_string() });
                ctx.show(Element::Overlay, visible);
                Some(Flow::then(Then::Next))
            }
            Action::EndLeads => {
                let text = step.text.as_deref().unwrap_or(DEFAULT_END);
                let step = step.clone().with_text(text);
                Some(say_step(ScreenId::Leads, &step, step.pitch.unwrap_or_default(), Then::Resume))
            }
            _ => None,
        }
    }

    fn resume(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match step.action {
            Action::ColoredText { strikethrough: true, .. } if !self.striking => {
                self.striking = true;
                Then::Pause(STRIKE_DELAY, Box::new(Then::Resume))
            }
            Action::ColoredText { .. } => {
                if self.striking {
                    ctx.flag(Element::DialogueBox(ScreenId::Leads), "strikethrough", true);
                    self.striking = false;
                    self.struck = true;
                }
                Then::AwaitInput
            }
            Action::EndLeads => {
                log::info!("Leads reviewed");
                ctx.session.progress.leads_complete = true;
                offer_back(ctx, ScreenId::Leads);
                Then::Halt
            }
            _ => Then::AwaitInput,
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        log::warn!("Leads script ran out without an end_leads step");
    }
}

impl LeadsScreen {
    pub fn new() -> Self {
        Self { seq: Sequencer::new(ScreenId::Leads), hooks: LeadsHooks::default() }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }
}

impl Default for LeadsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LeadsScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Leads
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        ctx.play_sfx(PAPERS);
        ctx.show(Element::LeadsList, true);
        if ctx.session.progress.leads_complete {
            set_dialogue(ctx, ScreenId::Leads, "You've already reviewed the leads.");
            offer_back(ctx, ScreenId::Leads);
            return;
        }
        self.hooks = LeadsHooks::default();
        let script = ctx.story.leads.clone();
        self.seq.start(ctx, &mut self.hooks, script);
    }

    fn leave(&mut self, _ctx: &mut Ctx) {
        self.seq.stop();
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        if drive(&mut self.seq, ctx, &mut self.hooks, input) {
            return true;
        }
        let done = ctx.session.progress.leads_complete && !ctx.is_typing();
        match input {
            InputEvent::Continue | InputEvent::Open { screen: ScreenId::Menu } if done => {
                back_to_menu(ctx, ScreenId::Leads);
                true
            }
            _ => false,
        }
    }

    fn on_typed(&mut self, ctx: &mut Ctx) {
        self.seq.on_typed(ctx, &mut self.hooks);
    }

    fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        self.seq.tick(ctx, &mut self.hooks, dt);
    }

    fn reset(&mut self) {
        self.seq.stop();
        self.hooks = LeadsHooks::default();
    }
}
