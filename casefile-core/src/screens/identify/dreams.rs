use std::time::Duration;

use crate::event::{Element, OutputEvent, ScreenId, Surface};
use crate::executor::{Flow, Pacing, Sequencer, StepHooks, Then, CLICK};
use crate::runtime::{Ctx, Timers};
use crate::script::{Action, DialogueStep};
use crate::text::RevealOptions;

use super::fears::say_or;

const SCREEN: ScreenId = ScreenId::Identify;
const CONCLUSION_DELAY: Duration = Duration::from_millis(1500);
const CONCLUSION_HOLD: Duration = Duration::from_millis(1500);
const FINALE_DELAY: Duration = Duration::from_millis(2000);
const FADE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DreamOutcome {
    Finale,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DreamTimer {
    Conclusion,
    Hide,
}

#[derive(Default)]
struct DreamHooks {
    finale: bool,
    finished: bool,
    beat: bool,
}

impl StepHooks for DreamHooks {
    fn on_step(&mut self, _ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        match step.action {
            Action::ShowFinale => Some(say_or(step, Then::Resume)),
            _ => None,
        }
    }

    fn resume(&mut self, _ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match step.action {
            Action::ShowFinale if self.beat => {
                self.beat = false;
                self.finale = true;
                Then::Halt
            }
            Action::ShowFinale => {
                self.beat = true;
                Then::Pause(FINALE_DELAY, Box::new(Then::Resume))
            }
            _ => Then::AwaitInput,
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.finished = true;
    }
}

/// Hidden dreams under each surface trait. Every one must be opened before
/// the closing lines play.
pub struct DreamSequence {
    revealed: Vec<bool>,
    /// All open; waiting for the last response to finish typing.
    last_response: bool,
    seq: Sequencer,
    hooks: DreamHooks,
    timers: Timers<DreamTimer>,
    outcome: Option<DreamOutcome>,
}

impl DreamSequence {
    pub fn start(ctx: &mut Ctx) -> Self {
        let surfaces: Vec<String> = ctx.story.identify.dreams.items.iter().map(|d| d.surface.clone()).collect();
        log::info!("Showing {} dreams", surfaces.len());
        let revealed = vec![false; surfaces.len()];
        ctx.push(OutputEvent::MountDreams { surfaces });
        ctx.flag(Element::Dreams, "fade-out", false);
        ctx.show(Element::Dreams, true);
        let mut dreams = Self {
            revealed,
            last_response: false,
            seq: Sequencer::new(SCREEN).with_pacing(Pacing::Auto(CONCLUSION_HOLD)),
            hooks: DreamHooks::default(),
            timers: Timers::default(),
            outcome: None,
        };
        if dreams.revealed.is_empty() {
            dreams.timers.after(CONCLUSION_DELAY, DreamTimer::Conclusion);
        }
        dreams
    }

    pub fn revealed(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    pub fn take_outcome(&mut self) -> Option<DreamOutcome> {
        self.outcome.take()
    }

    fn all_revealed(&self) -> bool {
        self.revealed.iter().all(|r| *r)
    }

    /// Opens a dream. Each one opens once.
    pub fn click(&mut self, ctx: &mut Ctx, index: usize) -> bool {
        match self.revealed.get(index) {
            Some(false) => {}
            _ => return false,
        }
        let story = ctx.story.clone();
        let dream = &story.identify.dreams.items[index];
        self.revealed[index] = true;
        ctx.play_sfx(CLICK);
        ctx.push(OutputEvent::RevealDream { index, hidden: dream.hidden.clone() });
        ctx.reveal(&dream.response, RevealOptions::speech(Surface::Dialogue(SCREEN)));
        if self.all_revealed() {
            self.last_response = true;
        }
        true
    }

    pub fn on_typed(&mut self, ctx: &mut Ctx) {
        if std::mem::take(&mut self.last_response) {
            self.timers.after(CONCLUSION_DELAY, DreamTimer::Conclusion);
            return;
        }
        self.seq.on_typed(ctx, &mut self.hooks);
        self.settle(ctx);
    }

    pub fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        for timer in self.timers.tick(dt) {
            match timer {
                DreamTimer::Conclusion => {
                    let conclusion = ctx.story.identify.dreams.conclusion.clone();
                    self.seq.start(ctx, &mut self.hooks, conclusion);
                }
                DreamTimer::Hide => {
                    ctx.show(Element::Dreams, false);
                    self.outcome = Some(DreamOutcome::Complete);
                }
            }
        }
        self.seq.tick(ctx, &mut self.hooks, dt);
        self.settle(ctx);
    }

    pub fn stop(&mut self) {
        self.seq.stop();
        self.timers.clear();
        self.last_response = false;
    }

    fn settle(&mut self, ctx: &mut Ctx) {
        if std::mem::take(&mut self.hooks.finale) {
            self.seq.stop();
            self.outcome = Some(DreamOutcome::Finale);
        } else if std::mem::take(&mut self.hooks.finished) {
            ctx.flag(Element::Dreams, "fade-out", true);
            self.timers.after(FADE, DreamTimer::Hide);
        }
    }
}
