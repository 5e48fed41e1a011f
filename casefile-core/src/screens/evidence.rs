use std::time::Duration;

use crate::event::{Element, GridItem, InputEvent, ItemState, OutputEvent, ScreenId};
use crate::executor::{Sequencer, StepHooks, CLICK};
use crate::runtime::Ctx;

use super::{back_to_menu, drive, offer_back, set_dialogue, Screen};

const SCREEN: ScreenId = ScreenId::Evidence;
const PAPERS: &str = "papers";

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Intro,
    Grid,
    Viewing(String),
    /// Dialogue done, the lead is still being written into the list.
    Filing(String),
}

/// Physical evidence: an intro, then a grid of items to examine.
pub struct EvidenceScreen {
    seq: Sequencer,
    hooks: EvidenceHooks,
    mode: Mode,
    intro_complete: bool,
}

#[derive(Default)]
struct EvidenceHooks {
    finished: bool,
}

impl StepHooks for EvidenceHooks {
    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.finished = true;
    }
}

impl EvidenceScreen {
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(SCREEN),
            hooks: EvidenceHooks::default(),
            mode: Mode::Intro,
            intro_complete: false,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    /// Id of the item under examination.
    pub fn viewing(&self) -> Option<&str> {
        match &self.mode {
            Mode::Viewing(id) | Mode::Filing(id) => Some(id),
            _ => None,
        }
    }

    fn set_grid(&self, ctx: &mut Ctx, enabled: bool) {
        let story = ctx.story.clone();
        for item in &story.evidence.items {
            let state = if ctx.session.progress.evidence_done(&item.id) {
                ItemState::Completed
            } else if enabled {
                ItemState::Available
            } else {
                ItemState::Locked
            };
            ctx.push(OutputEvent::SetItem { element: Element::EvidenceGrid, id: item.id.clone(), state });
        }
        ctx.push(OutputEvent::SetEnabled { element: Element::EvidenceGrid, enabled });
    }

    fn all_done(&self, ctx: &Ctx) -> bool {
        ctx.session.progress.all_evidence_done(ctx.story.evidence.items.len())
    }

    fn select(&mut self, ctx: &mut Ctx, id: &str) -> bool {
        if self.mode != Mode::Grid {
            return false;
        }
        let Some(item) = ctx.story.evidence_item(id) else {
            log::debug!("No evidence item '{}'", id);
            return false;
        };
        if ctx.session.progress.evidence_done(id) {
            log::debug!("Evidence '{}' already examined", id);
            return false;
        }
        let dialogue = item.dialogue.clone();
        ctx.play_sfx(CLICK);
        self.set_grid(ctx, false);
        self.mode = Mode::Viewing(id.to_string());
        self.seq.start(ctx, &mut self.hooks, dialogue);
        self.settle(ctx);
        true
    }

    /// Reacts to a script having run out.
    fn settle(&mut self, ctx: &mut Ctx) {
        if !std::mem::take(&mut self.hooks.finished) {
            return;
        }
        match self.mode.clone() {
            Mode::Intro => {
                self.intro_complete = true;
                self.mode = Mode::Grid;
                self.set_grid(ctx, true);
                set_dialogue(ctx, SCREEN, "Select an evidence item to examine.");
            }
            Mode::Viewing(id) => {
                let lead = ctx.story.evidence_item(&id).map(|i| i.lead_text.clone());
                if lead.is_some_and(|lead| ctx.collect_lead(&lead)) {
                    self.mode = Mode::Filing(id);
                } else {
                    self.file(ctx, &id);
                }
            }
            _ => {}
        }
    }

    fn file(&mut self, ctx: &mut Ctx, id: &str) {
        ctx.session.progress.complete_evidence(id);
        log::info!("Evidence '{}' examined", id);
        self.mode = Mode::Grid;
        self.set_grid(ctx, true);
        if self.all_done(ctx) {
            set_dialogue(ctx, SCREEN, "All evidence has been examined. Return to the menu to continue.");
        } else {
            set_dialogue(ctx, SCREEN, "Select another evidence item to examine.");
        }
    }
}

impl Default for EvidenceScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for EvidenceScreen {
    fn id(&self) -> ScreenId {
        SCREEN
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        ctx.play_sfx(PAPERS);
        ctx.show(Element::LeadsList, true);
        ctx.show(Element::BackButton(SCREEN), true);
        let items = ctx.story.evidence.items.iter()
            .map(|i| GridItem { id: i.id.clone(), label: i.label.clone() })
            .collect();
        ctx.push(OutputEvent::MountItems { element: Element::EvidenceGrid, items });

        if !self.intro_complete {
            self.mode = Mode::Intro;
            self.set_grid(ctx, false);
            self.hooks = EvidenceHooks::default();
            let intro = ctx.story.evidence.intro.clone();
            self.seq.start(ctx, &mut self.hooks, intro);
            self.settle(ctx);
            return;
        }
        self.mode = Mode::Grid;
        self.set_grid(ctx, true);
        if self.all_done(ctx) {
            set_dialogue(ctx, SCREEN, "You've already examined all the evidence.");
            offer_back(ctx, SCREEN);
        } else {
            set_dialogue(ctx, SCREEN, "Select an evidence item to examine.");
        }
    }

    fn leave(&mut self, ctx: &mut Ctx) {
        self.seq.stop();
        self.hooks.finished = false;
        if let Mode::Filing(id) = self.mode.clone() {
            ctx.session.progress.complete_evidence(&id);
        }
        self.mode = if self.intro_complete { Mode::Grid } else { Mode::Intro };

        let story = ctx.story.clone();
        for item in &story.evidence.items {
            if let Some(after) = &item.lead_text_after {
                if ctx.session.progress.evidence_done(&item.id) {
                    ctx.rename_lead(&item.lead_text, after);
                }
            }
        }
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        let handled = match input {
            InputEvent::Select { id } => self.select(ctx, id),
            InputEvent::Open { screen: ScreenId::Menu } => {
                back_to_menu(ctx, SCREEN);
                true
            }
            InputEvent::Continue if self.mode == Mode::Grid && self.all_done(ctx) => {
                back_to_menu(ctx, SCREEN);
                true
            }
            _ => drive(&mut self.seq, ctx, &mut self.hooks, input),
        };
        self.settle(ctx);
        handled
    }

    fn on_typed(&mut self, ctx: &mut Ctx) {
        if let Mode::Filing(id) = self.mode.clone() {
            self.file(ctx, &id);
            return;
        }
        self.seq.on_typed(ctx, &mut self.hooks);
        self.settle(ctx);
    }

    fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        self.seq.tick(ctx, &mut self.hooks, dt);
        self.settle(ctx);
    }

    fn reset(&mut self) {
        self.seq.stop();
        self.hooks = EvidenceHooks::default();
        self.mode = Mode::Intro;
        self.intro_complete = false;
    }
}
