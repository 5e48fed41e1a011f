use std::collections::VecDeque;
use std::time::Duration;

use crate::event::{Element, GridItem, InputEvent, ItemState, OutputEvent, ScreenId, Surface};
use crate::executor::{say_step, Flow, Sequencer, StepHooks, Then, CLICK, DEFAULT_PORTRAIT};
use crate::runtime::Ctx;
use crate::script::{Action, ChoiceArm, DialogueStep, Pitch, Witness};

use super::{back_to_menu, drive, offer_back, set_dialogue, Screen};

const SCREEN: ScreenId = ScreenId::Witness;
const PAPERS: &str = "papers";
const SURPRISED: &str = "Mol_surprised.png";
const IMAGE_FLAGS: [&str; 3] = ["fly-away", "vanish", "spinning"];

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Intro,
    List,
    Interview(String),
    /// Interview over; leads still being written one by one.
    Filing { id: String, pending: VecDeque<String> },
}

/// Witness interviews: an intro, then a list of people (and others) to talk to.
pub struct WitnessScreen {
    seq: Sequencer,
    hooks: WitnessHooks,
    mode: Mode,
    intro_complete: bool,
}

#[derive(Default)]
struct WitnessHooks {
    witness: Option<Witness>,
    surprised: bool,
    finished: bool,
}

impl WitnessHooks {
    fn show_image(&self, ctx: &mut Ctx) {
        let Some(witness) = &self.witness else { return };
        ctx.push(OutputEvent::SetImage { element: Element::WitnessImage, image: witness.image.clone() });
        for flag in IMAGE_FLAGS {
            ctx.flag(Element::WitnessImage, flag, false);
        }
        ctx.flag(Element::WitnessImage, "wide", witness.wide);
        ctx.show(Element::WitnessImage, true);
    }

    fn surprise(&mut self, ctx: &mut Ctx) {
        ctx.push(OutputEvent::SetImage { element: Element::Portrait(SCREEN), image: SURPRISED.to_string() });
        self.surprised = true;
    }

    fn calm_down(&mut self, ctx: &mut Ctx) {
        if std::mem::take(&mut self.surprised) {
            ctx.push(OutputEvent::SetImage { element: Element::Portrait(SCREEN), image: DEFAULT_PORTRAIT.to_string() });
        }
    }
}

impl StepHooks for WitnessHooks {
    fn on_step(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        if let Some(image) = &step.change_image {
            ctx.push(OutputEvent::SetImage { element: Element::WitnessImage, image: image.clone() });
        }
        let pitch = self.voice(step);
        match &step.action {
            Action::ShowImage => {
                self.show_image(ctx);
                Some(Flow::then(Then::Next))
            }
            Action::Spin { label } => {
                ctx.flag(Element::WitnessImage, "spinning", true);
                let then = Then::Button(label.clone());
                Some(match step.text {
                    Some(_) => say_step(SCREEN, step, pitch, then),
                    None => Flow::then(then),
                })
            }
            Action::FlyAway { label } => {
                ctx.play_sfx("helicopter");
                ctx.flag(Element::WitnessImage, "fly-away", true);
                self.surprise(ctx);
                ctx.push(OutputEvent::ClearText { surface: Surface::Dialogue(SCREEN) });
                Some(Flow::then(Then::Button(label.clone())))
            }
            Action::BeamUp | Action::Vanish { .. } => Some(match step.text {
                Some(_) => say_step(SCREEN, step, pitch, Then::Resume),
                None => Flow::then(Then::Resume),
            }),
            _ => None,
        }
    }

    fn resume(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match &step.action {
            Action::BeamUp => {
                ctx.play_sfx("spaceship");
                ctx.flag(Element::WitnessImage, "fly-away", true);
                self.surprise(ctx);
                Then::AwaitInput
            }
            Action::Vanish { label } => {
                if let Some(sound) = &step.sound {
                    ctx.play_sfx(sound);
                }
                ctx.flag(Element::WitnessImage, "vanish", true);
                Then::Button(label.clone())
            }
            _ => Then::AwaitInput,
        }
    }

    fn on_choice(&mut self, ctx: &mut Ctx, _arm: &ChoiceArm) {
        self.calm_down(ctx);
    }

    fn on_button(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        match step.action {
            Action::Spin { .. } => ctx.flag(Element::WitnessImage, "spinning", false),
            Action::FlyAway { .. } => {
                ctx.show(Element::WitnessImage, false);
                self.calm_down(ctx);
            }
            Action::Vanish { .. } => ctx.show(Element::WitnessImage, false),
            _ => {}
        }
        None
    }

    fn voice(&self, step: &DialogueStep) -> Pitch {
        if let Some(pitch) = step.pitch {
            return pitch;
        }
        match (&self.witness, &step.speaker) {
            (Some(witness), Some(speaker)) if *speaker == witness.id => witness.pitch,
            _ => Pitch::Normal,
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.finished = true;
    }
}

impl WitnessScreen {
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(SCREEN),
            hooks: WitnessHooks::default(),
            mode: Mode::Intro,
            intro_complete: false,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    pub fn interviewing(&self) -> Option<&str> {
        match &self.mode {
            Mode::Interview(id) | Mode::Filing { id, .. } => Some(id),
            _ => None,
        }
    }

    fn set_list(&self, ctx: &mut Ctx, enabled: bool) {
        let story = ctx.story.clone();
        for witness in &story.witnesses.witnesses {
            let state = if ctx.session.progress.witness_done(&witness.id) {
                ItemState::Completed
            } else if enabled {
                ItemState::Available
            } else {
                ItemState::Locked
            };
            ctx.push(OutputEvent::SetItem { element: Element::WitnessList, id: witness.id.clone(), state });
        }
        ctx.push(OutputEvent::SetEnabled { element: Element::WitnessList, enabled });
    }

    fn all_done(&self, ctx: &Ctx) -> bool {
        ctx.session.progress.all_witnesses_done(ctx.story.witnesses.witnesses.len())
    }

    fn select(&mut self, ctx: &mut Ctx, id: &str) -> bool {
        if self.mode != Mode::List {
            return false;
        }
        let Some(witness) = ctx.story.witness(id).cloned() else {
            log::debug!("No witness '{}'", id);
            return false;
        };
        if ctx.session.progress.witness_done(id) {
            log::debug!("Witness '{}' already interviewed", id);
            return false;
        }
        log::info!("Interviewing '{}'", id);
        ctx.play_sfx(CLICK);
        self.set_list(ctx, false);
        ctx.show(Element::WitnessList, false);

        let dialogue = witness.dialogue.clone();
        let (delay_image, music, alien) = (witness.delay_image, witness.music, witness.pitch == Pitch::Alien);
        self.hooks = WitnessHooks { witness: Some(witness), ..WitnessHooks::default() };
        if !delay_image {
            self.hooks.show_image(ctx);
        }
        if music {
            ctx.audio.switch_to_witness_music(id);
            ctx.flush_audio();
        }
        if alien {
            ctx.flag(Element::Body, "alien-effect", true);
        }
        self.mode = Mode::Interview(id.to_string());
        self.seq.start(ctx, &mut self.hooks, dialogue);
        self.settle(ctx);
        true
    }

    fn settle(&mut self, ctx: &mut Ctx) {
        if !std::mem::take(&mut self.hooks.finished) {
            return;
        }
        match self.mode.clone() {
            Mode::Intro => {
                self.intro_complete = true;
                self.mode = Mode::List;
                self.set_list(ctx, true);
                set_dialogue(ctx, SCREEN, "Select a witness to interview.");
            }
            Mode::Interview(id) => {
                ctx.audio.switch_to_main_music();
                ctx.flush_audio();
                let pending = self.hooks.witness.as_ref()
                    .map(|w| w.leads.iter().cloned().collect())
                    .unwrap_or_default();
                self.mode = Mode::Filing { id, pending };
                self.file_next(ctx);
            }
            _ => {}
        }
    }

    /// Writes the next pending lead, or wraps the interview up.
    fn file_next(&mut self, ctx: &mut Ctx) {
        let Mode::Filing { id, pending } = &mut self.mode else {
            return;
        };
        while let Some(lead) = pending.pop_front() {
            if ctx.collect_lead(&lead) {
                return;
            }
        }
        let id = id.clone();
        self.wrap_up(ctx, &id);
    }

    fn wrap_up(&mut self, ctx: &mut Ctx, id: &str) {
        ctx.session.progress.complete_witness(id);
        log::info!("Witness '{}' interviewed", id);
        let unlocked = ctx.identify_unlocked();
        ctx.push(OutputEvent::SetEnabled { element: Element::IdentifyButton, enabled: unlocked });

        self.clear_stage(ctx);
        self.mode = Mode::List;
        ctx.show(Element::WitnessList, true);
        self.set_list(ctx, true);
        if self.all_done(ctx) {
            set_dialogue(ctx, SCREEN, "All witnesses have been interviewed. Return to the menu to continue.");
            offer_back(ctx, SCREEN);
        } else {
            set_dialogue(ctx, SCREEN, "Select another witness to interview.");
        }
    }

    fn clear_stage(&mut self, ctx: &mut Ctx) {
        ctx.show(Element::WitnessImage, false);
        for flag in IMAGE_FLAGS {
            ctx.flag(Element::WitnessImage, flag, false);
        }
        ctx.flag(Element::Body, "alien-effect", false);
        self.hooks.calm_down(ctx);
        self.hooks.witness = None;
    }
}

impl Default for WitnessScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for WitnessScreen {
    fn id(&self) -> ScreenId {
        SCREEN
    }

    fn enter(&mut self, ctx: &mut Ctx) {
        ctx.play_sfx(PAPERS);
        ctx.show(Element::LeadsList, true);
        ctx.show(Element::BackButton(SCREEN), true);
        ctx.show(Element::WitnessImage, false);
        let items = ctx.story.witnesses.witnesses.iter()
            .map(|w| GridItem { id: w.id.clone(), label: w.id.clone() })
            .collect();
        ctx.push(OutputEvent::MountItems { element: Element::WitnessList, items });
        ctx.show(Element::WitnessList, true);

        if !self.intro_complete {
            self.mode = Mode::Intro;
            self.set_list(ctx, false);
            self.hooks = WitnessHooks::default();
            let intro = ctx.story.witnesses.intro.clone();
            self.seq.start(ctx, &mut self.hooks, intro);
            self.settle(ctx);
            return;
        }
        self.mode = Mode::List;
        self.set_list(ctx, true);
        if self.all_done(ctx) {
            set_dialogue(ctx, SCREEN, "You've already interviewed all witnesses.");
            offer_back(ctx, SCREEN);
        } else {
            set_dialogue(ctx, SCREEN, "Select a witness to interview.");
        }
    }

    fn leave(&mut self, ctx: &mut Ctx) {
        self.seq.stop();
        self.hooks.finished = false;
        if ctx.audio.witness_music().is_some() {
            ctx.audio.switch_to_main_music();
            ctx.flush_audio();
        }
        match std::mem::replace(&mut self.mode, Mode::Intro) {
            Mode::Filing { id, pending } => {
                for lead in pending {
                    ctx.file_lead(&lead);
                }
                ctx.session.progress.complete_witness(&id);
                self.clear_stage(ctx);
            }
            Mode::Interview(_) => self.clear_stage(ctx),
            _ => {}
        }
        self.mode = if self.intro_complete { Mode::List } else { Mode::Intro };
    }

    fn feed(&mut self, ctx: &mut Ctx, input: &InputEvent) -> bool {
        let handled = match input {
            InputEvent::Select { id } => self.select(ctx, id),
            InputEvent::Open { screen: ScreenId::Menu } => {
                back_to_menu(ctx, SCREEN);
                true
            }
            InputEvent::Continue if self.mode == Mode::List && self.all_done(ctx) => {
                back_to_menu(ctx, SCREEN);
                true
            }
            _ => drive(&mut self.seq, ctx, &mut self.hooks, input),
        };
        self.settle(ctx);
        handled
    }

    fn on_typed(&mut self, ctx: &mut Ctx) {
        if matches!(self.mode, Mode::Filing { .. }) {
            self.file_next(ctx);
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
        self.hooks = WitnessHooks::default();
        self.mode = Mode::Intro;
        self.intro_complete = false;
    }
}
