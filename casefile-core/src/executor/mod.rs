//! The generic script walker shared by every screen.
//!
//! A [`Sequencer`] owns a stack of frames (the root script plus one frame per
//! choice response being played) and one explicit [`SeqState`]. Screens
//! specialise it through [`StepHooks`]; everything they do not handle falls
//! back to [`walk::walk_step`].

mod call_stack;
mod frame;
pub mod walk;

use std::time::Duration;

use call_stack::CallStack;
use frame::Frame;
use crate::event::{ChoiceOption, Element, OutputEvent, ScreenId};
use crate::runtime::Ctx;
use crate::script::{Action, ChoiceArm, DialogueStep, Pitch, Script};

pub use walk::{say_step, speech, walk_step, Cue, Flow, Then};

pub const CLICK: &str = "click";
pub const DEFAULT_PORTRAIT: &str = "Mol.png";

#[derive(Debug, Clone, PartialEq)]
pub enum SeqState {
    Idle,
    Typing(Then),
    WaitingForInput,
    WaitingForChoice,
    WaitingForButton,
    WaitingForText(Element),
    WaitingForConfirm,
    Pausing { remaining: Duration, then: Then },
    /// Parked by a hook; the screen is in charge.
    Halted,
    Complete,
}

/// How plain lines move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Wait for the player.
    Manual,
    /// Hold each line for a fixed time, then continue.
    Auto(Duration),
}

/// Per-screen specialisation. Every method has a neutral default.
pub trait StepHooks {
    /// Handles a step; `None` falls back to the generic walk.
    fn on_step(&mut self, _ctx: &mut Ctx, _step: &DialogueStep) -> Option<Flow> {
        None
    }

    /// Decides what follows a [`Then::Resume`].
    fn resume(&mut self, _ctx: &mut Ctx, _step: &DialogueStep) -> Then {
        Then::AwaitInput
    }

    fn on_choice(&mut self, _ctx: &mut Ctx, _arm: &ChoiceArm) {}

    fn on_button(&mut self, _ctx: &mut Ctx, _step: &DialogueStep) -> Option<Flow> {
        None
    }

    /// `None` rejects the input and keeps the field open.
    fn on_text(&mut self, _ctx: &mut Ctx, _step: &DialogueStep, _text: &str) -> Option<Flow> {
        None
    }

    fn voice(&self, step: &DialogueStep) -> Pitch {
        step.pitch.unwrap_or_default()
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {}
}

pub struct NoHooks;

impl StepHooks for NoHooks {}

#[derive(Debug, Clone)]
pub struct Sequencer {
    screen: ScreenId,
    call_stack: CallStack,
    state: SeqState,
    pacing: Pacing,
    portrait_swapped: bool,
}

impl Sequencer {
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            call_stack: CallStack::default(),
            state: SeqState::Idle,
            pacing: Pacing::Manual,
            portrait_swapped: false,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn state(&self) -> &SeqState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SeqState::Complete
    }

    /// Neither idle nor complete.
    pub fn is_running(&self) -> bool {
        !matches!(self.state, SeqState::Idle | SeqState::Complete)
    }

    pub fn current(&self) -> Option<&DialogueStep> {
        self.call_stack.top().and_then(Frame::current)
    }

    /// Cursor of the innermost frame.
    pub fn cursor(&self) -> Option<usize> {
        self.call_stack.top().map(|f| f.pc)
    }

    pub fn depth(&self) -> usize {
        self.call_stack.depth()
    }

    pub fn start<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, script: Script) {
        log::debug!("{:?}: starting script of {} steps", self.screen, script.len());
        self.call_stack.clear();
        self.call_stack.push(Frame::new(script, 0));
        self.state = SeqState::Idle;
        self.process(ctx, hooks);
    }

    /// Drops the script without completing.
    pub fn stop(&mut self) {
        self.call_stack.clear();
        self.state = SeqState::Idle;
        self.portrait_swapped = false;
    }

    /// Player asked to move on. Only acts while waiting for input with no
    /// reveal running.
    pub fn advance<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) -> bool {
        if self.state != SeqState::WaitingForInput || ctx.is_typing() {
            return false;
        }
        self.state = SeqState::Idle;
        ctx.show(Element::EnterHint(self.screen), false);
        ctx.play_sfx(CLICK);
        self.next(ctx, hooks);
        true
    }

    pub fn choose<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, index: usize) -> bool {
        if self.state != SeqState::WaitingForChoice {
            return false;
        }
        let arm = match self.current().map(|s| &s.action) {
            Some(Action::Choice(choice)) => match choice.arms.get(index) {
                Some(arm) => arm.clone(),
                None => {
                    log::debug!("{:?}: no choice #{}", self.screen, index);
                    return false;
                }
            },
            _ => return false,
        };
        self.state = SeqState::Idle;
        ctx.push(OutputEvent::HideChoices { screen: self.screen });
        ctx.play_sfx(CLICK);
        hooks.on_choice(ctx, &arm);

        let response = arm.response.to_script(arm.continue_label.as_deref());
        self.call_stack.push(Frame::new(response, 0));
        self.process(ctx, hooks);
        true
    }

    pub fn press_button<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) -> bool {
        if self.state != SeqState::WaitingForButton {
            return false;
        }
        self.state = SeqState::Idle;
        ctx.show(Element::ContinueButton(self.screen), false);
        ctx.play_sfx(CLICK);
        let flow = match self.current().cloned() {
            Some(step) => hooks.on_button(ctx, &step),
            None => None,
        };
        self.run_flow(ctx, hooks, flow.unwrap_or(Flow::then(Then::Next)));
        true
    }

    pub fn submit_text<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, text: &str) -> bool {
        let SeqState::WaitingForText(element) = self.state else {
            return false;
        };
        let Some(step) = self.current().cloned() else {
            return false;
        };
        let Some(flow) = hooks.on_text(ctx, &step, text) else {
            return false;
        };
        self.state = SeqState::Idle;
        ctx.show(element, false);
        self.run_flow(ctx, hooks, flow);
        true
    }

    /// Yes moves on, no reopens the name field.
    pub fn confirm<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, yes: bool) -> bool {
        if self.state != SeqState::WaitingForConfirm {
            return false;
        }
        self.state = SeqState::Idle;
        ctx.show(Element::NameConfirm, false);
        ctx.play_sfx(CLICK);
        if yes {
            self.next(ctx, hooks);
        } else {
            self.enter(ctx, hooks, Then::TextInput(Element::NameInput));
        }
        true
    }

    /// The reveal started for the current step is done.
    pub fn on_typed<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) {
        if let SeqState::Typing(then) = &self.state {
            let then = then.clone();
            self.state = SeqState::Idle;
            self.enter(ctx, hooks, then);
        }
    }

    pub fn tick<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, dt: Duration) {
        let SeqState::Pausing { remaining, then } = &mut self.state else {
            return;
        };
        if *remaining > dt {
            *remaining -= dt;
            return;
        }
        let then = then.clone();
        self.state = SeqState::Idle;
        self.enter(ctx, hooks, then);
    }

    /// Continues after a hook parked the sequencer or typed on its own.
    pub fn proceed<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, flow: Flow) {
        if matches!(self.state, SeqState::Complete) {
            return;
        }
        self.state = SeqState::Idle;
        self.run_flow(ctx, hooks, flow);
    }

    fn next<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) {
        if let Some(frame) = self.call_stack.top_mut() {
            frame.advance();
        }
        self.process(ctx, hooks);
    }

    fn process<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) {
        loop {
            let Some(frame) = self.call_stack.top() else {
                self.complete(ctx, hooks);
                return;
            };
            if let Some(step) = frame.current().cloned() {
                self.run_step(ctx, hooks, step);
                return;
            }
            // response finished, the choice that pushed it is done too
            self.call_stack.pop();
            match self.call_stack.top_mut() {
                Some(parent) => parent.advance(),
                None => {
                    self.complete(ctx, hooks);
                    return;
                }
            }
        }
    }

    fn run_step<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, step: DialogueStep) {
        log::debug!("{:?}: step {:?} {:?}", self.screen, self.cursor(), step.action);
        ctx.show(Element::EnterHint(self.screen), false);
        ctx.show(Element::ContinueButton(self.screen), false);
        ctx.push(OutputEvent::HideChoices { screen: self.screen });

        if let Some(portrait) = &step.portrait {
            ctx.push(OutputEvent::SetImage { element: Element::Portrait(self.screen), image: portrait.clone() });
            self.portrait_swapped = true;
        } else if self.portrait_swapped {
            self.restore_portrait(ctx);
        }
        // a loud line shakes once its reveal starts
        if step.effect.is_some() && !(step.loud && step.text.is_some()) {
            ctx.shake_flash(Some(self.screen));
        }
        if let Some(sound) = &step.sound {
            if !step.action.defers_sound() {
                ctx.play_sfx(sound);
            }
        }

        let flow = match hooks.on_step(ctx, &step) {
            Some(flow) => flow,
            None => walk_step(ctx, self.screen, &step, hooks.voice(&step)),
        };
        self.run_flow(ctx, hooks, flow);
    }

    fn run_flow<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, flow: Flow) {
        match flow.cue {
            Cue::Say { text, options } => {
                self.state = SeqState::Typing(flow.then);
                ctx.reveal(&text, options);
            }
            Cue::Typing => self.state = SeqState::Typing(flow.then),
            Cue::Nothing => self.enter(ctx, hooks, flow.then),
        }
    }

    fn enter<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H, then: Then) {
        match then {
            Then::AwaitInput => match self.pacing {
                Pacing::Auto(hold) => self.state = SeqState::Pausing { remaining: hold, then: Then::Next },
                Pacing::Manual => {
                    if self.call_stack.top().and_then(Frame::peek).is_some_and(DialogueStep::is_bare_choice) {
                        self.next(ctx, hooks);
                    } else {
                        self.state = SeqState::WaitingForInput;
                        ctx.show(Element::EnterHint(self.screen), true);
                    }
                }
            },
            Then::Choices => {
                let options = match self.current().map(|s| &s.action) {
                    Some(Action::Choice(choice)) => choice.arms.iter()
                        .map(|a| ChoiceOption { label: a.label.clone(), hover: a.hover.clone() })
                        .collect::<Vec<_>>(),
                    _ => {
                        log::warn!("{:?}: choices requested on a step without any", self.screen);
                        return self.next(ctx, hooks);
                    }
                };
                ctx.push(OutputEvent::ShowChoices { screen: self.screen, options });
                self.state = SeqState::WaitingForChoice;
            }
            Then::Button(label) => {
                ctx.push(OutputEvent::ShowButton { element: Element::ContinueButton(self.screen), label });
                self.state = SeqState::WaitingForButton;
            }
            Then::TextInput(element) => {
                ctx.show(element, true);
                self.state = SeqState::WaitingForText(element);
            }
            Then::Confirm => {
                ctx.show(Element::NameConfirm, true);
                self.state = SeqState::WaitingForConfirm;
            }
            Then::Next => self.next(ctx, hooks),
            Then::Resume => {
                let then = match self.current().cloned() {
                    Some(step) => hooks.resume(ctx, &step),
                    None => Then::Next,
                };
                self.enter(ctx, hooks, then);
            }
            Then::Pause(remaining, then) => self.state = SeqState::Pausing { remaining, then: *then },
            Then::Halt => self.state = SeqState::Halted,
            Then::Finish => {
                self.call_stack.clear();
                self.complete(ctx, hooks);
            }
        }
    }

    fn complete<H: StepHooks>(&mut self, ctx: &mut Ctx, hooks: &mut H) {
        if self.portrait_swapped {
            self.restore_portrait(ctx);
        }
        log::debug!("{:?}: script complete", self.screen);
        self.state = SeqState::Complete;
        hooks.on_complete(ctx);
    }

    fn restore_portrait(&mut self, ctx: &mut Ctx) {
        ctx.push(OutputEvent::SetImage {
            element: Element::Portrait(self.screen),
            image: DEFAULT_PORTRAIT.to_string(),
        });
        self.portrait_swapped = false;
    }
}
