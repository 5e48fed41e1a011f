use std::time::Duration;

use crate::event::{Element, ScreenId, Surface};
use crate::runtime::Ctx;
use crate::script::{Action, DialogueStep, Pitch};
use crate::text::RevealOptions;

/// What the sequencer does once the step's text (if any) is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Then {
    AwaitInput,
    Choices,
    Button(String),
    TextInput(Element),
    Confirm,
    /// Straight on to the next step.
    Next,
    /// Ask the hooks again once typing is done.
    Resume,
    Pause(Duration, Box<Then>),
    /// Park here; the screen drives things until it calls `proceed`.
    Halt,
    /// Drop the whole script and complete.
    Finish,
}

impl Then {
    pub fn pause(ms: u64, then: Then) -> Self {
        Then::Pause(Duration::from_millis(ms), Box::new(then))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Say { text: String, options: RevealOptions },
    /// A reveal was already started by the handler.
    Typing,
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub cue: Cue,
    pub then: Then,
}

impl Flow {
    pub fn then(then: Then) -> Self {
        Self { cue: Cue::Nothing, then }
    }

    pub fn say(text: impl Into<String>, options: RevealOptions, then: Then) -> Self {
        Self { cue: Cue::Say { text: text.into(), options }, then }
    }

    pub fn typing(then: Then) -> Self {
        Self { cue: Cue::Typing, then }
    }
}

/// Reveal options for a step's own text on `screen`.
pub fn speech(screen: ScreenId, step: &DialogueStep, pitch: Pitch) -> RevealOptions {
    let mut options = RevealOptions::speech(Surface::Dialogue(screen))
        .loud(step.loud)
        .speaker(step.speaker.as_deref())
        .pitch(pitch);
    if step.whisper {
        options = options.append().class("whisper");
    }
    options
}

/// Says the step's text, then `then`. Whispers are appended after a space.
pub fn say_step(screen: ScreenId, step: &DialogueStep, pitch: Pitch, then: Then) -> Flow {
    let text = if step.whisper {
        format!(" {}", step.text())
    } else {
        step.text().to_string()
    };
    Flow::say(text, speech(screen, step, pitch), then)
}

/// Default handling for the tags every screen understands.
pub fn walk_step(ctx: &mut Ctx, screen: ScreenId, step: &DialogueStep, pitch: Pitch) -> Flow {
    log::trace!("walk_step {:?}: {:?}", screen, step.action);
    match &step.action {
        Action::Wait => say_step(screen, step, pitch, Then::AwaitInput),
        Action::Choice(_) if step.text.is_none() => Flow::then(Then::Choices),
        Action::Choice(_) => say_step(screen, step, pitch, Then::Choices),
        Action::NameInput => say_step(screen, step, pitch, Then::TextInput(Element::NameInput)),
        Action::ContinueButton { label } => say_step(screen, step, pitch, Then::Button(label.clone())),
        Action::AddLead { lead } => {
            if ctx.collect_lead(lead) {
                Flow::typing(Then::Next)
            } else {
                Flow::then(Then::Next)
            }
        }
        Action::End if step.text.is_none() => Flow::then(Then::Finish),
        Action::End => say_step(screen, step, pitch, Then::Finish),
        other => {
            log::debug!("{:?} has no handler for {:?}, treating it as a line", screen, other);
            say_step(screen, step, pitch, Then::AwaitInput)
        }
    }
}
