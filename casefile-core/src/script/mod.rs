//! Typed dialogue content.
//!
//! Everything here is produced once by [`raw`] at load time; the runtime never
//! inspects the shape of the legacy JSON again.

pub mod raw;
pub mod story;

use std::sync::Arc;

pub use raw::ContentError;
pub use story::*;

/// A walkable list of steps. Shared between the story and live frames.
pub type Script = Arc<[DialogueStep]>;

/// Named voice colouring presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Pitch {
    #[default]
    Normal,
    Medium,
    High,
    Low,
    VeryHigh,
    Alien,
    Luisa,
}

impl Pitch {
    /// Unknown names fall back to `Normal`.
    pub fn parse(name: &str) -> Self {
        match name {
            "normal" => Pitch::Normal,
            "medium" => Pitch::Medium,
            "high" => Pitch::High,
            "low" => Pitch::Low,
            "veryHigh" => Pitch::VeryHigh,
            "alien" => Pitch::Alien,
            "luisa" => Pitch::Luisa,
            other => {
                log::warn!("Unknown pitch profile '{}', using normal", other);
                Pitch::Normal
            }
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Pitch::Normal => 1.0,
            Pitch::Medium => 1.3,
            Pitch::High => 1.8,
            Pitch::Low => 0.7,
            Pitch::VeryHigh => 2.2,
            Pitch::Alien => 2.0,
            Pitch::Luisa => 1.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ShakeFlash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueStep {
    pub text: Option<String>,
    pub action: Action,
    pub loud: bool,
    pub effect: Option<Effect>,
    pub sound: Option<String>,
    pub speaker: Option<String>,
    pub pitch: Option<Pitch>,
    /// Narrator sprite shown for this step only.
    pub portrait: Option<String>,
    /// Witness image swap, kept until the interview ends.
    pub change_image: Option<String>,
    /// Dimmed line appended to the current text instead of replacing it.
    pub whisper: bool,
}

impl DialogueStep {
    pub fn new(action: Action) -> Self {
        Self {
            text: None,
            action,
            loud: false,
            effect: None,
            sound: None,
            speaker: None,
            pitch: None,
            portrait: None,
            change_image: None,
            whisper: false,
        }
    }

    /// A plain line that waits for the player.
    pub fn line(text: impl Into<String>) -> Self {
        Self::new(Action::Wait).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// A choice with no prompt of its own, shown right under the previous line.
    pub fn is_bare_choice(&self) -> bool {
        matches!(self.action, Action::Choice(_)) && self.text.is_none()
    }
}

/// Closed set of step tags.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Wait,
    Choice(ChoiceStep),
    NameInput,
    ContinueButton { label: String },
    AddLead { lead: String },
    ColoredText { color: String, strikethrough: bool },
    ShowOverlay,
    HideOverlay,
    EndLeads,
    MusicChange,

    ShowImage,
    Spin { label: String },
    FlyAway { label: String },
    BeamUp,
    Vanish { label: String },

    ShowGrid,
    HideGrid,
    StartFears,
    ShowFears,
    ShowNextCluster,
    EnableCrossing,
    FadeWords,
    FullRecovery,
    ShowDreams,
    ShowFinale,
    StartFade,
    End,
}

impl Action {
    /// Steps whose sound is played at a later beat than the step start.
    pub fn defers_sound(&self) -> bool {
        matches!(self, Action::Vanish { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceStep {
    pub arms: Vec<ChoiceArm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceArm {
    pub label: String,
    pub hover: Option<String>,
    pub response: ResponsePayload,
    /// Replaces the final wait of the response with a labelled button.
    pub continue_label: Option<String>,
}

/// What a choice arm plays once picked.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Plain(String),
    Sequence(Vec<String>),
    Steps(Script),
}

impl ResponsePayload {
    /// Flattens the payload into a script the sequencer can push as a frame.
    pub fn to_script(&self, continue_label: Option<&str>) -> Script {
        let mut steps: Vec<DialogueStep> = match self {
            ResponsePayload::Plain(text) => vec![DialogueStep::line(text.clone())],
            ResponsePayload::Sequence(lines) => lines.iter().cloned().map(DialogueStep::line).collect(),
            ResponsePayload::Steps(steps) => steps.to_vec(),
        };
        if let Some(label) = continue_label {
            if let Some(last) = steps.last_mut() {
                if last.action == Action::Wait {
                    last.action = Action::ContinueButton { label: label.to_string() };
                }
            }
        }
        steps.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continue_label_replaces_only_a_trailing_wait() {
        let payload = ResponsePayload::Sequence(vec!["one".into(), "two".into()]);
        let script = payload.to_script(Some("We can continue"));
        assert_eq!(script.len(), 2);
        assert_eq!(script[0].action, Action::Wait);
        assert_eq!(script[1].action, Action::ContinueButton { label: "We can continue".into() });

        let steps: Script = vec![DialogueStep::new(Action::StartFears).with_text("go")].into();
        let script = ResponsePayload::Steps(steps).to_script(Some("ignored"));
        assert_eq!(script[0].action, Action::StartFears);
    }

    #[test]
    fn unknown_pitch_is_normal() {
        assert_eq!(Pitch::parse("veryHigh"), Pitch::VeryHigh);
        assert_eq!(Pitch::parse("baritone"), Pitch::Normal);
        assert_eq!(Pitch::parse("baritone").multiplier(), 1.0);
    }
}
