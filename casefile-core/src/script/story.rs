use super::{Pitch, Script};

/// The whole case file, validated.
#[derive(Debug, Clone)]
pub struct Story {
    pub intro: Script,
    pub leads: Script,
    pub evidence: EvidenceBook,
    pub witnesses: WitnessBook,
    pub identify: IdentifyBook,
    pub menu: MenuBook,
}

#[derive(Debug, Clone)]
pub struct EvidenceBook {
    pub intro: Script,
    pub items: Vec<EvidenceItem>,
}

#[derive(Debug, Clone)]
pub struct EvidenceItem {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub lead_text: String,
    /// Replaces `lead_text` in the collected leads once the player leaves the
    /// evidence screen with this item complete.
    pub lead_text_after: Option<String>,
    pub dialogue: Script,
}

#[derive(Debug, Clone)]
pub struct WitnessBook {
    pub intro: Script,
    pub witnesses: Vec<Witness>,
}

#[derive(Debug, Clone)]
pub struct Witness {
    pub id: String,
    pub image: String,
    pub music: bool,
    pub pitch: Pitch,
    pub wide: bool,
    pub delay_image: bool,
    pub leads: Vec<String>,
    pub dialogue: Script,
}

#[derive(Debug, Clone)]
pub struct IdentifyBook {
    pub intro: Script,
    pub items: Vec<ProfileItem>,
    pub after_evidence: Script,
    pub fears: FearBook,
    pub dreams: DreamBook,
    pub finale: FinaleBook,
}

#[derive(Debug, Clone)]
pub struct ProfileItem {
    pub id: String,
    pub name: String,
    pub trait_name: String,
    pub dialogue: Script,
}

#[derive(Debug, Clone)]
pub struct FearBook {
    pub intro: Script,
    pub clusters: Vec<WordCluster>,
    pub responses: Vec<CrossOutResponse>,
    pub additional: Vec<AdditionalCluster>,
    pub conclusion: Script,
}

#[derive(Debug, Clone)]
pub struct WordCluster {
    pub words: Vec<String>,
    pub depression: DepressionStage,
    /// The one word that needs two strikes.
    pub double_click: Option<String>,
    pub after_appear: Script,
}

#[derive(Debug, Clone)]
pub struct CrossOutResponse {
    pub line: String,
    pub recovery: Option<RecoveryStage>,
    pub show_more_words: bool,
}

#[derive(Debug, Clone)]
pub struct AdditionalCluster {
    pub words: Vec<String>,
    pub response: String,
    pub recovery: Option<RecoveryStage>,
}

#[derive(Debug, Clone)]
pub struct DreamBook {
    pub items: Vec<Dream>,
    pub conclusion: Script,
}

#[derive(Debug, Clone)]
pub struct Dream {
    pub surface: String,
    pub hidden: String,
    pub response: String,
}

#[derive(Debug, Clone)]
pub struct FinaleBook {
    pub floating_words: Vec<String>,
    pub prompt: String,
    pub valid_answers: Vec<String>,
    pub wrong_answer_messages: Vec<String>,
    pub final_dialogue: Script,
    pub end_messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MenuBook {
    pub idle_lines: Vec<IdleLine>,
    pub coffee_reactions: Vec<String>,
    pub special_sprites: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IdleLine {
    pub text: String,
    pub coffee: bool,
}

/// How heavy the fear overlay feels. Only ever rises during the fear reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DepressionStage {
    #[default]
    Clear,
    Dim,
    Heavy,
    Crushing,
    Numb,
}

impl DepressionStage {
    pub fn from_level(level: u8) -> Option<Self> {
        Some(match level {
            0 => DepressionStage::Clear,
            1 => DepressionStage::Dim,
            2 => DepressionStage::Heavy,
            3 => DepressionStage::Crushing,
            4 => DepressionStage::Numb,
            _ => return None,
        })
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Music volume while this stage is active; `None` leaves it alone.
    pub fn music_volume(self) -> Option<f32> {
        match self {
            DepressionStage::Clear => None,
            DepressionStage::Dim => Some(0.15),
            _ => Some(0.0),
        }
    }
}

/// How much of the overlay has been lifted while crossing words out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecoveryStage {
    Easing,
    Lifting,
    Brightening,
    Restored,
}

impl RecoveryStage {
    pub fn from_level(level: u8) -> Option<Self> {
        Some(match level {
            1 => RecoveryStage::Easing,
            2 => RecoveryStage::Lifting,
            3 => RecoveryStage::Brightening,
            4 => RecoveryStage::Restored,
            _ => return None,
        })
    }

    pub fn level(self) -> u8 {
        self as u8 + 1
    }
}

impl Story {
    pub fn evidence_item(&self, id: &str) -> Option<&EvidenceItem> {
        self.evidence.items.iter().find(|i| i.id == id)
    }

    pub fn witness(&self, id: &str) -> Option<&Witness> {
        self.witnesses.witnesses.iter().find(|w| w.id == id)
    }

    pub fn profile_item(&self, id: &str) -> Option<&ProfileItem> {
        self.identify.items.iter().find(|i| i.id == id)
    }
}
