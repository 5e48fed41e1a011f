use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Start,
    Intro,
    Title,
    Menu,
    Leads,
    Evidence,
    Witness,
    Identify,
    End,
}

/// Text surfaces that receive revealed glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Dialogue(ScreenId),
    Lead(usize),
    FearWord(usize),
    FadeOverlay,
    MenuBubble,
}

/// Named render-surface elements whose visibility or state flags the engine toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Body,
    EnterHint(ScreenId),
    ContinueButton(ScreenId),
    BackButton(ScreenId),
    DialogueBox(ScreenId),
    Portrait(ScreenId),
    NameInput,
    NameConfirm,
    LeadsList,
    Overlay,
    EvidenceGrid,
    WitnessList,
    WitnessImage,
    IdentifyGrid,
    IdentifyArea,
    FearWords,
    Dreams,
    FinaleInput,
    Luisa,
    FadeOverlay,
    SpeechBubble,
    CoffeeButton,
    IdentifyButton,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphStyle {
    pub loud: bool,
    /// Inside `*stage directions*`.
    pub aside: bool,
    pub speaker: Option<String>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Available,
    Locked,
    Completed,
    Revealed { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
}

/// One synthesized voice blip.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub waveform: Waveform,
    pub duration: Duration,
    /// Peak gain; decays exponentially to 0.001 over `duration`.
    pub volume: f32,
    pub highpass: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatVariant {
    Normal,
    Negative,
    Positive,
    Soft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingWord {
    pub id: u64,
    pub text: String,
    pub variant: FloatVariant,
    /// Percent of the viewport.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub lifetime: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Play { track: String, volume: f32, restart: bool },
    Pause { track: String },
    SetVolume { track: String, volume: f32 },
    Sfx { name: String },
    Tone(Tone),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    ShowScreen { screen: ScreenId },

    ClearText { surface: Surface },
    Glyph { surface: Surface, ch: char, style: GlyphStyle },
    SetText { surface: Surface, text: String },

    ShowChoices { screen: ScreenId, options: Vec<ChoiceOption> },
    HideChoices { screen: ScreenId },
    ShowButton { element: Element, label: String },

    SetVisible { element: Element, visible: bool },
    SetFlag { element: Element, flag: String, on: bool },
    SetImage { element: Element, image: String },
    SetEnabled { element: Element, enabled: bool },

    MountItems { element: Element, items: Vec<GridItem> },
    SetItem { element: Element, id: String, state: ItemState },

    MountLead { index: usize },
    RenameLead { index: usize, text: String },

    MountWord { index: usize, cluster: usize, separator: bool },
    StrikeWord { index: usize, strikes: u8 },
    MountDreams { surfaces: Vec<String> },
    RevealDream { index: usize, hidden: String },

    SpawnFloating(FloatingWord),
    FadeFloating { id: u64 },
    RemoveFloating { id: u64 },

    Audio(AudioCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Start,
    /// Click on the dialogue box or Enter.
    Advance,
    Choose { index: usize },
    /// The visible continue/action button of the current screen.
    Continue,
    SubmitText { text: String },
    Confirm { yes: bool },
    Open { screen: ScreenId },
    Select { id: String },
    ClickWord { index: usize },
    ClickDream { index: usize },
    GiveCoffee,
    Exit,
    PlayAgain,
    Quit,
}
