use std::sync::LazyLock;
use std::time::Duration;
use regex::Regex;

use crate::config::PacingConfig;
use crate::event::{GlyphStyle, Surface};
use crate::script::Pitch;

static CAPS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]{3,}").unwrap());

/// The narrator's lines carry no speaker colour.
const NARRATOR: &str = "mol";

/// True for text that should be read as shouting.
pub fn is_shouty(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_ascii_alphabetic()).peekable();
    let all_caps = letters.peek().is_some() && letters.all(|c| c.is_ascii_uppercase());
    all_caps || text.contains('!') || CAPS_RUN.is_match(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Punctuation-aware delays.
    Speech,
    /// Fixed short delay, used for list entries.
    Silent,
    /// Fixed delay at speaking speed.
    Fixed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub surface: Surface,
    /// Explicit emphasis; the caller also shakes the surface.
    pub loud: bool,
    pub speaker: Option<String>,
    pub pitch: Pitch,
    pub voiced: bool,
    /// Promote shouty text to loud glyphs and tones.
    pub detect_shouty: bool,
    pub pace: Pace,
    /// Keep the surface's current text instead of clearing it.
    pub append: bool,
    pub class: Option<String>,
}

impl RevealOptions {
    /// Spoken dialogue.
    pub fn speech(surface: Surface) -> Self {
        Self {
            surface,
            loud: false,
            speaker: None,
            pitch: Pitch::Normal,
            voiced: true,
            detect_shouty: true,
            pace: Pace::Speech,
            append: false,
            class: None,
        }
    }

    /// No voice, no emphasis, appended at the fixed list speed.
    pub fn silent(surface: Surface) -> Self {
        Self {
            voiced: false,
            detect_shouty: false,
            pace: Pace::Silent,
            append: true,
            ..Self::speech(surface)
        }
    }

    /// Low, flat letter sounds at a fixed rate.
    pub fn murmur(surface: Surface, voiced: bool) -> Self {
        Self {
            voiced,
            detect_shouty: false,
            pitch: Pitch::Low,
            pace: Pace::Fixed,
            append: true,
            ..Self::speech(surface)
        }
    }

    pub fn loud(mut self, loud: bool) -> Self {
        self.loud = loud;
        self
    }

    pub fn speaker(mut self, speaker: Option<&str>) -> Self {
        self.speaker = speaker.map(str::to_string);
        self
    }

    pub fn pitch(mut self, pitch: Pitch) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    pub fn append(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// One character made visible, plus the voice request for it if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Revealed {
    pub surface: Surface,
    pub ch: char,
    pub style: GlyphStyle,
    pub voice: Option<(bool, Pitch)>,
}

#[derive(Debug)]
struct Active {
    chars: Vec<char>,
    index: usize,
    elapsed: Duration,
    next_due: Duration,
    loud: bool,
    aside: bool,
    options: RevealOptions,
}

/// Reveals one string at a time, driven by `update`.
///
/// Starting a new reveal replaces the running one without reporting it as
/// finished, as does `skip`.
#[derive(Debug)]
pub struct Typewriter {
    pacing: PacingConfig,
    active: Option<Active>,
    finished: bool,
}

impl Typewriter {
    pub fn new(pacing: PacingConfig) -> Self {
        Self { pacing, active: None, finished: false }
    }

    pub fn start(&mut self, text: &str, options: RevealOptions) {
        let loud = options.loud || (options.detect_shouty && is_shouty(text));
        self.finished = false;
        self.active = Some(Active {
            chars: text.chars().collect(),
            index: 0,
            elapsed: Duration::ZERO,
            next_due: Duration::ZERO,
            loud,
            aside: false,
            options,
        });
    }

    /// Advances the clock and returns every character that came due.
    pub fn update(&mut self, dt: Duration) -> Vec<Revealed> {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        active.elapsed += dt;

        let mut out = Vec::new();
        while active.index < active.chars.len() && active.elapsed >= active.next_due {
            let ch = active.chars[active.index];
            if ch == '*' {
                active.aside = !active.aside;
            }
            let aside = active.aside || ch == '*';
            let opts = &active.options;
            let voice = (opts.voiced && ch.is_ascii_alphabetic() && !aside)
                .then_some((active.loud, opts.pitch));

            out.push(Revealed {
                surface: opts.surface,
                ch,
                style: GlyphStyle {
                    loud: active.loud,
                    aside,
                    speaker: opts.speaker.clone().filter(|s| s != NARRATOR),
                    class: opts.class.clone(),
                },
                voice,
            });

            active.next_due += match opts.pace {
                Pace::Speech => self.pacing.after(ch),
                Pace::Silent => Duration::from_millis(self.pacing.silent_ms),
                Pace::Fixed => Duration::from_millis(self.pacing.fixed_ms),
            };
            active.index += 1;
        }

        if active.index >= active.chars.len() && active.elapsed >= active.next_due {
            self.active = None;
            self.finished = true;
        }
        out
    }

    pub fn is_typing(&self) -> bool {
        self.active.is_some()
    }

    /// Stops at once, leaving what was revealed. Not reported as finished.
    pub fn skip(&mut self) {
        self.active = None;
        self.finished = false;
    }

    /// One-shot completion flag.
    pub fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    pub fn surface(&self) -> Option<Surface> {
        self.active.as_ref().map(|a| a.options.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScreenId;

    const MS: fn(u64) -> Duration = Duration::from_millis;
    const DIALOGUE: Surface = Surface::Dialogue(ScreenId::Intro);

    fn typewriter() -> Typewriter {
        Typewriter::new(PacingConfig::default())
    }

    fn text(revealed: &[Revealed]) -> String {
        revealed.iter().map(|r| r.ch).collect()
    }

    #[test]
    fn shouty_detection() {
        assert!(is_shouty("STOP"));
        assert!(is_shouty("oh no!"));
        assert!(is_shouty("you have SEXY legs"));
        assert!(!is_shouty("Hi there, cadet."));
        assert!(!is_shouty("I am OK"));
        assert!(!is_shouty("..."));
    }

    #[test]
    fn first_character_is_immediate_and_punctuation_slows_down() {
        let mut tw = typewriter();
        tw.start("Hi. Yo", RevealOptions::speech(DIALOGUE));

        assert_eq!(text(&tw.update(Duration::ZERO)), "H");
        assert_eq!(text(&tw.update(MS(50))), "i");
        assert_eq!(text(&tw.update(MS(50))), ".");
        // 300ms after the full stop
        assert_eq!(text(&tw.update(MS(299))), "");
        assert_eq!(text(&tw.update(MS(1))), " ");
        assert_eq!(text(&tw.update(MS(100))), "Yo");
        assert!(tw.is_typing());

        // trailing delay after the last character still counts
        tw.update(MS(49));
        assert!(tw.is_typing());
        tw.update(MS(1));
        assert!(!tw.is_typing());
        assert!(tw.take_finished());
        assert!(!tw.take_finished());
    }

    #[test]
    fn asides_are_voiceless() {
        let mut tw = typewriter();
        tw.start("a *b* c", RevealOptions::speech(DIALOGUE));
        let out = tw.update(MS(10_000));
        let voiced: String = out.iter().filter(|r| r.voice.is_some()).map(|r| r.ch).collect();
        assert_eq!(voiced, "ac");
        assert!(out[2].style.aside && out[4].style.aside && !out[6].style.aside);
    }

    #[test]
    fn shouty_text_is_loud_but_silent_reveals_never_are() {
        let mut tw = typewriter();
        tw.start("WHAT", RevealOptions::speech(DIALOGUE));
        let out = tw.update(Duration::ZERO);
        assert!(out[0].style.loud);
        assert_eq!(out[0].voice, Some((true, Pitch::Normal)));

        tw.start("WHAT", RevealOptions::silent(Surface::Lead(0)));
        let out = tw.update(Duration::ZERO);
        assert!(!out[0].style.loud);
        assert!(out[0].voice.is_none());
        assert_eq!(text(&tw.update(MS(30))), "H");
    }

    #[test]
    fn narrator_speaker_is_unstyled() {
        let mut tw = typewriter();
        tw.start("x", RevealOptions::speech(DIALOGUE).speaker(Some("mol")));
        assert_eq!(tw.update(Duration::ZERO)[0].style.speaker, None);
        tw.start("x", RevealOptions::speech(DIALOGUE).speaker(Some("cait")));
        assert_eq!(tw.update(Duration::ZERO)[0].style.speaker.as_deref(), Some("cait"));
    }

    #[test]
    fn skip_and_replace_do_not_report_completion() {
        let mut tw = typewriter();
        tw.start("long line", RevealOptions::speech(DIALOGUE));
        tw.update(MS(100));
        tw.skip();
        assert!(!tw.is_typing());
        assert!(!tw.take_finished());
        assert!(tw.update(MS(1000)).is_empty());

        tw.start("one", RevealOptions::speech(DIALOGUE));
        tw.start("", RevealOptions::speech(DIALOGUE));
        tw.update(Duration::ZERO);
        assert!(tw.take_finished());
    }
}
