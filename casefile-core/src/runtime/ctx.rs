use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::AudioGateway;
use crate::config::CoreConfig;
use crate::event::{Element, OutputEvent, ScreenId, Surface};
use crate::runtime::progress::{CollectedLeads, ProgressTracker};
use crate::runtime::timer::Timers;
use crate::script::Story;
use crate::text::{RevealOptions, Typewriter, Voice};

const SHAKE: Duration = Duration::from_millis(500);

/// Everything that survives screen switches and is wiped by "play again".
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub player_name: Option<String>,
    pub leads: CollectedLeads,
    pub progress: ProgressTracker,
}

/// Shared runtime state handed to every screen.
#[derive(Debug)]
pub struct Ctx {
    pub story: Arc<Story>,
    pub session: Session,
    pub audio: AudioGateway,
    pub rng: StdRng,
    typewriter: Typewriter,
    voice: Voice,
    events: VecDeque<OutputEvent>,
    deferred: Timers<OutputEvent>,
    route: Option<ScreenId>,
    screen: ScreenId,
    next_float_id: u64,
    seed: u64,
}

impl Ctx {
    pub fn new(story: Arc<Story>, config: &CoreConfig) -> Self {
        Self {
            story,
            session: Session::default(),
            audio: AudioGateway::new(),
            rng: StdRng::seed_from_u64(config.system.seed),
            typewriter: Typewriter::new(config.pacing.clone()),
            voice: Voice { enabled: config.audio.voice_enabled, volume: 1.0 },
            events: VecDeque::new(),
            deferred: Timers::default(),
            route: None,
            screen: ScreenId::Start,
            next_float_id: 0,
            seed: config.system.seed,
        }
    }

    pub fn push(&mut self, event: OutputEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<OutputEvent> {
        self.flush_audio();
        self.events.drain(..).collect()
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub(crate) fn set_screen(&mut self, screen: ScreenId) {
        self.screen = screen;
    }

    pub fn show(&mut self, element: Element, visible: bool) {
        self.push(OutputEvent::SetVisible { element, visible });
    }

    pub fn flag(&mut self, element: Element, flag: &str, on: bool) {
        self.push(OutputEvent::SetFlag { element, flag: flag.to_string(), on });
    }

    /// Starts revealing `text`, replacing any reveal still running.
    pub fn reveal(&mut self, text: &str, options: RevealOptions) {
        if options.loud {
            let screen = match options.surface {
                Surface::Dialogue(screen) => Some(screen),
                _ => None,
            };
            self.shake_flash(screen);
        }
        self.finish_lead();
        if !options.append {
            self.push(OutputEvent::ClearText { surface: options.surface });
        }
        self.typewriter.start(text, options);
        self.pump_typewriter(Duration::ZERO);
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_typing()
    }

    /// True once after a reveal ran to its end.
    pub fn take_typed(&mut self) -> bool {
        self.typewriter.take_finished()
    }

    pub fn skip_typing(&mut self) {
        self.finish_lead();
        self.typewriter.skip();
    }

    /// A lead entry cut off mid-reveal is written out in full; only dialogue
    /// may stay half typed.
    fn finish_lead(&mut self) {
        let Some(surface @ Surface::Lead(index)) = self.typewriter.surface() else {
            return;
        };
        if let Some(text) = self.session.leads.as_slice().get(index).cloned() {
            self.push(OutputEvent::SetText { surface, text });
        }
    }

    pub fn play_sfx(&mut self, name: &str) {
        self.audio.play_sfx(name);
        self.flush_audio();
    }

    pub fn play_track(&mut self, name: &str, volume: Option<f32>) {
        self.audio.play_track(name, volume);
        self.flush_audio();
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.audio.set_current_volume(volume);
        self.flush_audio();
    }

    /// Pushes `event` after `delay`.
    pub fn defer(&mut self, delay: Duration, event: OutputEvent) {
        self.deferred.after(delay, event);
    }

    /// Body flash plus a shake of the screen's dialogue box, for half a second.
    pub fn shake_flash(&mut self, screen: Option<ScreenId>) {
        self.flag(Element::Body, "flash", true);
        self.defer(SHAKE, OutputEvent::SetFlag { element: Element::Body, flag: "flash".into(), on: false });
        if let Some(screen) = screen {
            let element = Element::DialogueBox(screen);
            self.flag(element, "shake", true);
            self.defer(SHAKE, OutputEvent::SetFlag { element, flag: "shake".into(), on: false });
        }
    }

    pub fn request_screen(&mut self, screen: ScreenId) {
        self.route = Some(screen);
    }

    pub fn take_route(&mut self) -> Option<ScreenId> {
        self.route.take()
    }

    /// Adds a lead to the case file and types it into its own list entry.
    /// Returns `false` for a lead already collected.
    pub fn collect_lead(&mut self, lead: &str) -> bool {
        let Some(index) = self.session.leads.push_unique(lead) else {
            log::debug!("Lead already collected: {}", lead);
            return false;
        };
        self.push(OutputEvent::MountLead { index });
        self.reveal(lead, RevealOptions::silent(Surface::Lead(index)));
        true
    }

    /// Adds a lead and writes its entry at once, without a reveal.
    pub fn file_lead(&mut self, lead: &str) -> bool {
        let Some(index) = self.session.leads.push_unique(lead) else {
            return false;
        };
        self.push(OutputEvent::MountLead { index });
        self.push(OutputEvent::SetText { surface: Surface::Lead(index), text: lead.to_string() });
        true
    }

    pub fn rename_lead(&mut self, old: &str, new: &str) {
        if let Some(index) = self.session.leads.rename(old, new) {
            self.push(OutputEvent::RenameLead { index, text: new.to_string() });
        }
    }

    pub fn identify_unlocked(&self) -> bool {
        self.session.progress.can_identify(
            self.story.evidence.items.len(),
            self.story.witnesses.witnesses.len(),
        )
    }

    pub fn next_float_id(&mut self) -> u64 {
        self.next_float_id += 1;
        self.next_float_id
    }

    pub fn tick(&mut self, dt: Duration) {
        self.pump_typewriter(dt);
        self.audio.tick(dt);
        for event in self.deferred.tick(dt) {
            self.push(event);
        }
        self.flush_audio();
    }

    /// Back to a cold start. Track and effect registrations are kept.
    pub fn reset(&mut self) {
        self.session = Session::default();
        self.typewriter.skip();
        self.deferred.clear();
        self.events.clear();
        self.route = None;
        self.next_float_id = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.audio.reset();
        self.flush_audio();
    }

    fn pump_typewriter(&mut self, dt: Duration) {
        for revealed in self.typewriter.update(dt) {
            if let Some((loud, pitch)) = revealed.voice {
                if let Some(tone) = self.voice.tone(revealed.ch, loud, pitch, &mut self.rng) {
                    self.events.push_back(OutputEvent::Audio(crate::event::AudioCommand::Tone(tone)));
                }
            }
            self.events.push_back(OutputEvent::Glyph {
                surface: revealed.surface,
                ch: revealed.ch,
                style: revealed.style,
            });
        }
    }

    pub(crate) fn flush_audio(&mut self) {
        for command in self.audio.drain() {
            log::debug!("audio: {:?}", command);
            self.events.push_back(OutputEvent::Audio(command));
        }
    }
}
