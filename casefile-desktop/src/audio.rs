use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use kira::{
    AudioManager, DefaultBackend, AudioManagerSettings, Frame,
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    Tween,
    Decibels
};
use log::{debug, error, warn};
use casefile_core::config::AudioConfig;
use casefile_core::event::{AudioCommand, InputEvent, OutputEvent, Tone, Waveform};
use casefile_core::renderer::Renderer;

const SAMPLE_RATE: u32 = 44_100;
const EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];
/// Volume steps arrive every frame from the core, so each one glides briefly.
const STEP: Duration = Duration::from_millis(30);

/// Plays the core's audio commands through kira.
pub struct AudioPlayer {
    manager: AudioManager<DefaultBackend>,
    tracks: HashMap<String, StaticSoundHandle>,
    cache: HashMap<String, StaticSoundData>,
    config: AudioConfig,
}

impl AudioPlayer {
    pub fn new(config: AudioConfig) -> anyhow::Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        Ok(Self {
            manager,
            tracks: HashMap::new(),
            cache: HashMap::new(),
            config,
        })
    }

    fn amplitude_to_db(amplitude: f32) -> Decibels {
        if amplitude <= 0.001 {
            Decibels::SILENCE
        } else {
            Decibels(20.0 * amplitude.log10())
        }
    }

    fn tween(duration: Duration) -> Tween {
        Tween { duration, ..Default::default() }
    }

    fn locate(&self, dir: &str, name: &str) -> Option<PathBuf> {
        let base = Path::new(&self.config.assets_path).join(dir);
        EXTENSIONS.iter()
            .map(|ext| base.join(format!("{name}.{ext}")))
            .find(|p| p.exists())
    }

    fn load(&mut self, dir: &str, name: &str) -> Option<StaticSoundData> {
        let key = format!("{dir}/{name}");
        if let Some(data) = self.cache.get(&key) {
            return Some(data.clone());
        }
        let Some(path) = self.locate(dir, name) else {
            warn!("No audio file for '{}' under {}", name, dir);
            return None;
        };
        match StaticSoundData::from_file(&path) {
            Ok(data) => {
                self.cache.insert(key, data.clone());
                Some(data)
            }
            Err(e) => {
                error!("Failed to load audio {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn handle(&mut self, command: &AudioCommand) {
        match command {
            AudioCommand::Play { track, volume, restart } => self.play(track, *volume, *restart),
            AudioCommand::Pause { track } => {
                if let Some(handle) = self.tracks.get_mut(track) {
                    handle.pause(Tween::default());
                    debug!("Audio paused [{}]", track);
                }
            }
            AudioCommand::SetVolume { track, volume } => {
                let db = Self::amplitude_to_db(volume * self.music_gain());
                if let Some(handle) = self.tracks.get_mut(track) {
                    handle.set_volume(db, Self::tween(STEP));
                }
            }
            AudioCommand::Sfx { name } => {
                let gain = self.config.master_volume * self.config.sfx_volume;
                if let Some(data) = self.load("sfx", name) {
                    self.start(data.volume(Self::amplitude_to_db(gain)));
                }
            }
            AudioCommand::Tone(tone) if self.config.voice_enabled => {
                let gain = self.config.master_volume * self.config.voice_volume;
                self.start(synthesize(tone, gain));
            }
            AudioCommand::Tone(_) => {}
        }
    }

    fn music_gain(&self) -> f32 {
        self.config.master_volume * self.config.music_volume
    }

    fn play(&mut self, track: &str, volume: f32, restart: bool) {
        let db = Self::amplitude_to_db(volume * self.music_gain());
        if !restart {
            if let Some(handle) = self.tracks.get_mut(track) {
                handle.set_volume(db, Self::tween(STEP));
                handle.resume(Tween::default());
                debug!("Audio resumed [{}]", track);
                return;
            }
        }
        if let Some(mut old) = self.tracks.remove(track) {
            old.stop(Self::tween(Duration::from_millis(100)));
        }
        let Some(data) = self.load("music", track) else {
            return;
        };
        match self.manager.play(data.loop_region(..).volume(db)) {
            Ok(handle) => {
                debug!("Audio started [{}]", track);
                self.tracks.insert(track.to_string(), handle);
            }
            Err(e) => error!("Kira play error: {}", e),
        }
    }

    fn start(&mut self, data: StaticSoundData) {
        if let Err(e) = self.manager.play(data) {
            error!("Kira play error: {}", e);
        }
    }
}

/// Renders one voice blip: the waveform under an exponential decay.
fn synthesize(tone: &Tone, gain: f32) -> StaticSoundData {
    let count = (tone.duration.as_secs_f32() * SAMPLE_RATE as f32).ceil().max(1.0) as usize;
    // decays from the peak to 0.001 over the whole blip
    let decay = (0.001f32 / tone.volume.max(0.001)).ln() / count as f32;
    let mut previous = 0.0;
    let mut filtered = 0.0;
    let alpha = tone.highpass.map(|cutoff| {
        let rc = 1.0 / (TAU * cutoff);
        rc / (rc + 1.0 / SAMPLE_RATE as f32)
    });
    let frames: Vec<Frame> = (0..count)
        .map(|i| {
            let phase = (i as f32 * tone.frequency / SAMPLE_RATE as f32).fract();
            let raw = match tone.waveform {
                Waveform::Square => if phase < 0.5 { 1.0 } else { -1.0 },
                Waveform::Sawtooth => 2.0 * phase - 1.0,
            };
            let mut sample = raw * tone.volume * (decay * i as f32).exp();
            if let Some(alpha) = alpha {
                filtered = alpha * (filtered + sample - previous);
                previous = sample;
                sample = filtered;
            }
            Frame::from_mono(sample * gain)
        })
        .collect();
    StaticSoundData {
        sample_rate: SAMPLE_RATE,
        frames: Arc::from(frames),
        settings: StaticSoundSettings::default(),
        slice: None,
    }
}

/// Wraps a frontend so audio commands reach the speakers too.
pub struct AudibleRenderer<R> {
    inner: R,
    player: AudioPlayer,
}

impl<R: Renderer> AudibleRenderer<R> {
    pub fn new(inner: R, player: AudioPlayer) -> Self {
        Self { inner, player }
    }
}

impl<R: Renderer> Renderer for AudibleRenderer<R> {
    fn render(&mut self, out: &OutputEvent) {
        if let OutputEvent::Audio(command) = out {
            self.player.handle(command);
        }
        self.inner.render(out);
    }

    fn poll(&mut self) -> Option<InputEvent> {
        self.inner.poll()
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.inner.present()
    }
}
