use std::collections::VecDeque;
use std::time::Duration;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::event::AudioCommand;

pub const MAIN_TRACK: &str = "bgm";
const MAIN_VOLUME: f32 = 0.4;
const WITNESS_VOLUME: f32 = 0.3;
const TRACK_VOLUME: f32 = 0.3;

/// Music shipped with the case file.
pub const TRACKS: [&str; 5] = ["bgm", "bgm-cait", "bgm-glorp", "bgm-couple", "bgm-final"];
pub const EFFECTS: [&str; 14] = [
    "click", "papers", "dice", "harp", "munch", "clack", "sparkle",
    "surprise", "squeak", "helicopter", "snap", "slurp", "alien", "spaceship",
];

/// Handle for a queued fade, see [`AudioGateway::is_done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FadeTicket(u64);

#[derive(Debug, Clone, PartialEq)]
enum FadeKind {
    Out { pause: bool },
    In { target: f32 },
}

#[derive(Debug, Clone)]
struct FadeJob {
    ticket: u64,
    track: String,
    kind: FadeKind,
    duration: Duration,
    /// Becomes the current track once this job starts.
    make_current: bool,
}

#[derive(Debug, Clone)]
struct RunningFade {
    job: FadeJob,
    from: f32,
    elapsed: Duration,
}

/// Named music tracks and one-shot effects.
///
/// Fades run one at a time in the order they were requested, so a fade out
/// on leaving a screen can never interleave with a fade in on entering the
/// next. Immediate operations (`play_track`, `pause_current`) cancel
/// whatever is queued. Unknown names are ignored.
#[derive(Debug, Default)]
pub struct AudioGateway {
    tracks: FxHashMap<String, f32>,
    sfx: FxHashSet<String>,
    volumes: FxHashMap<String, f32>,
    current: Option<String>,
    witness_music: Option<String>,
    queue: VecDeque<FadeJob>,
    running: Option<RunningFade>,
    next_ticket: u64,
    completed: u64,
    out: Vec<AudioCommand>,
}

impl AudioGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_track(&mut self, name: &str, default_volume: f32) {
        self.tracks.insert(name.to_string(), default_volume);
    }

    pub fn register_sfx(&mut self, name: &str) {
        self.sfx.insert(name.to_string());
    }

    /// Registers every bundled track and effect.
    pub fn register_bundled(&mut self) {
        for track in TRACKS {
            self.register_track(track, TRACK_VOLUME);
        }
        for effect in EFFECTS {
            self.register_sfx(effect);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn volume(&self, track: &str) -> f32 {
        self.volumes.get(track).copied().unwrap_or(0.0)
    }

    pub fn witness_music(&self) -> Option<&str> {
        self.witness_music.as_deref()
    }

    pub fn play_track(&mut self, name: &str, volume: Option<f32>) {
        let Some(&default) = self.tracks.get(name) else {
            log::debug!("play_track: unknown track '{}'", name);
            return;
        };
        self.flush_fades();
        if let Some(current) = self.current.take() {
            self.out.push(AudioCommand::Pause { track: current });
        }
        let volume = volume.unwrap_or(default);
        self.volumes.insert(name.to_string(), volume);
        self.out.push(AudioCommand::Play { track: name.to_string(), volume, restart: false });
        self.current = Some(name.to_string());
    }

    pub fn play_sfx(&mut self, name: &str) {
        if !self.sfx.contains(name) {
            log::debug!("play_sfx: unknown effect '{}'", name);
            return;
        }
        self.out.push(AudioCommand::Sfx { name: name.to_string() });
    }

    pub fn pause_current(&mut self) {
        self.flush_fades();
        if let Some(current) = &self.current {
            self.out.push(AudioCommand::Pause { track: current.clone() });
        }
    }

    /// Sets the current track's volume at once.
    pub fn set_current_volume(&mut self, volume: f32) {
        if let Some(current) = self.current.clone() {
            self.set_volume(&current, volume);
        }
    }

    /// Half the time fading the current track out, half fading `name` in.
    pub fn fade_to_track(&mut self, name: &str, duration: Duration) -> Option<FadeTicket> {
        let Some(&default) = self.tracks.get(name) else {
            log::debug!("fade_to_track: unknown track '{}'", name);
            return None;
        };
        let half = duration / 2;
        if let Some(current) = self.current.clone() {
            self.enqueue(current, FadeKind::Out { pause: true }, half, false);
        }
        Some(self.enqueue(name.to_string(), FadeKind::In { target: default }, half, true))
    }

    pub fn fade_out_current(&mut self, duration: Duration) -> Option<FadeTicket> {
        let current = self.current.clone()?;
        Some(self.enqueue(current, FadeKind::Out { pause: false }, duration, false))
    }

    pub fn fade_in(&mut self, name: &str, target: f32, duration: Duration) -> Option<FadeTicket> {
        if !self.tracks.contains_key(name) {
            log::debug!("fade_in: unknown track '{}'", name);
            return None;
        }
        Some(self.enqueue(name.to_string(), FadeKind::In { target }, duration, false))
    }

    pub fn is_done(&self, ticket: FadeTicket) -> bool {
        ticket.0 <= self.completed
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.queue.is_empty()
    }

    pub fn switch_to_witness_music(&mut self, witness: &str) {
        self.pause_current();
        self.stop_witness_music();
        self.play_track(&format!("bgm-{}", witness), Some(WITNESS_VOLUME));
        self.witness_music = Some(witness.to_string());
    }

    pub fn switch_to_main_music(&mut self) {
        self.stop_witness_music();
        self.play_track(MAIN_TRACK, Some(MAIN_VOLUME));
    }

    fn stop_witness_music(&mut self) {
        if let Some(witness) = self.witness_music.take() {
            let track = format!("bgm-{}", witness);
            if self.tracks.contains_key(&track) {
                self.out.push(AudioCommand::Pause { track });
            }
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        let mut budget = dt;
        loop {
            if self.running.is_none() {
                let Some(job) = self.queue.pop_front() else { break };
                self.begin(job);
            }
            let Some(run) = self.running.as_mut() else { break };

            let left = run.job.duration.saturating_sub(run.elapsed);
            let step = budget.min(left);
            run.elapsed += step;
            budget -= step;

            let progress = if run.job.duration.is_zero() {
                1.0
            } else {
                run.elapsed.as_secs_f32() / run.job.duration.as_secs_f32()
            };
            let target = match run.job.kind {
                FadeKind::Out { .. } => 0.0,
                FadeKind::In { target } => target,
            };
            let volume = run.from + (target - run.from) * progress.min(1.0);
            let track = run.job.track.clone();
            let finished = run.elapsed >= run.job.duration;
            self.set_volume(&track, volume);

            if !finished {
                break;
            }
            if let Some(run) = self.running.take() {
                if run.job.kind == (FadeKind::Out { pause: true }) {
                    self.out.push(AudioCommand::Pause { track: run.job.track });
                }
                self.completed = run.job.ticket;
            }
            if budget.is_zero() && self.queue.is_empty() {
                break;
            }
        }
    }

    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.out)
    }

    /// Forgets playback state. Registrations stay.
    pub fn reset(&mut self) {
        self.flush_fades();
        if let Some(current) = self.current.take() {
            self.out.push(AudioCommand::Pause { track: current });
        }
        self.stop_witness_music();
        self.volumes.clear();
    }

    fn enqueue(&mut self, track: String, kind: FadeKind, duration: Duration, make_current: bool) -> FadeTicket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.queue.push_back(FadeJob { ticket, track, kind, duration, make_current });
        FadeTicket(ticket)
    }

    fn begin(&mut self, job: FadeJob) {
        let from = match job.kind {
            FadeKind::Out { .. } => self.volume(&job.track),
            FadeKind::In { .. } => {
                self.volumes.insert(job.track.clone(), 0.0);
                self.out.push(AudioCommand::Play { track: job.track.clone(), volume: 0.0, restart: false });
                0.0
            }
        };
        if job.make_current {
            self.current = Some(job.track.clone());
        }
        self.running = Some(RunningFade { job, from, elapsed: Duration::ZERO });
    }

    fn flush_fades(&mut self) {
        if self.running.is_some() || !self.queue.is_empty() {
            log::debug!("Dropping {} pending fade(s)", self.queue.len() + self.running.is_some() as usize);
        }
        self.running = None;
        self.queue.clear();
        self.completed = self.next_ticket;
    }

    fn set_volume(&mut self, track: &str, volume: f32) {
        self.volumes.insert(track.to_string(), volume);
        self.out.push(AudioCommand::SetVolume { track: track.to_string(), volume });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    fn gateway() -> AudioGateway {
        let mut audio = AudioGateway::new();
        for track in ["bgm", "bgm-cait", "bgm-final"] {
            audio.register_track(track, 0.3);
        }
        audio.register_sfx("click");
        audio
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut audio = gateway();
        audio.play_track("nope", None);
        audio.play_sfx("nope");
        assert!(audio.fade_to_track("nope", MS(100)).is_none());
        assert!(audio.drain().is_empty());
        assert_eq!(audio.current(), None);
    }

    #[test]
    fn play_track_pauses_the_previous_one() {
        let mut audio = gateway();
        audio.play_track("bgm", None);
        audio.play_track("bgm-cait", Some(0.5));
        assert_eq!(audio.drain(), vec![
            AudioCommand::Play { track: "bgm".into(), volume: 0.3, restart: false },
            AudioCommand::Pause { track: "bgm".into() },
            AudioCommand::Play { track: "bgm-cait".into(), volume: 0.5, restart: false },
        ]);
        assert_eq!(audio.current(), Some("bgm-cait"));
    }

    #[test]
    fn crossfade_runs_out_then_in() {
        let mut audio = gateway();
        audio.play_track("bgm", None);
        let ticket = audio.fade_to_track("bgm-final", MS(2000)).unwrap();
        audio.drain();

        audio.tick(MS(500));
        assert!((audio.volume("bgm") - 0.15).abs() < 1e-4);
        assert_eq!(audio.current(), Some("bgm"));

        audio.tick(MS(500));
        assert_eq!(audio.volume("bgm"), 0.0);
        assert!(audio.drain().contains(&AudioCommand::Pause { track: "bgm".into() }));
        assert!(!audio.is_done(ticket));

        audio.tick(MS(1000));
        assert_eq!(audio.current(), Some("bgm-final"));
        assert!((audio.volume("bgm-final") - 0.3).abs() < 1e-4);
        assert!(audio.is_done(ticket));
        assert!(audio.is_idle());
    }

    #[test]
    fn immediate_play_cancels_queued_fades() {
        let mut audio = gateway();
        audio.play_track("bgm", None);
        let ticket = audio.fade_out_current(MS(8000)).unwrap();
        audio.tick(MS(100));
        audio.switch_to_main_music();
        assert!(audio.is_done(ticket));
        assert!(audio.is_idle());
        assert_eq!(audio.volume("bgm"), 0.4);
    }

    #[test]
    fn witness_music_swaps_and_returns() {
        let mut audio = gateway();
        audio.play_track("bgm", None);
        audio.switch_to_witness_music("cait");
        assert_eq!(audio.current(), Some("bgm-cait"));
        assert_eq!(audio.volume("bgm-cait"), 0.3);

        audio.switch_to_main_music();
        assert_eq!(audio.current(), Some("bgm"));
        assert_eq!(audio.witness_music(), None);
    }
}
