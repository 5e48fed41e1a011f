use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub story_path: String,
    pub log_path:   String,
    pub log_level:  String,
    /// Seed for voice jitter, floating-word placement and idle-line picks.
    pub seed:       u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub assets_path:   String,
    pub master_volume: f32,
    pub music_volume:  f32,
    pub sfx_volume:    f32,
    pub voice_volume:  f32,
    pub voice_enabled: bool,
}

/// Reveal delays in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub tick_ms:     u64,
    pub char_ms:     u64,
    pub sentence_ms: u64,
    pub comma_ms:    u64,
    pub dash_ms:     u64,
    pub silent_ms:   u64,
    pub fixed_ms:    u64,
}

/// Everything the launcher writes into a fresh `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    pub system: SystemConfig,
    pub audio: AudioConfig,
    pub pacing: PacingConfig,
}

impl CoreConfig {
    /// Pulls every section out of the shared store.
    pub fn load() -> Self {
        Self {
            system: casefile_shared::config::get("system"),
            audio: casefile_shared::config::get("audio"),
            pacing: casefile_shared::config::get("pacing"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            story_path: "game/".into(),
            log_path:   "logs/".into(),
            log_level:  "info".into(),
            seed:       0x5eed_da9e,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            assets_path: "assets/".into(),
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            voice_volume: 1.0,
            voice_enabled: true,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            tick_ms:     16,
            char_ms:     50,
            sentence_ms: 300,
            comma_ms:    150,
            dash_ms:     200,
            silent_ms:   30,
            fixed_ms:    50,
        }
    }
}

impl PacingConfig {
    /// Delay after revealing `ch` in spoken text.
    pub fn after(&self, ch: char) -> Duration {
        let ms = match ch {
            '.' | '!' | '?' => self.sentence_ms,
            ',' => self.comma_ms,
            '…' | '—' => self.dash_ms,
            _ => self.char_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
