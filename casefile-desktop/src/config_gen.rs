use std::fs;
use std::path::Path;
use serde::Serialize;
use casefile_core::config::{AudioConfig, CoreConfig, PacingConfig, SystemConfig};

/// Layout of a fresh `config.toml`: one table per section.
#[derive(Serialize)]
struct FullConfig {
    system: SystemConfig,
    audio: AudioConfig,
    pacing: PacingConfig,
}

impl From<CoreConfig> for FullConfig {
    fn from(core: CoreConfig) -> Self {
        Self { system: core.system, audio: core.audio, pacing: core.pacing }
    }
}

pub fn ensure_config_exists(path: &str) {
    if Path::new(path).exists() {
        return;
    }

    println!("Creating default configuration at '{}'...", path);

    let toml_str = match toml::to_string_pretty(&FullConfig::from(CoreConfig::default())) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize default config: {}", e);
            return;
        }
    };

    if let Err(e) = fs::write(path, toml_str) {
        eprintln!("Failed to write config file: {}", e);
    } else {
        println!("Config file created successfully.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reads_back_section_by_section() {
        let text = toml::to_string_pretty(&FullConfig::from(CoreConfig::default())).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert!(table.contains_key("system"));
        assert!(table.contains_key("audio"));
        let pacing: PacingConfig = table["pacing"].clone().try_into().unwrap();
        assert_eq!(pacing.char_ms, PacingConfig::default().char_ms);
    }
}
