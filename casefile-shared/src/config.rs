use std::sync::RwLock;
use std::path::Path;
use std::fs;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use toml::Table;

static GLOBAL_CONFIG: OnceCell<RwLock<Table>> = OnceCell::new();

/// Loads `config.toml` into the process-wide store.
///
/// A missing file or a syntax error is not fatal: the store is initialized
/// empty and every section falls back to its `Default`.
pub fn init<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();

    let content = if path.exists() {
        log::info!("Loading config from {:?}", path);
        fs::read_to_string(path)?
    } else {
        log::warn!("Config file not found at {:?}, using defaults.", path);
        String::new()
    };

    init_from_str(&content)
}

pub fn init_from_str(content: &str) -> anyhow::Result<()> {
    let table: Table = toml::from_str(content).unwrap_or_else(|e| {
        log::error!("Config syntax error: {}, using empty config.", e);
        Table::new()
    });

    GLOBAL_CONFIG.set(RwLock::new(table))
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

/// Reads section `[key]` as `T`.
///
/// Falls back to `T::default()` when the store was never initialized, the
/// section is absent, or its shape does not match.
pub fn get<T: DeserializeOwned + Default>(key: &str) -> T {
    let Some(store) = GLOBAL_CONFIG.get() else {
        log::debug!("Config not initialized, section '[{}]' uses defaults.", key);
        return T::default();
    };
    let read_guard = match store.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(value) = read_guard.get(key) {
        value.clone().try_into().unwrap_or_else(|e| {
            log::warn!("Config section '[{}]' mismatch: {}. Using default.", key, e);
            T::default()
        })
    } else {
        T::default()
    }
}

/// Overrides a single section at runtime, e.g. from command line flags.
pub fn set_section(key: &str, value: toml::Value) {
    let Some(store) = GLOBAL_CONFIG.get() else {
        log::warn!("Config not initialized, ignoring override for '[{}]'", key);
        return;
    };
    let mut write_guard = match store.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    write_guard.insert(key.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct Section {
        level: String,
        seed: u64,
    }

    impl Default for Section {
        fn default() -> Self {
            Self { level: "info".into(), seed: 7 }
        }
    }

    // One test only: the store is process-wide and can be initialized once.
    #[test]
    fn sections_fall_back_to_defaults() {
        init_from_str("[system]\nlevel = \"debug\"\n\n[broken]\nseed = \"nope\"\n").unwrap();
        assert!(is_initialized());

        let system: Section = get("system");
        assert_eq!(system, Section { level: "debug".into(), seed: 7 });

        let broken: Section = get("broken");
        assert_eq!(broken, Section::default());

        let missing: Section = get("missing");
        assert_eq!(missing, Section::default());

        assert!(init_from_str("").is_err());

        set_section("missing", toml::Value::Table({
            let mut t = Table::new();
            t.insert("seed".into(), toml::Value::Integer(42));
            t
        }));
        let patched: Section = get("missing");
        assert_eq!(patched.seed, 42);
    }
}
