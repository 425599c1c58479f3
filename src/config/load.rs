use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::schema::Settings;

const ENV_PREFIX: &str = "SEGUE";
const PATH_VAR: &str = "SEGUE_CONFIG_PATH";

impl Settings {
    /// Layer `SEGUE__*` variables over `path` (if it exists) over defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the player cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err("audio.default_volume must be within 0.0..=1.0".to_string());
        }
        if self.audio.volume_step <= 0.0 {
            return Err("audio.volume_step must be > 0".to_string());
        }
        if self.audio.end_poll_ms == 0 {
            return Err("audio.end_poll_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Config file location: `SEGUE_CONFIG_PATH`, else `segue/config.toml`
/// under `XDG_CONFIG_HOME` or `~/.config`.
///
/// `lookup` reads a variable; the runtime passes the process environment.
pub fn config_file(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(explicit) = lookup(PATH_VAR) {
        return Some(PathBuf::from(explicit));
    }
    let base = lookup("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("segue").join("config.toml"))
}
