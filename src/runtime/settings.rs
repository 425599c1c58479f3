use std::env;
use std::path::PathBuf;

use crate::config;

/// Settings plus what to report about them once logging is up.
pub struct LoadedSettings {
    pub settings: config::Settings,
    pub path: Option<PathBuf>,
    pub warning: Option<String>,
}

/// Load settings, falling back to defaults on any failure.
pub fn load_settings() -> LoadedSettings {
    let path = config::config_file(|key| env::var_os(key));
    let (settings, warning) = match config::Settings::load_from(path.as_deref()) {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    };
    LoadedSettings {
        settings,
        path,
        warning,
    }
}
