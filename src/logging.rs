//! Tracing setup for the binary.
//!
//! The terminal belongs to the TUI, so log lines go to the configured
//! file or nowhere.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::Result;

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::sink).try_init(),
    };
    Ok(())
}
