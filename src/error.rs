//! Error types shared by the engine, the playback unit and the controller.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by an audio engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("seek rejected: {0}")]
    Seek(String),
}

/// Errors surfaced to callers of the playback unit and the controller.
///
/// Transport calls made without a bound track are not errors; they are
/// ignored so a UI never has to handle them.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("cannot open {path:?}: {source}")]
    EngineOpen {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("start index {index} is out of range for a playlist of {len} tracks")]
    StartIndexOutOfRange { index: usize, len: usize },

    #[error("seek failed: {0}")]
    Seek(#[source] EngineError),

    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
