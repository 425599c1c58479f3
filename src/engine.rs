//! The audio engine seam.
//!
//! The player never decodes or renders audio itself. It talks to an
//! [`AudioEngine`] that opens files into [`AudioHandle`]s; the production
//! engine is backed by `rodio`, tests use a scripted in-memory engine.

mod output;
mod types;

pub use output::RodioEngine;
pub use types::{AudioEngine, AudioHandle, DeviceState, StoppedCallback};

#[cfg(test)]
pub(crate) mod fake;
