use std::path::Path;
use std::time::Duration;

use crate::error::EngineError;

/// Transport state reported by an output device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Fired once when a device reaches the stopped state.
pub type StoppedCallback = Box<dyn FnOnce() + Send + 'static>;

/// One opened file bound to one output device.
///
/// A freshly opened handle reports `Stopped` at position zero until the
/// first `play`. Once it is stopped through [`AudioHandle::stop`] or by
/// draining its source, `play` has no effect any more and every callback
/// registered with [`AudioHandle::on_stopped`] runs exactly once.
pub trait AudioHandle: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn seek(&self, position: Duration) -> Result<(), EngineError>;
    fn position(&self) -> Duration;
    /// Length reported by the decoder, if it knows one.
    fn total_duration(&self) -> Option<Duration>;
    /// Set output volume; implementations clamp to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);
    fn volume(&self) -> f32;
    fn state(&self) -> DeviceState;
    fn on_stopped(&self, callback: StoppedCallback);
}

pub trait AudioEngine: Send + Sync {
    /// Short human-readable backend name.
    fn name(&self) -> &str;
    fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>, EngineError>;
}
