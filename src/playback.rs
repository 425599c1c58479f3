//! The playback unit: one bound track, one output handle, one finished signal.

mod session;
mod unit;

pub use session::{FinishReason, TrackFinished};
pub use unit::{DEFAULT_VOLUME, PlaybackUnit};
