use std::time::Duration;

use crate::engine::DeviceState;
use crate::library::Track;

/// Mutable controller bookkeeping. Guarded by the controller's state lock.
#[derive(Debug)]
pub(super) struct ControllerState {
    pub current_track: Option<Track>,
    pub playlist: Vec<Track>,
    pub cursor: usize,
    pub is_swipe: bool,
    pub is_empty: bool,
    pub active: bool,
    /// Generation of the session this controller bound last.
    pub generation: Option<u64>,
    /// Generation a playback worker was last started for.
    pub started: Option<u64>,
    pub last_error: Option<String>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            current_track: None,
            playlist: Vec::new(),
            cursor: 0,
            is_swipe: false,
            is_empty: true,
            active: false,
            generation: None,
            started: None,
            last_error: None,
        }
    }
}

/// Read-only view of the player for UIs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub track: Option<Track>,
    pub cursor: usize,
    pub playlist_len: usize,
    pub is_swipe: bool,
    pub is_empty: bool,
    /// Playback is logically active (playing or about to play).
    pub active: bool,
    pub device: DeviceState,
    pub elapsed: Duration,
    pub total: Duration,
    pub volume: f32,
    /// Last failure that happened off the caller's thread, e.g. during auto-advance.
    pub last_error: Option<String>,
}
