use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::engine::AudioHandle;
use crate::library::Track;

/// Why a session ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// The device stopped by itself after draining the track.
    EndOfTrack,
    /// Someone asked the unit to stop (or a new track displaced this one).
    Stopped,
}

/// Emitted exactly once per `PlaybackUnit::play` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrackFinished {
    pub generation: u64,
    pub reason: FinishReason,
}

/// The live pairing of a track with an output handle.
pub(super) struct Session {
    pub generation: u64,
    pub track: Track,
    pub handle: Arc<LiveHandle>,
    pub end: Arc<SessionEnd>,
}

type CloseHook = Box<dyn FnOnce() + Send + Sync>;

struct OnClose(Option<CloseHook>);

impl Drop for OnClose {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            hook();
        }
    }
}

/// An engine handle that reports when it has actually been dropped.
///
/// Removing a session from the unit is not enough to free its device:
/// any clone still in flight keeps it open. The close hook runs only
/// after the wrapped handle itself is gone.
pub(super) struct LiveHandle {
    handle: Box<dyn AudioHandle>,
    // Fields drop in order: the hook fires after `handle`.
    _closed: OnClose,
}

impl LiveHandle {
    pub fn new(handle: Box<dyn AudioHandle>, on_close: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            handle,
            _closed: OnClose(Some(Box::new(on_close))),
        }
    }
}

impl Deref for LiveHandle {
    type Target = dyn AudioHandle;

    fn deref(&self) -> &Self::Target {
        &*self.handle
    }
}

#[derive(Debug, Copy, Clone)]
struct Ending {
    reason: FinishReason,
    position: Option<Duration>,
}

/// Completion latch for one session, set from the engine's stopped callback.
#[derive(Default)]
pub(super) struct SessionEnd {
    stop_requested: AtomicBool,
    ending: Mutex<Option<Ending>>,
    done: Condvar,
}

impl SessionEnd {
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Record the end of the session and where the device stood at that
    /// moment; later calls keep the first record.
    pub fn complete(&self, position: Option<Duration>) -> FinishReason {
        let reason = if self.stop_requested.load(Ordering::SeqCst) {
            FinishReason::Stopped
        } else {
            FinishReason::EndOfTrack
        };

        let mut slot = self.ending.lock().unwrap_or_else(|p| p.into_inner());
        let ending = *slot.get_or_insert(Ending { reason, position });
        self.done.notify_all();
        ending.reason
    }

    /// Block until `complete` has been called.
    pub fn wait(&self) -> (FinishReason, Option<Duration>) {
        let slot = self.ending.lock().unwrap_or_else(|p| p.into_inner());
        let slot = self
            .done
            .wait_while(slot, |ending| ending.is_none())
            .unwrap_or_else(|p| p.into_inner());
        match *slot {
            Some(ending) => (ending.reason, ending.position),
            None => (FinishReason::Stopped, None),
        }
    }
}
