use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use crate::engine::{AudioEngine, DeviceState};
use crate::error::{PlayerError, Result};
use crate::library::Track;

use super::session::{FinishReason, LiveHandle, Session, SessionEnd, TrackFinished};

/// Volume applied to a freshly bound track unless configured otherwise.
pub const DEFAULT_VOLUME: f32 = 0.5;

type FinishedHandler = Arc<dyn Fn(TrackFinished) + Send + Sync>;

#[derive(Default)]
struct Slot {
    session: Option<Session>,
    generation: u64,
    volume: f32,
    /// Generation whose engine handle has not been dropped yet.
    open: Option<u64>,
}

struct Shared {
    slot: Mutex<Slot>,
    released: Condvar,
    on_finished: Mutex<Option<FinishedHandler>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Take the session out of the slot if `generation` is still the bound one.
    fn take(&self, generation: u64) -> Option<Session> {
        let mut slot = self.lock();
        if slot.session.as_ref().is_some_and(|s| s.generation == generation) {
            slot.session.take()
        } else {
            None
        }
    }

    /// Close-hook target: the handle of `generation` is gone.
    fn closed(&self, generation: u64) {
        {
            let mut slot = self.lock();
            if slot.open == Some(generation) {
                slot.open = None;
            }
        }
        debug!(generation, "output handle closed");
        self.released.notify_all();
    }
}

/// Owns at most one bound track and its output handle.
///
/// `play` blocks its calling thread until the bound track ends or is
/// stopped, so callers that must stay responsive run it on a worker.
/// There is no timeout: an engine that never reports stopped keeps that
/// worker blocked.
pub struct PlaybackUnit {
    engine: Arc<dyn AudioEngine>,
    default_volume: f32,
    shared: Arc<Shared>,
}

impl PlaybackUnit {
    pub fn new(engine: Arc<dyn AudioEngine>, default_volume: f32) -> Self {
        let default_volume = default_volume.clamp(0.0, 1.0);
        Self {
            engine,
            default_volume,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    volume: default_volume,
                    ..Slot::default()
                }),
                released: Condvar::new(),
                on_finished: Mutex::new(None),
            }),
        }
    }

    /// Install the single "track finished" handler, replacing any previous one.
    pub fn on_finished(&self, handler: impl Fn(TrackFinished) + Send + Sync + 'static) {
        let mut slot = self
            .shared
            .on_finished
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        *slot = Some(Arc::new(handler));
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    fn current(&self) -> Option<(u64, Arc<LiveHandle>, Arc<SessionEnd>)> {
        self.shared
            .lock()
            .session
            .as_ref()
            .map(|s| (s.generation, Arc::clone(&s.handle), Arc::clone(&s.end)))
    }

    fn handle(&self) -> Option<Arc<LiveHandle>> {
        self.shared
            .lock()
            .session
            .as_ref()
            .map(|s| Arc::clone(&s.handle))
    }

    /// Stop the bound session and block until its engine handle is dropped.
    ///
    /// The caller must not hold a handle clone itself.
    fn release_current(&self) {
        if let Some((_, handle, end)) = self.current() {
            end.request_stop();
            handle.stop();
        }

        let slot = self.shared.lock();
        let _slot = self
            .shared
            .released
            .wait_while(slot, |s| s.open.is_some())
            .unwrap_or_else(|p| p.into_inner());
    }

    /// Bind `track`, tearing down whatever was bound before.
    ///
    /// Returns the generation of the new session. On failure the unit is
    /// left unbound. The previous handle is dropped before the new one is
    /// opened, so at most one engine handle is ever open.
    pub fn bind(&self, track: &Track) -> Result<u64> {
        self.release_current();

        let handle = self
            .engine
            .open(&track.path)
            .map_err(|source| PlayerError::EngineOpen {
                path: track.path.clone(),
                source,
            })?;
        handle.set_volume(self.default_volume);

        let end = Arc::new(SessionEnd::default());
        let (generation, live, displaced) = {
            let mut slot = self.shared.lock();
            slot.generation += 1;
            let generation = slot.generation;

            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            let live = Arc::new(LiveHandle::new(handle, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.closed(generation);
                }
            }));

            slot.open = Some(generation);
            slot.volume = live.volume();
            let displaced = slot.session.replace(Session {
                generation,
                track: track.clone(),
                handle: Arc::clone(&live),
                end: Arc::clone(&end),
            });
            (generation, live, displaced)
        };
        drop(displaced);

        // Registered after the session is stored so an immediate callback
        // still finds it.
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        live.on_stopped(Box::new(move || {
            let session = weak.upgrade().and_then(|shared| shared.take(generation));
            let position = session.as_ref().map(|s| s.handle.position());
            end.complete(position);
            if let Some(session) = session {
                debug!(generation, track = %session.track.name, "session released");
            }
        }));

        debug!(generation, track = %track.name, "session bound");
        Ok(generation)
    }

    /// Start the device and block until the session ends.
    ///
    /// Returns `None` without blocking when nothing is bound. Otherwise the
    /// finished handler runs exactly once and the same event is returned.
    /// The worker keeps no handle while it waits, so the handler may bind
    /// the next track.
    pub fn play(&self) -> Option<TrackFinished> {
        let total = self.total_time();
        let (generation, end) = {
            let (generation, handle, end) = self.current()?;
            handle.play();
            (generation, end)
        };

        let (reason, position) = end.wait();
        if reason == FinishReason::EndOfTrack && position.is_some_and(|p| p != total) {
            debug!(
                generation,
                ?position,
                ?total,
                "device stopped before position reached the reported length"
            );
        }

        let event = TrackFinished { generation, reason };
        let handler = self
            .shared
            .on_finished
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(handler) = handler {
            handler(event);
        }
        Some(event)
    }

    /// Toggle between paused and playing. Does nothing when stopped or unbound.
    pub fn pause(&self) {
        let Some(handle) = self.handle() else {
            return;
        };
        match handle.state() {
            DeviceState::Paused => handle.play(),
            DeviceState::Playing => handle.pause(),
            DeviceState::Stopped => {}
        }
    }

    /// Ask the device to stop. The release happens in the stopped callback.
    pub fn stop(&self) {
        if let Some((_, handle, end)) = self.current() {
            end.request_stop();
            handle.stop();
        }
    }

    /// Rewind the bound track without restarting the device.
    pub fn repeat(&self) -> Result<()> {
        match self.handle() {
            Some(handle) => handle.seek(Duration::ZERO).map_err(PlayerError::Seek),
            None => Ok(()),
        }
    }

    /// Jump to an absolute offset: halt output, seek, then resume if it was playing.
    pub fn reset_time(&self, offset: Duration) -> Result<()> {
        let Some(handle) = self.handle() else {
            return Ok(());
        };
        let was_playing = handle.state() == DeviceState::Playing;
        if was_playing {
            handle.pause();
        }
        let seeked = handle.seek(offset).map_err(PlayerError::Seek);
        if was_playing {
            handle.play();
        }
        if let Err(e) = &seeked {
            warn!(error = %e, ?offset, "seek failed");
        }
        seeked
    }

    pub fn set_volume(&self, volume: f32) {
        let mut guard = self.shared.lock();
        let slot = &mut *guard;
        if let Some(session) = slot.session.as_ref() {
            session.handle.set_volume(volume);
            slot.volume = session.handle.volume();
        }
    }

    pub fn volume(&self) -> f32 {
        let slot = self.shared.lock();
        match slot.session.as_ref() {
            Some(session) => session.handle.volume(),
            None => slot.volume,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.handle()
            .map(|h| h.state())
            .unwrap_or(DeviceState::Stopped)
    }

    pub fn position(&self) -> Duration {
        self.handle()
            .map(|h| h.position())
            .unwrap_or(Duration::ZERO)
    }

    /// Decoder length, falling back to the track's own duration.
    pub fn total_time(&self) -> Duration {
        let slot = self.shared.lock();
        slot.session
            .as_ref()
            .map(|s| s.handle.total_duration().unwrap_or(s.track.duration))
            .unwrap_or(Duration::ZERO)
    }

    pub fn current_track(&self) -> Option<Track> {
        self.shared.lock().session.as_ref().map(|s| s.track.clone())
    }

    pub fn generation(&self) -> Option<u64> {
        self.shared.lock().session.as_ref().map(|s| s.generation)
    }

    pub fn is_bound(&self) -> bool {
        self.shared.lock().session.is_some()
    }
}
