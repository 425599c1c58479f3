use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{AudioEngine, DeviceState};
use crate::error::{PlayerError, Result};
use crate::library::{Playlist, Track};
use crate::playback::{FinishReason, PlaybackUnit, TrackFinished};

use super::navigation::{Direction, shuffled, step};
use super::state::{ControllerState, PlayerStatus};

pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

/// A no-argument callback registered by the UI.
///
/// Hooks run outside the state lock, so they may read the controller, but
/// they must not call mutating operations.
type Hook = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    unit: PlaybackUnit,
    state: Mutex<ControllerState>,
    /// Serialises compound operations (drops, navigation, transport).
    ops: Mutex<()>,
    notifier: RwLock<Option<Hook>>,
    track_started: RwLock<Option<Hook>>,
}

/// Drives a [`PlaybackUnit`] through single tracks and playlists.
///
/// Cloning is cheap; all clones control the same player.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub fn new(engine: Arc<dyn AudioEngine>, default_volume: f32) -> Self {
        let inner = Arc::new(Inner {
            unit: PlaybackUnit::new(engine, default_volume),
            state: Mutex::new(ControllerState::default()),
            ops: Mutex::new(()),
            notifier: RwLock::new(None),
            track_started: RwLock::new(None),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        inner.unit.on_finished(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_track_finished(event);
            }
        });

        Self { inner }
    }

    /// Name of the output backend driving this player.
    pub fn name(&self) -> &str {
        self.inner.unit.engine_name()
    }

    /// Register the notification sink, replacing any earlier one.
    pub fn set_notifier(&self, notifier: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.inner.notifier.write() {
            *slot = Some(Arc::new(notifier));
        }
    }

    /// Register a hook fired each time a track is about to start, resume or
    /// pause through `pause_or_resume`, including after every advance.
    pub fn set_on_track_started(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.inner.track_started.write() {
            *slot = Some(Arc::new(hook));
        }
    }

    /// Load a single track. Finishing it stops playback; nothing advances.
    ///
    /// If the track cannot be opened it still becomes the current track,
    /// the error is kept in `last_error` and returned; `play` retries it.
    pub fn drop_track(&self, track: Track) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.cleanup();

        info!(track = %track.name, "dropping track");
        {
            let mut st = self.inner.state();
            st.current_track = Some(track.clone());
            st.is_swipe = false;
            st.is_empty = false;
        }
        let bound = self.inner.bind_current(&track);
        self.inner.notify();
        bound
    }

    /// Load a playlist and bind the track at `start_index`.
    ///
    /// Finishing a track advances to the next one, wrapping at the end,
    /// for as long as the playlist stays loaded. An empty playlist leaves
    /// the player empty.
    pub fn drop_playlist(&self, playlist: &Playlist, start_index: usize) -> Result<()> {
        if !playlist.is_empty() && start_index >= playlist.len() {
            return Err(PlayerError::StartIndexOutOfRange {
                index: start_index,
                len: playlist.len(),
            });
        }

        let _ops = self.inner.ops();
        self.inner.cleanup();

        if playlist.is_empty() {
            info!(playlist = %playlist.name, "dropped playlist is empty");
            return Ok(());
        }

        info!(playlist = %playlist.name, len = playlist.len(), start_index, "dropping playlist");
        let track = playlist.tracks()[start_index].clone();
        {
            let mut st = self.inner.state();
            st.playlist = playlist.tracks().to_vec();
            st.cursor = start_index;
            st.current_track = Some(track.clone());
            st.is_swipe = true;
            st.is_empty = false;
        }
        let bound = self.inner.bind_current(&track);
        self.inner.notify();
        bound
    }

    /// Start playback on a worker thread. Resumes if paused.
    pub fn play(&self) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.play()
    }

    /// Stop playback. Safe to call repeatedly.
    pub fn stop(&self) {
        let _ops = self.inner.ops();
        self.inner.stop();
    }

    pub fn pause_or_resume(&self) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.pause_or_resume()
    }

    pub fn next(&self) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.advance(Direction::Next)
    }

    pub fn previous(&self) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.advance(Direction::Previous)
    }

    /// Reorder the loaded playlist at random and reload it from the first track.
    pub fn shuffle(&self) -> Result<()> {
        let _ops = self.inner.ops();
        self.inner.shuffle()
    }

    pub fn change_volume(&self, volume: f32) {
        self.inner.unit.set_volume(volume);
    }

    /// Rewind the current track to its start.
    pub fn repeat(&self) -> Result<()> {
        self.inner.unit.repeat()
    }

    /// Jump to an absolute offset into the current track.
    pub fn seek(&self, seconds: f64) -> Result<()> {
        let offset = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        self.inner.unit.reset_time(offset)
    }

    pub fn current_track(&self) -> Option<Track> {
        self.inner.state().current_track.clone()
    }

    pub fn cursor(&self) -> usize {
        self.inner.state().cursor
    }

    pub fn playlist(&self) -> Vec<Track> {
        self.inner.state().playlist.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state().is_empty
    }

    pub fn is_swipe(&self) -> bool {
        self.inner.state().is_swipe
    }

    pub fn is_active(&self) -> bool {
        self.inner.state().active
    }

    pub fn current_time(&self) -> Duration {
        self.inner.unit.position()
    }

    pub fn total_time(&self) -> Duration {
        self.inner.unit.total_time()
    }

    pub fn volume(&self) -> f32 {
        self.inner.unit.volume()
    }

    pub fn status(&self) -> PlayerStatus {
        let st = self.inner.state();
        PlayerStatus {
            track: st.current_track.clone(),
            cursor: st.cursor,
            playlist_len: st.playlist.len(),
            is_swipe: st.is_swipe,
            is_empty: st.is_empty,
            active: st.active,
            device: self.inner.unit.state(),
            elapsed: self.inner.unit.position(),
            total: self.inner.unit.total_time(),
            volume: self.inner.unit.volume(),
            last_error: st.last_error.clone(),
        }
    }
}

fn fire(hook: &RwLock<Option<Hook>>) {
    let hook = hook.read().ok().and_then(|h| h.clone());
    if let Some(hook) = hook {
        hook();
    }
}

impl Inner {
    fn ops(&self) -> MutexGuard<'_, ()> {
        self.ops.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn notify(&self) {
        fire(&self.notifier);
    }

    fn set_active(&self, active: bool) {
        self.state().active = active;
    }

    /// Bind `track` and remember the generation; failures are kept for the UI.
    fn bind_current(&self, track: &Track) -> Result<()> {
        match self.unit.bind(track) {
            Ok(generation) => {
                let mut st = self.state();
                st.generation = Some(generation);
                st.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(track = %track.name, error = %e, "failed to bind track");
                let mut st = self.state();
                st.generation = None;
                st.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reset everything a drop replaces.
    fn cleanup(&self) {
        self.set_active(false);
        self.notify();
        self.unit.stop();

        let mut st = self.state();
        st.cursor = 0;
        st.current_track = None;
        st.is_swipe = false;
        st.is_empty = true;
        st.generation = None;
        if !st.playlist.is_empty() {
            st.playlist.clear();
        }
    }

    fn spawn_play_worker(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("segue-play".into())
            .spawn(move || {
                inner.unit.play();
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn playback worker");
            self.set_active(false);
            self.notify();
        }
    }

    fn play(self: &Arc<Self>) -> Result<()> {
        let current = {
            let st = self.state();
            if st.is_empty {
                debug!("play ignored: nothing loaded");
                return Ok(());
            }
            st.current_track.clone()
        };

        match self.unit.state() {
            DeviceState::Playing => Ok(()),
            DeviceState::Paused => {
                self.set_active(true);
                self.notify();
                self.unit.pause();
                Ok(())
            }
            DeviceState::Stopped => {
                // A finished or stopped session can't be restarted; bind afresh.
                let bound = self.unit.generation();
                if bound.is_none() || bound != self.state().generation {
                    if let Some(track) = current {
                        self.bind_current(&track)?;
                    }
                }
                {
                    let mut st = self.state();
                    if st.generation.is_some() && st.started == st.generation {
                        debug!("play ignored: worker already started for this session");
                        return Ok(());
                    }
                    st.started = st.generation;
                    st.active = true;
                }
                self.notify();
                self.spawn_play_worker();
                Ok(())
            }
        }
    }

    /// Stop playback and forget the session, so a finish event already
    /// in flight for it cannot advance.
    fn stop(&self) {
        self.unit.stop();
        {
            let mut st = self.state();
            st.active = false;
            st.generation = None;
        }
        self.notify();
    }

    fn pause_or_resume(self: &Arc<Self>) -> Result<()> {
        if self.state().is_empty {
            debug!("pause/resume ignored: nothing loaded");
            return Ok(());
        }
        fire(&self.track_started);
        match self.unit.state() {
            DeviceState::Stopped => self.play(),
            DeviceState::Paused => {
                self.set_active(true);
                self.notify();
                self.unit.pause();
                Ok(())
            }
            DeviceState::Playing => {
                self.set_active(false);
                self.notify();
                self.unit.pause();
                Ok(())
            }
        }
    }

    fn advance(self: &Arc<Self>, direction: Direction) -> Result<()> {
        {
            let st = self.state();
            if !st.is_swipe || st.is_empty || st.playlist.is_empty() {
                debug!(?direction, "navigation ignored: no playlist loaded");
                return Ok(());
            }
        }

        self.unit.stop();
        self.set_active(false);
        self.notify();

        let track = {
            let mut st = self.state();
            st.cursor = step(st.cursor, st.playlist.len(), direction);
            let track = st.playlist[st.cursor].clone();
            st.current_track = Some(track.clone());
            info!(?direction, cursor = st.cursor, track = %track.name, "advancing");
            track
        };

        let bound = self.bind_current(&track);
        self.notify();
        bound?;
        self.pause_or_resume()
    }

    fn shuffle(self: &Arc<Self>) -> Result<()> {
        let (was_active, reordered) = {
            let st = self.state();
            if !st.is_swipe || st.playlist.is_empty() {
                debug!("shuffle ignored: no playlist loaded");
                return Ok(());
            }
            (st.active, shuffled(&st.playlist, &mut rand::rng()))
        };

        self.unit.stop();
        self.set_active(false);
        self.notify();

        let track = reordered[0].clone();
        {
            let mut st = self.state();
            st.playlist = reordered;
            st.cursor = 0;
            st.current_track = Some(track.clone());
        }
        info!(track = %track.name, "playlist shuffled");

        let bound = self.bind_current(&track);
        self.notify();
        bound?;
        if was_active {
            self.pause_or_resume()?;
        }
        Ok(())
    }

    /// The single persistent reaction to a finished track.
    fn on_track_finished(self: &Arc<Self>, event: TrackFinished) {
        if event.reason == FinishReason::Stopped {
            return;
        }

        let _ops = self.ops();
        let swipe = {
            let st = self.state();
            if st.generation != Some(event.generation) {
                debug!(generation = event.generation, "ignoring finish from a replaced session");
                return;
            }
            if !st.active {
                // Paused or stopped while this event waited for the lock.
                debug!(generation = event.generation, "ignoring finish after playback was halted");
                return;
            }
            st.is_swipe && !st.playlist.is_empty()
        };

        if swipe {
            if let Err(e) = self.advance(Direction::Next) {
                warn!(error = %e, "auto-advance failed");
            }
        } else {
            self.unit.stop();
            self.set_active(false);
            self.notify();
        }
    }
}

#[cfg(test)]
impl Controller {
    /// Run `during` and then stop, all under the operation lock, the way a
    /// `stop()` racing another thread would.
    pub(super) fn stop_while_busy(&self, during: impl FnOnce()) {
        let _ops = self.inner.ops();
        during();
        self.inner.stop();
    }
}
