//! Scripted in-memory engine for tests.
//!
//! Handles never produce sound. Tests drive them explicitly: `finish`
//! simulates the device draining its source, `stop` fires the stop
//! callbacks synchronously on the calling thread.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::EngineError;

use super::types::{AudioEngine, AudioHandle, DeviceState, StoppedCallback};

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

#[derive(Default)]
pub struct FakeEngine {
    handles: Mutex<Vec<Arc<FakeHandle>>>,
    broken: Mutex<HashSet<PathBuf>>,
    durations: Mutex<HashMap<PathBuf, Duration>>,
    counters: Arc<Counters>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `open` fail for `path`.
    pub fn break_path(&self, path: impl Into<PathBuf>) {
        self.broken.lock().unwrap().insert(path.into());
    }

    /// Length the decoder reports for `path`.
    pub fn set_duration(&self, path: impl Into<PathBuf>, duration: Duration) {
        self.durations.lock().unwrap().insert(path.into(), duration);
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet dropped.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live handles seen so far.
    pub fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<Arc<FakeHandle>> {
        self.handles.lock().unwrap().last().cloned()
    }

    /// Wait until the latest handle is for `path` and is playing.
    pub fn wait_playing(&self, path: &Path) -> Arc<FakeHandle> {
        let mut found = None;
        wait_until(|| {
            found = self
                .latest()
                .filter(|h| h.path == path && h.state() == DeviceState::Playing);
            found.is_some()
        });
        found.unwrap()
    }
}

impl AudioEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>, EngineError> {
        if self.broken.lock().unwrap().contains(path) {
            return Err(EngineError::Decode(format!("unsupported: {}", path.display())));
        }

        let counters = Arc::clone(&self.counters);
        counters.opened.fetch_add(1, Ordering::SeqCst);
        let live = counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_live.fetch_max(live, Ordering::SeqCst);

        let handle = Arc::new(FakeHandle {
            path: path.to_path_buf(),
            total: self.durations.lock().unwrap().get(path).copied(),
            inner: Mutex::new(FakeState {
                volume: 1.0,
                ..FakeState::default()
            }),
        });
        self.handles.lock().unwrap().push(Arc::clone(&handle));
        Ok(Box::new(FakeHandleRef { handle, counters }))
    }
}

#[derive(Default)]
struct FakeState {
    device: DeviceState,
    position: Duration,
    volume: f32,
    stopped: bool,
    callbacks: Vec<StoppedCallback>,
    seeks: usize,
}

pub struct FakeHandle {
    pub path: PathBuf,
    total: Option<Duration>,
    inner: Mutex<FakeState>,
}

impl FakeHandle {
    pub fn state(&self) -> DeviceState {
        self.inner.lock().unwrap().device
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().unwrap().stopped
    }

    pub fn seeks(&self) -> usize {
        self.inner.lock().unwrap().seeks
    }

    /// Pretend playback advanced to `position`.
    pub fn advance_to(&self, position: Duration) {
        self.inner.lock().unwrap().position = position;
    }

    /// Simulate the source draining: the device stops on its own.
    pub fn finish(&self) {
        if let Some(total) = self.total {
            self.advance_to(total);
        }
        self.fire_stopped();
    }

    fn fire_stopped(&self) {
        let callbacks = {
            let mut inner = self.inner.lock().unwrap();
            if inner.stopped {
                return;
            }
            inner.stopped = true;
            inner.device = DeviceState::Stopped;
            std::mem::take(&mut inner.callbacks)
        };
        for cb in callbacks {
            cb();
        }
    }
}

struct FakeHandleRef {
    handle: Arc<FakeHandle>,
    counters: Arc<Counters>,
}

impl Drop for FakeHandleRef {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AudioHandle for FakeHandleRef {
    fn play(&self) {
        let mut inner = self.handle.inner.lock().unwrap();
        if !inner.stopped {
            inner.device = DeviceState::Playing;
        }
    }

    fn pause(&self) {
        let mut inner = self.handle.inner.lock().unwrap();
        if inner.device == DeviceState::Playing {
            inner.device = DeviceState::Paused;
        }
    }

    fn stop(&self) {
        self.handle.fire_stopped();
    }

    fn seek(&self, position: Duration) -> Result<(), EngineError> {
        let mut inner = self.handle.inner.lock().unwrap();
        if let Some(total) = self.handle.total {
            if position > total {
                return Err(EngineError::Seek(format!("{position:?} is past the end")));
            }
        }
        inner.position = position;
        inner.seeks += 1;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.handle.inner.lock().unwrap().position
    }

    fn total_duration(&self) -> Option<Duration> {
        self.handle.total
    }

    fn set_volume(&self, volume: f32) {
        self.handle.inner.lock().unwrap().volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.handle.inner.lock().unwrap().volume
    }

    fn state(&self) -> DeviceState {
        self.handle.state()
    }

    fn on_stopped(&self, callback: StoppedCallback) {
        let mut inner = self.handle.inner.lock().unwrap();
        if inner.stopped {
            drop(inner);
            callback();
        } else {
            inner.callbacks.push(callback);
        }
    }
}

/// Spin until `cond` holds, failing the test after two seconds.
pub fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(2));
    }
}
