//! `rodio`-backed engine.
//!
//! The output stream lives on its own thread for the lifetime of the
//! engine; handles only keep a `Sink` connected to the stream's mixer.
//! Each handle runs a small watcher thread while it is playing that
//! notices when the sink drains and reports the stop.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::error::{EngineError, PlayerError};

use super::types::{AudioEngine, AudioHandle, DeviceState, StoppedCallback};

pub struct RodioEngine {
    mixer: Mixer,
    end_poll: Duration,
    // Dropping this sender lets the output thread exit and close the stream.
    _keepalive: Sender<()>,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open_default(end_poll: Duration) -> Result<Self, PlayerError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Mixer, String>>();
        let (keepalive_tx, keepalive_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("segue-output".into())
            .spawn(move || match OutputStreamBuilder::open_default_stream() {
                Ok(mut stream) => {
                    // rodio logs to stderr when OutputStream is dropped. That's useful in
                    // debugging, but noisy for a TUI app.
                    stream.log_on_drop(false);
                    let _ = ready_tx.send(Ok(stream.mixer().clone()));
                    // Blocks until the engine is dropped.
                    let _ = keepalive_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })?;

        let mixer = ready_rx
            .recv()
            .map_err(|e| PlayerError::NoOutputDevice(e.to_string()))?
            .map_err(PlayerError::NoOutputDevice)?;

        Ok(Self {
            mixer,
            end_poll,
            _keepalive: keepalive_tx,
        })
    }
}

impl AudioEngine for RodioEngine {
    fn name(&self) -> &str {
        "rodio"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>, EngineError> {
        let file = File::open(path)?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode(e.to_string()))?;
        let total = source.total_duration();

        let sink = Sink::connect_new(&self.mixer);
        sink.append(source);
        sink.pause();

        debug!(path = %path.display(), ?total, "sink opened");
        Ok(Box::new(RodioHandle {
            sink: Arc::new(sink),
            total,
            end_poll: self.end_poll,
            shared: Arc::new(HandleShared::default()),
        }))
    }
}

#[derive(Default)]
struct HandleShared {
    state: Mutex<DeviceState>,
    callbacks: Mutex<Vec<StoppedCallback>>,
    watcher: Mutex<Option<Sender<()>>>,
    stopped: AtomicBool,
}

impl HandleShared {
    fn set_state(&self, state: DeviceState) {
        if let Ok(mut s) = self.state.lock() {
            *s = state;
        }
    }

    /// Move to `Stopped` and run the stop callbacks. Only the first call has any effect.
    fn finish(&self, sink: &Sink) {
        let callbacks = {
            let Ok(mut cbs) = self.callbacks.lock() else {
                return;
            };
            if self.stopped.swap(true, Ordering::SeqCst) {
                return;
            }
            std::mem::take(&mut *cbs)
        };
        sink.stop();
        self.set_state(DeviceState::Stopped);

        for cb in callbacks {
            cb();
        }
    }
}

struct RodioHandle {
    sink: Arc<Sink>,
    total: Option<Duration>,
    end_poll: Duration,
    shared: Arc<HandleShared>,
}

impl RodioHandle {
    fn spawn_watcher(&self) {
        let Ok(mut watcher) = self.shared.watcher.lock() else {
            return;
        };
        if watcher.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel::<()>();
        let sink = Arc::clone(&self.sink);
        let shared = Arc::clone(&self.shared);
        let poll = self.end_poll;

        let spawned = thread::Builder::new()
            .name("segue-watch".into())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(poll) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        // A paused sink still holds its source, so `empty` only
                        // turns true once the track has actually drained.
                        Err(RecvTimeoutError::Timeout) => {
                            if sink.empty() {
                                debug!("sink drained");
                                break;
                            }
                        }
                    }
                }
                shared.finish(&sink);
            });

        match spawned {
            Ok(_) => *watcher = Some(tx),
            Err(e) => warn!(error = %e, "failed to spawn end-of-track watcher"),
        }
    }
}

impl AudioHandle for RodioHandle {
    fn play(&self) {
        if self.shared.stopped.load(Ordering::SeqCst) {
            return;
        }
        self.sink.play();
        self.shared.set_state(DeviceState::Playing);
        self.spawn_watcher();
    }

    fn pause(&self) {
        if self.state() == DeviceState::Playing {
            self.sink.pause();
            self.shared.set_state(DeviceState::Paused);
        }
    }

    fn stop(&self) {
        let watcher = self.shared.watcher.lock().ok().and_then(|w| w.clone());
        match watcher {
            Some(tx) if tx.send(()).is_ok() => {}
            // Never started (or the watcher is gone): stop right here.
            _ => self.shared.finish(&self.sink),
        }
    }

    fn seek(&self, position: Duration) -> Result<(), EngineError> {
        self.sink
            .try_seek(position)
            .map_err(|e| EngineError::Seek(e.to_string()))
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.total
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn volume(&self) -> f32 {
        self.sink.volume()
    }

    fn state(&self) -> DeviceState {
        self.shared
            .state
            .lock()
            .map(|s| *s)
            .unwrap_or(DeviceState::Stopped)
    }

    fn on_stopped(&self, callback: StoppedCallback) {
        let Ok(mut cbs) = self.shared.callbacks.lock() else {
            return;
        };
        if self.shared.stopped.load(Ordering::SeqCst) {
            drop(cbs);
            callback();
            return;
        }
        cbs.push(callback);
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
