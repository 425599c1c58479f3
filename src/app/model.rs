//! The `App` view model and the key bindings that drive the controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::KeyCode;
use tracing::warn;

use crate::config::Settings;
use crate::error::Result;
use crate::player::{Controller, MAX_VOLUME, MIN_VOLUME};

/// A user intent, decoupled from the key that triggered it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    PauseResume,
    Play,
    Stop,
    Next,
    Previous,
    Shuffle,
    Repeat,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBack,
    Quit,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::Char(' ') | KeyCode::Char('p') => Self::PauseResume,
            KeyCode::Enter => Self::Play,
            KeyCode::Char('s') => Self::Stop,
            KeyCode::Char('l') | KeyCode::Right => Self::Next,
            KeyCode::Char('h') | KeyCode::Left => Self::Previous,
            KeyCode::Char('z') => Self::Shuffle,
            KeyCode::Char('r') => Self::Repeat,
            KeyCode::Char('+') | KeyCode::Char('=') => Self::VolumeUp,
            KeyCode::Char('-') => Self::VolumeDown,
            KeyCode::Char('L') => Self::SeekForward,
            KeyCode::Char('H') => Self::SeekBack,
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// Absolute seek target `delta_secs` away from `elapsed`, kept inside the track.
pub fn seek_target(elapsed: Duration, total: Duration, delta_secs: i64) -> f64 {
    let target = elapsed.as_secs_f64() + delta_secs as f64;
    target.clamp(0.0, total.as_secs_f64())
}

pub fn step_volume(current: f32, step: f32, up: bool) -> f32 {
    let next = if up { current + step } else { current - step };
    next.clamp(MIN_VOLUME, MAX_VOLUME)
}

pub struct App {
    pub controller: Controller,
    /// The file or directory the player was started with.
    pub source: String,
    /// Last error shown in the status box.
    pub message: Option<String>,
    dirty: Arc<AtomicBool>,
    volume_step: f32,
    seek_seconds: u64,
}

impl App {
    /// Wrap `controller` and register a notifier that marks the view dirty.
    pub fn new(controller: Controller, source: String, settings: &Settings) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        {
            let dirty = Arc::clone(&dirty);
            controller.set_notifier(move || dirty.store(true, Ordering::SeqCst));
        }

        Self {
            controller,
            source,
            message: None,
            dirty,
            volume_step: settings.audio.volume_step,
            seek_seconds: settings.controls.seek_seconds,
        }
    }

    pub fn seek_seconds(&self) -> u64 {
        self.seek_seconds
    }

    /// True once after every notification.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    /// Run `action`. Returns `false` when the app should exit.
    pub fn apply(&mut self, action: Action) -> bool {
        let result: Result<()> = match action {
            Action::PauseResume => self.controller.pause_or_resume(),
            Action::Play => self.controller.play(),
            Action::Stop => {
                self.controller.stop();
                Ok(())
            }
            Action::Next => self.controller.next(),
            Action::Previous => self.controller.previous(),
            Action::Shuffle => self.controller.shuffle(),
            Action::Repeat => self.controller.repeat(),
            Action::VolumeUp | Action::VolumeDown => {
                let v = step_volume(
                    self.controller.volume(),
                    self.volume_step,
                    action == Action::VolumeUp,
                );
                self.controller.change_volume(v);
                Ok(())
            }
            Action::SeekForward | Action::SeekBack => {
                let delta = self.seek_seconds as i64;
                let delta = if action == Action::SeekBack { -delta } else { delta };
                let target = seek_target(
                    self.controller.current_time(),
                    self.controller.total_time(),
                    delta,
                );
                self.controller.seek(target)
            }
            Action::Quit => {
                self.controller.stop();
                return false;
            }
        };

        match result {
            Ok(()) => self.message = None,
            Err(e) => {
                warn!(?action, error = %e, "action failed");
                self.message = Some(e.to_string());
            }
        }
        self.dirty.store(true, Ordering::SeqCst);
        true
    }
}
