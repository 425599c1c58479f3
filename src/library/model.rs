use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::LibrarySettings;

use super::scan::scan;

/// An immutable playable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub duration: Duration,
    pub path: PathBuf,
}

impl Track {
    pub fn new(name: impl Into<String>, duration: Duration, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            duration,
            path: path.into(),
        }
    }
}

/// An ordered list of tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
        }
    }

    /// Build a playlist from every audio file found under `dir`.
    pub fn from_dir(dir: &Path, settings: &LibrarySettings) -> Self {
        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("playlist")
            .to_string();
        Self::new(name, scan(dir, settings))
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
