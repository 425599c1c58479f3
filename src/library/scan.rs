use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub(super) fn make_name(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim) {
        Some(a) if !a.is_empty() => format!("{} - {}", a, title.trim()),
        _ => title.trim().to_string(),
    }
}

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Read a single track's name and duration from its tags.
///
/// Files without readable tags still produce a track named after the file
/// stem with a zero duration; the engine reports the real length once the
/// file is opened.
pub fn load_track(path: &Path) -> Track {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut title = stem;
    let mut artist: Option<String> = None;
    let mut duration = Duration::ZERO;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = tagged.properties().duration();
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    if !v.trim().is_empty() {
                        title = v.to_string();
                    }
                }
                artist = tag.artist().map(|v| v.to_string());
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    Track::new(make_name(&title, artist.as_deref()), duration, path)
}

pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .map(|e| load_track(e.path()))
        .collect();

    tracks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    debug!(dir = %dir.display(), count = tracks.len(), "library scanned");
    tracks
}
