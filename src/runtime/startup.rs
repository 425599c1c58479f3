use std::path::Path;

use crate::config;
use crate::error::Result;
use crate::library::{Playlist, load_track};
use crate::player::Controller;

/// Load the path given on the command line: a directory becomes a
/// playlist starting at its first track, anything else a single track.
pub fn load_source(controller: &Controller, source: &str, settings: &config::Settings) -> Result<()> {
    let path = Path::new(source);
    if path.is_dir() {
        let playlist = Playlist::from_dir(path, &settings.library);
        controller.drop_playlist(&playlist, 0)
    } else {
        controller.drop_track(load_track(path))
    }
}
