//! Track and playlist values plus a small directory scanner.
//!
//! The player core only reads these; building them from disk lives in
//! `library::scan`.

mod model;
mod scan;

pub use model::{Playlist, Track};
pub use scan::{load_track, scan};

#[cfg(test)]
mod tests;
