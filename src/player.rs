//! Playlist controller: what is loaded, what is current, and what happens
//! when a track ends.

mod controller;
mod navigation;
mod state;

pub use controller::{Controller, MAX_VOLUME, MIN_VOLUME};
pub use navigation::Direction;
pub use state::PlayerStatus;
