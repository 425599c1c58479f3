//! Application module: key bindings and the view model the TUI drives.

mod model;

pub use model::*;
