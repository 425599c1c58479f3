use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App};
use crate::ui;

/// Redraw interval while nothing else happens, so elapsed time keeps moving.
const TICK: Duration = Duration::from_millis(200);

/// Main terminal event loop. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut redraw = true;
    loop {
        if redraw || app.take_dirty() {
            terminal.draw(|f| ui::draw(f, app))?;
        }

        redraw = true;
        if event::poll(TICK)? {
            // Input alone doesn't warrant a frame; actions mark the app dirty.
            redraw = false;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = Action::from_key(key.code) {
                    if !app.apply(action) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
