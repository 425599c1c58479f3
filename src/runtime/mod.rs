use std::env;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::engine::RodioEngine;
use crate::logging;
use crate::player::Controller;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = settings::load_settings();
    let settings = loaded.settings;

    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("segue: failed to open log file: {e}");
    }
    info!(path = ?loaded.path, "configuration resolved");
    if let Some(msg) = loaded.warning {
        warn!("{msg}");
    }

    let source = env::args().nth(1).unwrap_or_else(|| {
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });
    info!(%source, "starting");

    let engine = RodioEngine::open_default(Duration::from_millis(settings.audio.end_poll_ms))?;
    let controller = Controller::new(Arc::new(engine), settings.audio.default_volume);
    let mut app = App::new(controller, source.clone(), &settings);

    if let Err(e) = startup::load_source(&app.controller, &source, &settings) {
        warn!(%source, error = %e, "failed to load startup source");
        app.message = Some(e.to_string());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut app);

    app.controller.stop();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("shutting down");
    run_result
}
