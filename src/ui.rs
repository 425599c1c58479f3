//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::engine::DeviceState;
use crate::player::PlayerStatus;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("enter", "play");
    map.insert("space/p", "pause/resume");
    map.insert("s", "stop");
    map.insert("h/l", "prev/next track");
    // H/L is filled dynamically from config.
    map.insert("z", "shuffle");
    map.insert("r", "restart track");
    map.insert("+/-", "volume");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    let order = ["enter", "space/p", "s", "h/l", "H/L", "z", "r", "+/-", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{seek_seconds}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn device_text(device: DeviceState) -> &'static str {
    match device {
        DeviceState::Playing => "Playing",
        DeviceState::Paused => "Paused",
        DeviceState::Stopped => "Stopped",
    }
}

/// The status line shown under the header.
fn status_text(status: &PlayerStatus, message: Option<&str>) -> String {
    if status.is_empty {
        return match message.or(status.last_error.as_deref()) {
            Some(err) => format!("Nothing loaded • Error: {err}"),
            None => "Nothing loaded".to_string(),
        };
    }

    let mut parts: Vec<String> = Vec::new();
    parts.push(device_text(status.device).to_string());

    if status.is_swipe {
        parts.push(format!(
            "PLAYLIST: {}/{}",
            status.cursor + 1,
            status.playlist_len
        ));
    } else {
        parts.push("SINGLE TRACK".to_string());
    }

    if let Some(track) = &status.track {
        parts.push(format!(
            "Song: {} [{}/{}]",
            track.name,
            format_mmss(status.elapsed),
            format_mmss(status.total)
        ));
    }

    parts.push(format!("Vol: {:.0}%", status.volume * 100.0));

    if let Some(err) = message.or(status.last_error.as_deref()) {
        parts.push(format!("Error: {err}"));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App) {
    let status = app.controller.status();
    let playlist = app.controller.playlist();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(app.source.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" segue · {} ", app.controller.name()))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(&status, app.message.as_deref()))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Track list. A single dropped track is shown on its own.
    {
        let names: Vec<&str> = if status.is_swipe {
            playlist.iter().map(|t| t.name.as_str()).collect()
        } else {
            status.track.iter().map(|t| t.name.as_str()).collect()
        };

        // Center the cursor when possible by creating a visible window.
        let total = names.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = if status.is_swipe { status.cursor } else { 0 };
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = names[start..end]
            .iter()
            .map(|name| ListItem::new(*name))
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer = Paragraph::new(controls_text(app.seek_seconds()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
