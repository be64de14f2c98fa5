//! UI rendering for the TUI

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::admin;
use super::app::{App, Screen};
use super::contact;
use super::welcome;
use crate::storage::Storage;

/// Main render function
pub fn render<S: Storage + Clone>(frame: &mut Frame, app: &App<S>, now: Instant) {
    let area = frame.area();

    // Layout: header (1 line) + screen + status bar (1 line)
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(header_area, frame.buffer_mut(), app);

    match app.screen {
        Screen::Contact => contact::render(frame, main_area, &app.contact, now),
        Screen::Admin => admin::render(frame, main_area, &app.admin, &app.dashboard, now),
    }

    render_status(status_area, frame.buffer_mut(), app, now);

    if app.welcome.visible {
        welcome::render(frame, &app.welcome, now);
    }
}

/// Header: title on the left, screen tabs and session state on the right.
fn render_header<S: Storage + Clone>(area: Rect, buf: &mut Buffer, app: &App<S>) {
    let title = " Portfolio Inbox";

    let tab = |screen: Screen, label: &'static str| {
        if app.screen == screen {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };

    let session = if app.dashboard.is_logged_in() {
        Span::styled(" * admin ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" o guest ", Style::default().fg(Color::DarkGray))
    };

    let right_width = " Contact ".width() + " Admin ".width() + session.content.width();
    let padding = (area.width as usize).saturating_sub(title.width() + right_width);

    let line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        tab(Screen::Contact, " Contact "),
        tab(Screen::Admin, " Admin "),
        session,
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

/// Status bar: a pending notice, otherwise key hints and the newest log line.
fn render_status<S: Storage + Clone>(area: Rect, buf: &mut Buffer, app: &App<S>, now: Instant) {
    if let Some((msg, is_error)) = app.status(now) {
        let style = if is_error {
            Style::default().fg(Color::Red).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).bg(Color::DarkGray)
        };
        Paragraph::new(Line::from(Span::styled(format!(" {} ", msg), style)))
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
        return;
    }

    let sep_style = Style::default().fg(Color::Gray);
    let hints = match app.screen {
        Screen::Contact => "Ctrl+S: send",
        Screen::Admin if app.dashboard.is_logged_in() => {
            "Enter: open  PgUp/PgDn: scroll  d: delete  D: delete all  r: refresh  L: logout"
        }
        Screen::Admin => "Enter: log in",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.screen.as_str()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled("| ", sep_style),
        Span::styled(hints, Style::default().fg(Color::Cyan)),
        Span::styled(" | ", sep_style),
        Span::styled("Ctrl+T: switch  Ctrl+C: quit", Style::default().fg(Color::Gray)),
    ];

    if let Some(log) = &app.last_log {
        spans.push(Span::styled(" | ", sep_style));
        spans.push(Span::styled(log.trim().to_string(), log_style(log)));
    }

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

/// Color a captured log line by its level.
fn log_style(line: &str) -> Style {
    let color = if line.contains("ERROR") {
        Color::Red
    } else if line.contains("WARN") {
        Color::Yellow
    } else {
        Color::Black
    };
    Style::default().fg(color)
}
