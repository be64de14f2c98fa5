//! First-run welcome popup with a typewriter greeting.

use std::time::{Duration, Instant};

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::admin::centered_rect;
use crate::welcome::WELCOME_TEXT;

const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 9;

/// Delay between typed characters.
const TYPE_INTERVAL: Duration = Duration::from_millis(80);

/// Popup state: visible from first launch until any key is pressed.
pub struct WelcomeState {
    pub visible: bool,
    opened_at: Instant,
}

impl WelcomeState {
    pub fn new(visible: bool, now: Instant) -> Self {
        Self {
            visible,
            opened_at: now,
        }
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// The part of the greeting typed out so far.
    pub fn typed(&self, now: Instant) -> &'static str {
        let elapsed = now.saturating_duration_since(self.opened_at);
        let chars = (elapsed.as_millis() / TYPE_INTERVAL.as_millis()) as usize;
        match WELCOME_TEXT.char_indices().nth(chars) {
            Some((byte_idx, _)) => &WELCOME_TEXT[..byte_idx],
            None => WELCOME_TEXT,
        }
    }
}

pub fn render(frame: &mut Frame, state: &WelcomeState, now: Instant) {
    let area = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, frame.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let typed = state.typed(now);
    let cursor = if typed.len() < WELCOME_TEXT.len() { "_" } else { "" };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "/\\",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                typed,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to explore",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}
