//! Admin screen: login form, then message list and detail panes.

use std::cell::Cell;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::input::TextInput;
use crate::admin::{Dashboard, DashboardError};
use crate::models::{format_date, Message};
use crate::storage::Storage;

/// Login form box size.
const LOGIN_WIDTH: u16 = 50;
const LOGIN_HEIGHT: u16 = 12;

/// Which login input has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    #[default]
    Username,
    Password,
}

/// UI state for the admin screen. The session and messages themselves live
/// in the [`Dashboard`].
#[derive(Default)]
pub struct AdminState {
    pub username: TextInput,
    pub password: TextInput,
    pub login_focus: LoginFocus,
    /// Highlighted row in the message list.
    pub cursor: usize,
    /// Waiting for y/n after asking to delete everything.
    pub confirm_delete_all: bool,
    /// First visible line of the detail pane.
    pub detail_scroll: usize,
    /// Largest useful `detail_scroll` for the last rendered pane size.
    detail_max_scroll: Cell<usize>,
}

impl AdminState {
    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.login_focus {
            LoginFocus::Username => &mut self.username,
            LoginFocus::Password => &mut self.password,
        }
    }

    pub fn toggle_login_focus(&mut self) {
        self.login_focus = match self.login_focus {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Username,
        };
    }

    /// Try the entered credentials. Returns a status-bar line.
    pub fn submit_login<S: Storage>(&mut self, dashboard: &mut Dashboard<S>, now: Instant) -> String {
        match dashboard.login(&self.username.text, &self.password.text, now) {
            Ok(()) => {
                self.username.clear();
                self.password.clear();
                self.login_focus = LoginFocus::Username;
                self.cursor = 0;
                format!("Logged in: {} message(s)", dashboard.messages().len())
            }
            Err(e) => {
                self.password.clear();
                self.login_focus = LoginFocus::Password;
                e.to_string()
            }
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down<S: Storage>(&mut self, dashboard: &Dashboard<S>) {
        if self.cursor + 1 < dashboard.messages().len() {
            self.cursor += 1;
        }
    }

    /// Keep the cursor on an existing row after the list changes.
    pub fn clamp_cursor<S: Storage>(&mut self, dashboard: &Dashboard<S>) {
        self.cursor = self.cursor.min(dashboard.messages().len().saturating_sub(1));
    }

    /// Select the message under the cursor.
    pub fn select_current<S: Storage>(&mut self, dashboard: &mut Dashboard<S>) {
        if let Some(id) = dashboard.messages().get(self.cursor).map(|m| m.id.clone()) {
            dashboard.select(&id);
            self.detail_scroll = 0;
        }
    }

    /// Scroll the detail pane toward the end of the message.
    ///
    /// Clamped to the extent seen at the last render.
    pub fn scroll_detail_down(&mut self, n: usize) {
        self.detail_scroll = self
            .detail_scroll
            .saturating_add(n)
            .min(self.detail_max_scroll.get());
    }

    pub fn scroll_detail_up(&mut self, n: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(n);
    }

    /// Delete the selected message, or the one under the cursor when
    /// nothing is selected.
    pub fn delete_current<S: Storage>(
        &mut self,
        dashboard: &mut Dashboard<S>,
    ) -> Result<Option<String>, DashboardError> {
        if dashboard.selected().is_none() {
            self.select_current(dashboard);
        }
        let name = dashboard.selected().map(|m| m.name.clone());
        dashboard.delete_selected()?;
        self.clamp_cursor(dashboard);
        self.detail_scroll = 0;
        Ok(name)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render<S: Storage>(
    frame: &mut Frame,
    area: Rect,
    state: &AdminState,
    dashboard: &Dashboard<S>,
    now: Instant,
) {
    if !dashboard.is_logged_in() {
        render_login(frame, area, state, dashboard.login_error(now));
        return;
    }

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Fill(1)]).areas(area);

    render_list(list_area, frame.buffer_mut(), state, dashboard);
    render_detail(detail_area, frame.buffer_mut(), state, dashboard.selected());

    if state.confirm_delete_all {
        render_confirm(frame, area, dashboard.messages().len());
    }
}

fn render_login(frame: &mut Frame, area: Rect, state: &AdminState, error: Option<&str>) {
    let popup = centered_rect(LOGIN_WIDTH, LOGIN_HEIGHT, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Admin Login ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    if inner.height < 9 || inner.width < 10 {
        return;
    }

    let [intro, err_line, user_area, pass_area, hint] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            " Enter your credentials to access the inbox",
            Style::default().fg(Color::Gray),
        )),
        intro,
    );

    if let Some(text) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", text),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            err_line,
        );
    }

    let fields = [
        ("Username", &state.username, LoginFocus::Username, false, user_area),
        ("Password", &state.password, LoginFocus::Password, true, pass_area),
    ];
    for (label, input, focus, masked, field_area) in fields {
        let focused = state.login_focus == focus;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            })
            .title(format!(" {} ", label));
        let field_inner = block.inner(field_area);
        frame.render_widget(Paragraph::new(input.display(masked)).block(block), field_area);

        if focused && field_inner.width > 0 {
            let col = input
                .cursor_column(masked)
                .min(field_inner.width.saturating_sub(1) as usize);
            frame.set_cursor_position(Position::new(field_inner.x + col as u16, field_inner.y));
        }
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            " Tab: switch field   Enter: log in",
            Style::default().fg(Color::DarkGray),
        )),
        hint,
    );
}

fn render_list<S: Storage>(area: Rect, buf: &mut Buffer, state: &AdminState, dashboard: &Dashboard<S>) {
    let messages = dashboard.messages();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            format!(" Messages ({}) ", messages.len()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if messages.is_empty() {
        Paragraph::new(Span::styled(
            " No messages yet",
            Style::default().fg(Color::DarkGray),
        ))
        .render(inner, buf);
        return;
    }

    // Each entry takes two rows: name/date, then subject.
    let rows_per_item = 2;
    let visible_items = (inner.height as usize / rows_per_item).max(1);
    let offset = compute_scroll_offset(state.cursor, visible_items, messages.len());
    let selected_id = dashboard.selected().map(|m| m.id.as_str());
    let width = inner.width as usize;

    for (row, idx) in (offset..messages.len()).take(visible_items).enumerate() {
        let msg = &messages[idx];
        let y = inner.y + (row * rows_per_item) as u16;
        let is_cursor = idx == state.cursor;
        let is_selected = selected_id == Some(msg.id.as_str());

        let base = if is_cursor {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let name_style = if is_selected {
            base.fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            base.fg(Color::White).add_modifier(Modifier::BOLD)
        };

        let date = format_date(&msg.date);
        let marker = if is_selected { ">" } else { " " };
        let name = truncate(&msg.name, width.saturating_sub(date.width() + 3));
        let pad = width.saturating_sub(name.width() + date.width() + 2);
        let top = Line::from(vec![
            Span::styled(marker.to_string(), base.fg(Color::Cyan)),
            Span::styled(name, name_style),
            Span::styled(" ".repeat(pad), base),
            Span::styled(format!("{} ", date), base.fg(Color::DarkGray)),
        ]);
        Paragraph::new(top).render(Rect::new(inner.x, y, inner.width, 1), buf);

        if y + 1 < inner.y + inner.height {
            let subject = truncate(&msg.subject, width.saturating_sub(2));
            let pad = width.saturating_sub(subject.width() + 1);
            let bottom = Line::from(vec![
                Span::styled(format!(" {}", subject), base.fg(Color::Gray)),
                Span::styled(" ".repeat(pad), base),
            ]);
            Paragraph::new(bottom).render(Rect::new(inner.x, y + 1, inner.width, 1), buf);
        }
    }
}

fn render_detail(area: Rect, buf: &mut Buffer, state: &AdminState, selected: Option<&Message>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Message ");
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let Some(msg) = selected else {
        state.detail_max_scroll.set(0);
        Paragraph::new(Span::styled(
            " Select a message to view its content (Enter)",
            Style::default().fg(Color::DarkGray),
        ))
        .render(inner, buf);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            msg.subject.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("From: ", label),
            Span::styled(msg.name.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Email: ", label),
            Span::styled(msg.email.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Date: ", label),
            Span::raw(format_date(&msg.date)),
        ]),
        Line::from(Span::styled(
            "\u{2500}".repeat(inner.width as usize),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    lines.extend(
        wrap_text(&msg.message, inner.width as usize)
            .into_iter()
            .map(Line::from),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "PgUp/PgDn: scroll   d: delete   Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let total_lines = lines.len();
    let visible_height = inner.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    state.detail_max_scroll.set(max_scroll);
    let scroll = state.detail_scroll.min(max_scroll);

    for (row, line) in lines.into_iter().skip(scroll).take(visible_height).enumerate() {
        let line_area = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
        Paragraph::new(line).render(line_area, buf);
    }

    if total_lines > visible_height {
        let indicator_x = inner.x + inner.width.saturating_sub(1);
        if scroll > 0 {
            let cell = &mut buf[(indicator_x, inner.y)];
            cell.set_char('^');
            cell.set_style(Style::default().fg(Color::DarkGray));
        }
        if scroll < max_scroll {
            let cell = &mut buf[(indicator_x, inner.y + inner.height.saturating_sub(1))];
            cell.set_char('v');
            cell.set_style(Style::default().fg(Color::DarkGray));
        }
    }
}

fn render_confirm(frame: &mut Frame, area: Rect, count: usize) {
    let popup = centered_rect(56, 5, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete all ");
    let text = vec![
        Line::from(format!(
            " Delete all {} message(s)? This cannot be undone.",
            count
        )),
        Line::from(""),
        Line::from(Span::styled(
            " y: delete everything   n/Esc: cancel",
            Style::default().fg(Color::Yellow),
        )),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

/// Keep the cursor row inside the visible window.
fn compute_scroll_offset(selected: usize, height: usize, total: usize) -> usize {
    if total <= height || selected < height {
        return 0;
    }
    let max_offset = total.saturating_sub(height);
    selected.saturating_sub(height - 1).min(max_offset)
}

/// Cut `s` to at most `max` columns, marking the cut with `~`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for c in s.chars() {
        let next = format!("{}{}", out, c);
        if next.width() + 1 > max {
            break;
        }
        out = next;
    }
    if max > 0 {
        out.push('~');
    }
    out
}

/// Split on newlines, then word-wrap lines wider than `max_width`.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![];
    }
    let mut result = Vec::new();
    for line in text.lines() {
        if line.width() <= max_width {
            result.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.width() + 1 + word.width() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
    }
    result
}

/// Return a centered sub-rect of the given size within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::Dashboard;
    use crate::storage::MemoryStorage;
    use crate::store::MessageStore;
    use std::time::Duration;

    fn dashboard_with(ids_dates: &[(&str, &str)]) -> Dashboard<MemoryStorage> {
        let storage = MemoryStorage::new();
        let store = MessageStore::new(storage.clone());
        for (id, date) in ids_dates {
            store
                .append(Message {
                    id: id.to_string(),
                    name: format!("Sender {}", id),
                    email: "e@x.com".to_string(),
                    subject: "S".to_string(),
                    message: "M".to_string(),
                    date: date.to_string(),
                })
                .unwrap();
        }
        let mut dashboard = Dashboard::open(storage, Duration::from_secs(3));
        dashboard.login("admin", "admin123", Instant::now()).unwrap();
        dashboard
    }

    #[test]
    fn test_login_from_form() {
        let mut dashboard = Dashboard::open(MemoryStorage::new(), Duration::from_secs(3));
        let mut state = AdminState::default();
        for c in "admin".chars() {
            state.focused_input().insert_char(c);
        }
        state.toggle_login_focus();
        for c in "nope".chars() {
            state.focused_input().insert_char(c);
        }

        let now = Instant::now();
        assert_eq!(state.submit_login(&mut dashboard, now), "invalid username or password");
        assert!(!dashboard.is_logged_in());
        assert!(state.password.text.is_empty());
        assert_eq!(state.username.text, "admin");

        for c in "admin123".chars() {
            state.focused_input().insert_char(c);
        }
        assert_eq!(state.submit_login(&mut dashboard, now), "Logged in: 0 message(s)");
        assert!(dashboard.is_logged_in());
        assert!(state.username.text.is_empty());
    }

    #[test]
    fn test_cursor_movement_and_select() {
        let mut dashboard = dashboard_with(&[("a", "2024-01-01"), ("b", "2024-02-01")]);
        let mut state = AdminState::default();

        state.move_up();
        assert_eq!(state.cursor, 0);
        state.move_down(&dashboard);
        state.move_down(&dashboard);
        assert_eq!(state.cursor, 1);

        state.select_current(&mut dashboard);
        assert_eq!(dashboard.selected().map(|m| m.id.as_str()), Some("a"));
    }

    #[test]
    fn test_detail_scroll_is_clamped() {
        let mut state = AdminState::default();
        state.scroll_detail_down(10);
        assert_eq!(state.detail_scroll, 0);

        state.detail_max_scroll.set(15);
        state.scroll_detail_down(10);
        assert_eq!(state.detail_scroll, 10);
        state.scroll_detail_down(10);
        assert_eq!(state.detail_scroll, 15);
        state.scroll_detail_up(100);
        assert_eq!(state.detail_scroll, 0);
    }

    #[test]
    fn test_delete_current_without_selection() {
        let mut dashboard = dashboard_with(&[("a", "2024-01-01"), ("b", "2024-02-01")]);
        let mut state = AdminState {
            cursor: 1,
            ..Default::default()
        };

        let deleted = state.delete_current(&mut dashboard).unwrap();
        assert_eq!(deleted.as_deref(), Some("Sender a"));
        assert_eq!(dashboard.messages().len(), 1);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(compute_scroll_offset(0, 5, 3), 0);
        assert_eq!(compute_scroll_offset(4, 5, 10), 0);
        assert_eq!(compute_scroll_offset(5, 5, 10), 1);
        assert_eq!(compute_scroll_offset(9, 5, 10), 5);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long subject", 6), "a lon~");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("one two three\nfour", 8),
            vec!["one two", "three", "four"]
        );
        assert!(wrap_text("anything", 0).is_empty());
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(40, 40, area), area);
    }
}
