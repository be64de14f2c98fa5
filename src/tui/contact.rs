//! Contact screen: the visitor-facing form.

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::input::TextInput;
use crate::contact::{ContactForm, Field, SubmitError, SubmitStatus};
use crate::storage::Storage;
use crate::store::MessageStore;

/// Height of a single-line field box: border + text + border.
const FIELD_HEIGHT: u16 = 3;

/// State for the contact screen.
pub struct ContactState {
    form: ContactForm,
    inputs: [TextInput; 4],
    /// Index into `Field::ALL` of the focused field.
    focus: usize,
    /// Validation problem from the last submit attempt.
    validation: Option<String>,
}

impl ContactState {
    pub fn new(status_duration: Duration) -> Self {
        Self {
            form: ContactForm::new(status_duration),
            inputs: Default::default(),
            focus: 0,
            validation: None,
        }
    }

    pub fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        &mut self.inputs[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Enter: newline in the message body, next field elsewhere.
    pub fn enter(&mut self) {
        if self.focused_field() == Field::Message {
            self.focused_input().insert_char('\n');
        } else {
            self.focus_next();
        }
    }

    /// Copy the inputs into the form and submit it.
    ///
    /// Returns a one-line outcome for the status bar.
    pub fn submit<S: Storage>(&mut self, store: &MessageStore<S>, now: Instant) -> String {
        for (field, input) in Field::ALL.iter().zip(&self.inputs) {
            *self.form.field_mut(*field) = input.text.clone();
        }

        match self.form.submit(store, now) {
            Ok(message) => {
                self.validation = None;
                for input in &mut self.inputs {
                    input.clear();
                }
                self.focus = 0;
                format!("Message from {} saved", message.name)
            }
            Err(SubmitError::Store(e)) => {
                self.validation = None;
                format!("Could not save message: {}", e)
            }
            Err(e) => {
                let first_bad = match &e {
                    SubmitError::MissingFields(fields) => fields.first().copied(),
                    _ => Some(Field::Email),
                };
                if let Some(pos) = first_bad.and_then(|f| Field::ALL.iter().position(|x| *x == f)) {
                    self.focus = pos;
                }
                let text = capitalize(&e.to_string());
                self.validation = Some(text.clone());
                text
            }
        }
    }

    pub fn status(&self, now: Instant) -> Option<SubmitStatus> {
        self.form.status(now)
    }

    #[cfg(test)]
    pub fn input_text(&self, field: Field) -> &str {
        let idx = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
        &self.inputs[idx].text
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the contact form into `area`.
pub fn render(frame: &mut Frame, area: Rect, state: &ContactState, now: Instant) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Get In Touch ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < FIELD_HEIGHT * 3 + 3 || inner.width < 20 {
        frame.render_widget(
            Paragraph::new("Terminal too small for the contact form"),
            inner,
        );
        return;
    }

    let [banner_area, name_area, email_area, subject_area, message_area, hint_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

    render_banner(frame, banner_area, state, now);

    let areas = [name_area, email_area, subject_area, message_area];
    for (idx, (field, field_area)) in Field::ALL.iter().zip(areas).enumerate() {
        render_field(frame, field_area, *field, &state.inputs[idx], idx == state.focus);
    }

    let hint = Line::from(Span::styled(
        " Tab/Shift+Tab: next/prev field   Enter: next (newline in message)   Ctrl+S: send",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), hint_area);
}

/// Success/error banner, or the validation problem, or a prompt.
fn render_banner(frame: &mut Frame, area: Rect, state: &ContactState, now: Instant) {
    let line = match (state.status(now), &state.validation) {
        (Some(SubmitStatus::Success), _) => Line::from(Span::styled(
            " Your message has been sent successfully! I'll get back to you soon.",
            Style::default().fg(Color::Green),
        )),
        (Some(SubmitStatus::Error), _) => Line::from(Span::styled(
            " Oops! Something went wrong. Please try again later.",
            Style::default().fg(Color::Red),
        )),
        (None, Some(problem)) => Line::from(Span::styled(
            format!(" {}", problem),
            Style::default().fg(Color::Yellow),
        )),
        (None, None) => Line::from(Span::styled(
            " Have a question or want to work together? Send a message.",
            Style::default().fg(Color::Gray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_field(frame: &mut Frame, area: Rect, field: Field, input: &TextInput, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(format!(" {} ", field.label()));
    let inner = block.inner(area);

    let multiline = field == Field::Message;
    let paragraph = if multiline {
        let lines: Vec<Line> = input.text.split('\n').map(|l| Line::from(l.to_string())).collect();
        // Keep the cursor line in view.
        let scroll = input
            .cursor_line()
            .saturating_sub(inner.height.saturating_sub(1) as usize);
        Paragraph::new(lines).scroll((scroll as u16, 0))
    } else {
        let text = input.display(false);
        let scroll = input
            .cursor_column(false)
            .saturating_sub(inner.width.saturating_sub(1) as usize);
        Paragraph::new(text).scroll((0, scroll as u16))
    };

    frame.render_widget(paragraph.block(block), area);

    if focused && inner.width > 0 && inner.height > 0 {
        let col = input.cursor_column(false).min(inner.width.saturating_sub(1) as usize);
        let row = if multiline {
            input.cursor_line().min(inner.height.saturating_sub(1) as usize)
        } else {
            0
        };
        frame.set_cursor_position(Position::new(inner.x + col as u16, inner.y + row as u16));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn type_into(state: &mut ContactState, text: &str) {
        for c in text.chars() {
            state.focused_input().insert_char(c);
        }
    }

    #[test]
    fn test_focus_cycles() {
        let mut state = ContactState::new(Duration::from_secs(5));
        assert_eq!(state.focused_field(), Field::Name);
        state.focus_previous();
        assert_eq!(state.focused_field(), Field::Message);
        state.focus_next();
        assert_eq!(state.focused_field(), Field::Name);
    }

    #[test]
    fn test_enter_adds_newline_only_in_message() {
        let mut state = ContactState::new(Duration::from_secs(5));
        state.enter();
        assert_eq!(state.focused_field(), Field::Email);

        state.focus_previous();
        state.focus_previous();
        assert_eq!(state.focused_field(), Field::Message);
        type_into(&mut state, "a");
        state.enter();
        type_into(&mut state, "b");
        assert_eq!(state.input_text(Field::Message), "a\nb");
    }

    #[test]
    fn test_submit_from_screen() {
        let store = MessageStore::new(MemoryStorage::new());
        let mut state = ContactState::new(Duration::from_secs(5));

        for text in ["Jane", "jane@x.com", "Hi", "Hello there"] {
            type_into(&mut state, text);
            state.focus_next();
        }

        let now = Instant::now();
        let outcome = state.submit(&store, now);
        assert_eq!(outcome, "Message from Jane saved");
        assert_eq!(state.status(now), Some(SubmitStatus::Success));
        assert!(state.input_text(Field::Name).is_empty());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_submit_missing_focuses_first_gap() {
        let store = MessageStore::new(MemoryStorage::new());
        let mut state = ContactState::new(Duration::from_secs(5));
        type_into(&mut state, "Jane");

        let outcome = state.submit(&store, Instant::now());
        assert_eq!(outcome, "Missing required fields: Email, Subject, Message");
        assert_eq!(state.focused_field(), Field::Email);
        assert_eq!(state.input_text(Field::Name), "Jane");
        assert!(store.list().is_empty());
    }
}
