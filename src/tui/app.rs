//! TUI application state and main event loop

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;

use super::admin::AdminState;
use super::contact::ContactState;
use super::log_capture::LogBuffer;
use super::ui;
use super::welcome::WelcomeState;
use crate::admin::Dashboard;
use crate::config::Config;
use crate::storage::Storage;
use crate::store::MessageStore;
use crate::welcome;

/// Target frame rate for UI updates (~30 fps)
const FRAME_DURATION_MS: u64 = 33;

/// How long a status-bar notice stays up.
const STATUS_DURATION: Duration = Duration::from_secs(4);

/// Lines moved per PgUp/PgDn in the message detail pane.
const DETAIL_PAGE: usize = 10;

/// Top-level screen
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Contact,
    Admin,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Contact => "contact",
            Screen::Admin => "admin",
        }
    }
}

/// Application state
pub struct App<S> {
    /// Whether the app should exit
    pub should_exit: bool,
    pub screen: Screen,
    /// Producer side: writes through its own store handle.
    pub store: MessageStore<S>,
    pub contact: ContactState,
    /// Consumer side.
    pub dashboard: Dashboard<S>,
    pub admin: AdminState,
    pub welcome: WelcomeState,
    /// Transient status-bar notice and when it was raised
    pub status_message: Option<(String, bool, Instant)>,
    /// Newest captured log line
    pub last_log: Option<String>,
    logs: Option<LogBuffer>,
}

impl<S: Storage + Clone> App<S> {
    pub fn new(storage: S, config: &Config, logs: Option<LogBuffer>, now: Instant) -> Self {
        let first_run = welcome::take_first_run(&storage);
        Self {
            should_exit: false,
            screen: Screen::default(),
            store: MessageStore::new(storage.clone()),
            contact: ContactState::new(config.submit_status_duration()),
            dashboard: Dashboard::open(storage, config.login_error_duration()),
            admin: AdminState::default(),
            welcome: WelcomeState::new(first_run, now),
            status_message: None,
            last_log: None,
            logs,
        }
    }

    fn notify(&mut self, text: String, is_error: bool, now: Instant) {
        self.status_message = Some((text, is_error, now));
    }

    /// Current status-bar notice, if it has not expired.
    pub fn status(&self, now: Instant) -> Option<(&str, bool)> {
        match &self.status_message {
            Some((text, is_error, at)) if now.saturating_duration_since(*at) < STATUS_DURATION => {
                Some((text.as_str(), *is_error))
            }
            _ => None,
        }
    }

    /// Pull new log lines from the capture buffer.
    fn refresh_logs(&mut self) {
        if let Some(logs) = &self.logs {
            if let Some(line) = logs.drain().pop() {
                self.last_log = Some(line);
            }
        }
    }

    /// Handle input events
    pub fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(FRAME_DURATION_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key, Instant::now());
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return;
        }

        if self.welcome.visible {
            self.welcome.dismiss();
            return;
        }

        if ctrl && key.code == KeyCode::Char('t') {
            self.switch_screen();
            return;
        }

        match self.screen {
            Screen::Contact => self.handle_contact_key(key, ctrl, now),
            Screen::Admin if self.dashboard.is_logged_in() => self.handle_inbox_key(key, now),
            Screen::Admin => self.handle_login_key(key, now),
        }
    }

    fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Contact => Screen::Admin,
            Screen::Admin => Screen::Contact,
        };
        if self.screen == Screen::Admin {
            // New submissions may have arrived since the list was read.
            self.dashboard.refresh();
            self.admin.clamp_cursor(&self.dashboard);
        }
    }

    fn handle_contact_key(&mut self, key: KeyEvent, ctrl: bool, now: Instant) {
        match key.code {
            KeyCode::Char('s') if ctrl => {
                let outcome = self.contact.submit(&self.store, now);
                let failed = self.contact.status(now) != Some(crate::contact::SubmitStatus::Success);
                self.notify(outcome, failed, now);
            }
            KeyCode::Char('u') if ctrl => self.contact.focused_input().clear(),
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Tab | KeyCode::Down => self.contact.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.contact.focus_previous(),
            KeyCode::Enter => self.contact.enter(),
            KeyCode::Char(c) if !ctrl => self.contact.focused_input().insert_char(c),
            KeyCode::Backspace => self.contact.focused_input().backspace(),
            KeyCode::Delete => self.contact.focused_input().delete(),
            KeyCode::Left => self.contact.focused_input().move_left(),
            KeyCode::Right => self.contact.focused_input().move_right(),
            KeyCode::Home => self.contact.focused_input().move_home(),
            KeyCode::End => self.contact.focused_input().move_end(),
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.admin.toggle_login_focus()
            }
            KeyCode::Enter => {
                let outcome = self.admin.submit_login(&mut self.dashboard, now);
                let failed = !self.dashboard.is_logged_in();
                self.notify(outcome, failed, now);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.admin.focused_input().insert_char(c)
            }
            KeyCode::Backspace => self.admin.focused_input().backspace(),
            KeyCode::Delete => self.admin.focused_input().delete(),
            KeyCode::Left => self.admin.focused_input().move_left(),
            KeyCode::Right => self.admin.focused_input().move_right(),
            KeyCode::Home => self.admin.focused_input().move_home(),
            KeyCode::End => self.admin.focused_input().move_end(),
            _ => {}
        }
    }

    fn handle_inbox_key(&mut self, key: KeyEvent, now: Instant) {
        if self.admin.confirm_delete_all {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.admin.confirm_delete_all = false;
                    let count = self.dashboard.messages().len();
                    match self.dashboard.delete_all() {
                        Ok(()) => {
                            self.admin.cursor = 0;
                            self.notify(format!("Deleted {} message(s)", count), false, now);
                        }
                        Err(e) => self.notify(format!("Delete failed: {}", e), true, now),
                    }
                }
                _ => self.admin.confirm_delete_all = false,
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_exit = true,
            KeyCode::Esc => {
                if self.dashboard.selected().is_some() {
                    self.dashboard.clear_selection();
                    self.admin.detail_scroll = 0;
                } else {
                    self.should_exit = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.admin.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.admin.move_down(&self.dashboard),
            KeyCode::Enter => self.admin.select_current(&mut self.dashboard),
            KeyCode::PageDown => self.admin.scroll_detail_down(DETAIL_PAGE),
            KeyCode::PageUp => self.admin.scroll_detail_up(DETAIL_PAGE),
            KeyCode::Char('d') => match self.admin.delete_current(&mut self.dashboard) {
                Ok(Some(name)) => self.notify(format!("Deleted message from {}", name), false, now),
                Ok(None) => {}
                Err(e) => self.notify(format!("Delete failed: {}", e), true, now),
            },
            KeyCode::Char('D') => {
                if !self.dashboard.messages().is_empty() {
                    self.admin.confirm_delete_all = true;
                }
            }
            KeyCode::Char('r') => {
                self.dashboard.refresh();
                self.admin.clamp_cursor(&self.dashboard);
                let count = self.dashboard.messages().len();
                self.notify(format!("{} message(s)", count), false, now);
            }
            KeyCode::Char('L') => {
                self.dashboard.logout();
                self.admin = AdminState::default();
                self.notify("Logged out".to_string(), false, now);
            }
            _ => {}
        }
    }

    /// Render the UI
    pub fn render(&self, frame: &mut ratatui::Frame) {
        ui::render(frame, self, Instant::now());
    }
}

/// Run the TUI application with panic-safe terminal restore
pub fn run<S: Storage + Clone>(storage: S, config: &Config, logs: Option<LogBuffer>) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = catch_unwind(AssertUnwindSafe(|| {
        run_app(&mut terminal, storage, config, logs)
    }));
    ratatui::restore();

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}

fn run_app<S: Storage + Clone>(
    terminal: &mut DefaultTerminal,
    storage: S,
    config: &Config,
    logs: Option<LogBuffer>,
) -> Result<()> {
    let mut app = App::new(storage, config, logs, Instant::now());

    while !app.should_exit {
        app.refresh_logs();
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::Session;
    use crate::storage::{MemoryStorage, WELCOME_SHOWN_KEY};
    use crate::tui::admin::LoginFocus;

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn ctrl(app: &mut App<MemoryStorage>, c: char) {
        app.handle_key(
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
            Instant::now(),
        );
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn new_app(storage: MemoryStorage) -> App<MemoryStorage> {
        let mut app = App::new(storage, &Config::default(), None, Instant::now());
        app.welcome.dismiss();
        app
    }

    #[test]
    fn test_welcome_shown_on_first_run_only() {
        let storage = MemoryStorage::new();
        let first = App::new(storage.clone(), &Config::default(), None, Instant::now());
        assert!(first.welcome.visible);
        assert_eq!(storage.get(WELCOME_SHOWN_KEY).unwrap().as_deref(), Some("true"));

        let second = App::new(storage, &Config::default(), None, Instant::now());
        assert!(!second.welcome.visible);
    }

    #[test]
    fn test_any_key_dismisses_welcome() {
        let mut app = App::new(MemoryStorage::new(), &Config::default(), None, Instant::now());
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.welcome.visible);
        assert!(app.contact.focused_input().text.is_empty());
    }

    #[test]
    fn test_submit_then_review_in_admin() {
        let storage = MemoryStorage::new();
        let mut app = new_app(storage);

        for text in ["Jane", "jane@x.com", "Hi"] {
            type_text(&mut app, text);
            press(&mut app, KeyCode::Tab);
        }
        type_text(&mut app, "Hello there");
        ctrl(&mut app, 's');
        let (status, is_error) = app.status(Instant::now()).unwrap();
        assert_eq!(status, "Message from Jane saved");
        assert!(!is_error);

        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Admin);
        assert_eq!(app.dashboard.session(), Session::LoggedOut);

        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);
        assert!(app.dashboard.is_logged_in());
        assert_eq!(app.dashboard.messages().len(), 1);
        assert_eq!(app.dashboard.messages()[0].name, "Jane");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dashboard.selected().map(|m| m.subject.as_str()), Some("Hi"));

        press(&mut app, KeyCode::Char('d'));
        assert!(app.dashboard.messages().is_empty());
        assert!(app.store.list().is_empty());
    }

    #[test]
    fn test_tab_moves_focus_and_ctrl_t_switches_screen() {
        let mut app = new_app(MemoryStorage::new());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Contact);
        assert_eq!(app.contact.focused_field(), crate::contact::Field::Email);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.contact.focused_field(), crate::contact::Field::Name);

        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Admin);

        // On the login form Tab only toggles the input.
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Admin);
        assert_eq!(app.admin.login_focus, LoginFocus::Password);

        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Contact);
    }

    #[test]
    fn test_page_keys_scroll_detail_pane() {
        let storage = MemoryStorage::new();
        let store = MessageStore::new(storage.clone());
        let body = (1..=60)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        store
            .append(crate::models::Message::new(
                "Jane".to_string(),
                "jane@x.com".to_string(),
                "Long".to_string(),
                body,
            ))
            .unwrap();

        let mut app = new_app(storage);
        app.dashboard.login("admin", "admin123", Instant::now()).unwrap();
        app.screen = Screen::Admin;
        press(&mut app, KeyCode::Enter);

        let mut terminal = ratatui::Terminal::new(ratatui::backend::TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        press(&mut app, KeyCode::PageDown);
        assert!(app.admin.detail_scroll > 0);

        // Scrolling stops at the last line of the body.
        for _ in 0..20 {
            press(&mut app, KeyCode::PageDown);
        }
        let bottom = app.admin.detail_scroll;
        terminal.draw(|frame| app.render(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("line 60"));

        press(&mut app, KeyCode::PageUp);
        assert!(app.admin.detail_scroll < bottom);

        // Closing the message resets the scroll.
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.admin.detail_scroll, 0);
    }

    #[test]
    fn test_delete_all_needs_confirmation() {
        let storage = MemoryStorage::new();
        let mut app = new_app(storage.clone());
        for _ in 0..2 {
            app.contact.focused_input().insert_char('x');
            app.contact.focus_next();
            for c in "a@b".chars() {
                app.contact.focused_input().insert_char(c);
            }
            app.contact.focus_next();
            app.contact.focused_input().insert_char('s');
            app.contact.focus_next();
            app.contact.focused_input().insert_char('m');
            app.contact.focus_next();
            ctrl(&mut app, 's');
        }
        assert_eq!(app.store.list().len(), 2);

        app.dashboard.login("admin", "admin123", Instant::now()).unwrap();
        app.screen = Screen::Admin;

        press(&mut app, KeyCode::Char('D'));
        assert!(app.admin.confirm_delete_all);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.admin.confirm_delete_all);
        assert_eq!(app.dashboard.messages().len(), 2);

        press(&mut app, KeyCode::Char('D'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.dashboard.messages().is_empty());
        assert!(app.store.list().is_empty());
    }

    #[test]
    fn test_logout_from_inbox() {
        let storage = MemoryStorage::new();
        let mut app = new_app(storage.clone());
        app.dashboard.login("admin", "admin123", Instant::now()).unwrap();
        app.screen = Screen::Admin;

        press(&mut app, KeyCode::Char('L'));
        assert!(!app.dashboard.is_logged_in());
        assert_eq!(storage.get(crate::storage::ADMIN_AUTH_KEY).unwrap(), None);
    }

    #[test]
    fn test_bad_login_reports_error() {
        let mut app = new_app(MemoryStorage::new());
        app.screen = Screen::Admin;
        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "guess");
        press(&mut app, KeyCode::Enter);

        let now = Instant::now();
        assert!(!app.dashboard.is_logged_in());
        assert!(app.dashboard.login_error(now).is_some());
        assert_eq!(app.status(now), Some(("invalid username or password", true)));
    }

    #[test]
    fn test_status_expires() {
        let mut app = new_app(MemoryStorage::new());
        let now = Instant::now();
        app.notify("hello".to_string(), false, now);
        assert!(app.status(now).is_some());
        assert!(app.status(now + STATUS_DURATION).is_none());
    }
}
