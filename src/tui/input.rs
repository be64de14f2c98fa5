//! Editable text field used by the contact and login forms.

use unicode_width::UnicodeWidthStr;

/// A text buffer with a character-based cursor.
#[derive(Default, Clone)]
pub struct TextInput {
    /// Current text.
    pub text: String,
    /// Cursor position (character offset into `text`).
    pub cursor: usize,
}

impl TextInput {
    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = self.char_to_byte(self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let end = self.char_to_byte(self.cursor);
        let start = self.char_to_byte(self.cursor - 1);
        self.text.drain(start..end);
        self.cursor -= 1;
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let start = self.char_to_byte(self.cursor);
            let end = self.char_to_byte(self.cursor + 1);
            self.text.drain(start..end);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text as it should be drawn, with `*` in place of every character
    /// when `masked`.
    pub fn display(&self, masked: bool) -> String {
        if masked {
            "*".repeat(self.char_count())
        } else {
            self.text.clone()
        }
    }

    /// Terminal columns between the start of the cursor's line and the cursor.
    pub fn cursor_column(&self, masked: bool) -> usize {
        let before: String = self.text.chars().take(self.cursor).collect();
        let line = before.rsplit('\n').next().unwrap_or("");
        if masked {
            line.chars().count()
        } else {
            line.width()
        }
    }

    /// Zero-based line index of the cursor.
    pub fn cursor_line(&self) -> usize {
        self.text
            .chars()
            .take(self.cursor)
            .filter(|&c| c == '\n')
            .count()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn char_to_byte(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
