use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single prompt buffer with a char-indexed cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ComposeEditor {
    input: String,
    cursor_pos: usize,
}

impl ComposeEditor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        &self.input
    }

    pub(crate) fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    pub(crate) fn take(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub(crate) fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let byte_pos = self.byte_index(self.cursor_pos);
        self.input.insert_str(byte_pos, text);
        self.cursor_pos += text.chars().count();
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        let mut buffer = [0_u8; 4];
        let text = ch.encode_utf8(&mut buffer);
        self.insert_text(text);
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor_pos == 0 {
            return false;
        }
        let byte_pos = self.byte_index(self.cursor_pos - 1);
        self.input.remove(byte_pos);
        self.cursor_pos -= 1;
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor_pos >= self.char_count() {
            return false;
        }
        let byte_pos = self.byte_index(self.cursor_pos);
        self.input.remove(byte_pos);
        true
    }

    fn move_cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
        }
    }

    fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.char_count() {
            self.cursor_pos += 1;
        }
    }

    fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    fn move_cursor_end(&mut self) {
        self.cursor_pos = self.char_count();
    }

    fn delete_to_start(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        let byte_pos = self.byte_index(self.cursor_pos);
        self.input.drain(..byte_pos);
        self.cursor_pos = 0;
    }

    fn delete_to_end(&mut self) {
        let byte_pos = self.byte_index(self.cursor_pos);
        self.input.truncate(byte_pos);
    }

    fn delete_word_backward(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        let chars: Vec<char> = self.input.chars().collect();
        let mut new_pos = self.cursor_pos;
        while new_pos > 0 && chars[new_pos - 1].is_whitespace() {
            new_pos -= 1;
        }
        while new_pos > 0 && !chars[new_pos - 1].is_whitespace() {
            new_pos -= 1;
        }
        let start_byte = self.byte_index(new_pos);
        let end_byte = self.byte_index(self.cursor_pos);
        self.input.drain(start_byte..end_byte);
        self.cursor_pos = new_pos;
    }

    /// Line editing keys. Returns whether the buffer or cursor changed.
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        let previous = (self.input.len(), self.cursor_pos);
        match key.code {
            KeyCode::Left if key.modifiers == KeyModifiers::NONE => self.move_cursor_left(),
            KeyCode::Right if key.modifiers == KeyModifiers::NONE => self.move_cursor_right(),
            KeyCode::Home if key.modifiers == KeyModifiers::NONE => self.move_cursor_home(),
            KeyCode::End if key.modifiers == KeyModifiers::NONE => self.move_cursor_end(),
            KeyCode::Backspace if key.modifiers == KeyModifiers::NONE => {
                return self.delete_char_before_cursor();
            }
            KeyCode::Delete if key.modifiers == KeyModifiers::NONE => {
                return self.delete_char_at_cursor();
            }
            KeyCode::Char(c) if is_plain_char_input(key.modifiers) => {
                self.insert_char(c);
                return true;
            }
            KeyCode::Char(c) if is_ctrl_only(key.modifiers) => match c.to_ascii_lowercase() {
                'a' => self.move_cursor_home(),
                'e' => self.move_cursor_end(),
                'u' => self.delete_to_start(),
                'k' => self.delete_to_end(),
                'w' => self.delete_word_backward(),
                _ => return false,
            },
            _ => return false,
        }
        (self.input.len(), self.cursor_pos) != previous
    }
}

fn is_plain_char_input(modifiers: KeyModifiers) -> bool {
    !modifiers.contains(KeyModifiers::CONTROL)
        && !modifiers.contains(KeyModifiers::ALT)
        && !modifiers.contains(KeyModifiers::SUPER)
}

fn is_ctrl_only(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL)
        && !modifiers.contains(KeyModifiers::ALT)
        && !modifiers.contains(KeyModifiers::SUPER)
}
