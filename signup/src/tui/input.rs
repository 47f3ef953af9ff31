use crossterm::event::KeyCode;

/// Single-line text input. `cursor` is a character index, not a byte offset.
#[derive(Debug, Clone)]
pub(super) struct TextInput {
    pub value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.chars().count(),
            value: v,
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Rendered value; a focused input shows the cursor as `_`.
    pub fn display(&self, focused: bool) -> String {
        if !focused {
            return self.value.clone();
        }
        let mut out: String = self.value.chars().take(self.cursor).collect();
        out.push('_');
        out.extend(self.value.chars().skip(self.cursor));
        out
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply a key. Returns true when the value changed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let len = self.value.chars().count();
        match code {
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let at = self.byte_index(self.cursor - 1);
                self.value.remove(at);
                self.cursor -= 1;
                true
            }
            KeyCode::Delete => {
                if self.cursor >= len {
                    return false;
                }
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(len);
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = len;
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace() {
        let mut input = TextInput::new("");
        assert!(input.handle_key(KeyCode::Char('a')));
        assert!(input.handle_key(KeyCode::Char('c')));
        input.handle_key(KeyCode::Left);
        assert!(input.handle_key(KeyCode::Char('b')));
        assert_eq!(input.value, "abc");
        assert_eq!(input.display(true), "ab_c");

        assert!(input.handle_key(KeyCode::Backspace));
        assert_eq!(input.value, "ac");
        input.handle_key(KeyCode::Home);
        assert!(!input.handle_key(KeyCode::Backspace));
    }

    #[test]
    fn multibyte_characters_edit_cleanly() {
        let mut input = TextInput::new("Straße");
        input.handle_key(KeyCode::Left);
        assert!(input.handle_key(KeyCode::Backspace));
        assert_eq!(input.value, "Strae");
        assert!(input.handle_key(KeyCode::Delete));
        assert_eq!(input.value, "Stra");
    }

    #[test]
    fn cursor_moves_do_not_change_value() {
        let mut input = TextInput::new("abc");
        assert!(!input.handle_key(KeyCode::Right));
        assert!(!input.handle_key(KeyCode::Home));
        assert_eq!(input.value, "abc");
        assert!(input.handle_key(KeyCode::Delete));
        assert_eq!(input.value, "bc");
        input.set("xyz");
        assert_eq!(input.display(false), "xyz");
        assert!(!input.handle_key(KeyCode::Delete));
    }
}
