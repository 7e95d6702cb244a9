use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// The text changed
  Changed,
  /// Key was handled but the text is unchanged (cursor movement)
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, editing cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Single-line text input. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(value: &str) -> Self {
    Self {
      buffer: value.to_string(),
      cursor: value.chars().count(),
    }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Cursor position in characters, for rendering
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  fn len(&self) -> usize {
    self.buffer.chars().count()
  }

  fn byte_index(&self, char_index: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_index)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor == 0 {
          return InputResult::Consumed;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
        InputResult::Changed
      }
      KeyCode::Delete => {
        if self.cursor >= self.len() {
          return InputResult::Consumed;
        }
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
        InputResult::Changed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.len());
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.len();
        InputResult::Consumed
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.len();
        InputResult::Consumed
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        let at = self.byte_index(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
        InputResult::Changed
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        InputResult::Changed
      }
      _ => InputResult::NotHandled,
    }
  }
}
