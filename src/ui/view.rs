use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use std::time::Instant;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Intents a pane hands back to the App
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// A person is highlighted in the list; warm it and its relations
  Hover(String),
  /// A co-cast member is highlighted; warm just that person
  Prefetch(String),
  /// Open a person in the detail pane
  Select(String),
  /// Close the detail pane
  Deselect,
  Quit,
}

/// A pane of the explorer.
///
/// Panes own their async slots and poll them in `tick()`; the App only routes
/// keys to the focused pane and carries out the returned [`ViewAction`].
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the pane; `focused` panes get a highlighted border
  fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool);

  /// Advance timers and apply arrived results. Returns `true` on change.
  fn tick(&mut self, _now: Instant) -> bool {
    false
  }

  /// Whether the pane is capturing raw text input
  fn is_editing(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "quit").with_priority(90)]
  }
}
