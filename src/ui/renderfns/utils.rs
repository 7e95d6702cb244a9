use ratatui::widgets::ListState;

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// SWAPI reports missing attributes as "unknown", "n/a" or leaves them out
pub fn or_unknown(value: &str) -> &str {
  match value.trim() {
    "" | "n/a" => "unknown",
    v => v,
  }
}

/// Keep the highlight inside a list of `len` items.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
