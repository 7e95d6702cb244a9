//! Trailing-edge debounce for free-text input.
//!
//! Every [`Debouncer::set`] pushes the deadline out by the full window. Once
//! the input has been quiet for the window, [`Debouncer::poll`] yields the
//! settled value exactly once. Time is passed in explicitly so the event loop
//! can drive it from its tick and tests can drive it by hand.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
  window: Duration,
  pending: String,
  deadline: Option<Instant>,
  settled: String,
}

impl Debouncer {
  pub fn new(window: Duration) -> Self {
    Self {
      window,
      pending: String::new(),
      deadline: None,
      settled: String::new(),
    }
  }

  /// Record new input at `now`, restarting the quiet window.
  pub fn set(&mut self, value: impl Into<String>, now: Instant) {
    self.pending = value.into();
    self.deadline = Some(now + self.window);
  }

  /// The settled value, if the window has elapsed and it changed.
  pub fn poll(&mut self, now: Instant) -> Option<&str> {
    match self.deadline {
      Some(deadline) if now >= deadline => {
        self.deadline = None;
        self.take_if_changed()
      }
      _ => None,
    }
  }

  /// Settle the pending value immediately, regardless of the window.
  ///
  /// Returns the value even if it equals the previous settled one.
  pub fn flush(&mut self) -> &str {
    self.deadline = None;
    self.settled = self.pending.clone();
    &self.settled
  }

  pub fn is_waiting(&self) -> bool {
    self.deadline.is_some()
  }

  fn take_if_changed(&mut self) -> Option<&str> {
    if self.pending == self.settled {
      return None;
    }
    self.settled = self.pending.clone();
    Some(&self.settled)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const WINDOW: Duration = Duration::from_millis(400);

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[test]
  fn test_settles_after_quiet_window() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);

    d.set("luke", t0);
    assert_eq!(d.poll(t0 + ms(399)), None);
    assert_eq!(d.poll(t0 + ms(400)), Some("luke"));
    assert!(!d.is_waiting());
  }

  #[test]
  fn test_rapid_changes_collapse_to_one_transition() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);
    let mut transitions = Vec::new();

    // One keystroke every 100ms, polled every 50ms
    let word = "vader";
    for (i, _) in word.char_indices() {
      let at = t0 + ms(100 * i as u64);
      d.set(&word[..=i], at);
      if let Some(v) = d.poll(at + ms(50)) {
        transitions.push(v.to_string());
      }
    }
    let last = t0 + ms(100 * (word.len() as u64 - 1));
    for step in 1..=20 {
      if let Some(v) = d.poll(last + ms(50 * step)) {
        transitions.push(v.to_string());
      }
    }

    assert_eq!(transitions, vec!["vader".to_string()]);
  }

  #[test]
  fn test_each_keystroke_resets_window() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);

    d.set("a", t0);
    d.set("ab", t0 + ms(300));
    // 400ms after the first keystroke, but only 100ms after the second
    assert_eq!(d.poll(t0 + ms(400)), None);
    assert_eq!(d.poll(t0 + ms(700)), Some("ab"));
  }

  #[test]
  fn test_unchanged_value_does_not_settle_twice() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);

    d.set("han", t0);
    assert_eq!(d.poll(t0 + WINDOW), Some("han"));

    // Typed and deleted a character: back where we were
    d.set("hanx", t0 + ms(500));
    d.set("han", t0 + ms(600));
    assert_eq!(d.poll(t0 + ms(1100)), None);
    assert!(!d.is_waiting());
  }

  #[test]
  fn test_flush_settles_immediately() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);

    d.set("leia", t0);
    assert_eq!(d.flush(), "leia");
    assert_eq!(d.poll(t0 + WINDOW), None);
    assert!(!d.is_waiting());
  }
}
