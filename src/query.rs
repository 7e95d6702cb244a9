//! Async query slot with a staleness guard.
//!
//! A `Query<T>` owns one logical piece of view state (the people list, the
//! selected person's detail). Each load started on it gets a new generation
//! number; results are tagged with the generation that produced them and
//! only the most recent generation is ever applied. Superseded tasks are
//! aborted best-effort, but correctness only relies on the tag check.
//!
//! # Example
//!
//! ```ignore
//! let mut list = Query::new();
//!
//! // Start loading
//! let gateway = gateway.clone();
//! list.start(async move { gateway.fetch_as::<ListPage>(&url, Freshness::Revalidate).await.map_err(|e| e.to_string()) });
//!
//! // In event loop tick
//! if list.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match list.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(page) => render_page(page),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Nothing requested, or cleared
  Idle,
  /// A load is in flight
  Loading,
  /// The latest load completed successfully
  Success(T),
  /// The latest load failed
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// Result of checking an arrived result against the current generation.
#[derive(Debug, PartialEq, Eq)]
pub enum Arrival<T> {
  /// Produced by the most recent load; safe to apply
  Fresh(T),
  /// Produced by a superseded load; must be dropped
  Stale,
}

/// Monotonic generation counter for one slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Epoch {
  current: u64,
}

impl Epoch {
  /// Start a new generation, superseding all earlier ones.
  pub fn advance(&mut self) -> u64 {
    self.current += 1;
    self.current
  }

  pub fn current(&self) -> u64 {
    self.current
  }

  /// Tag `value`, produced by `generation`, as fresh or stale.
  pub fn check<T>(&self, generation: u64, value: T) -> Arrival<T> {
    if generation == self.current {
      Arrival::Fresh(value)
    } else {
      Arrival::Stale
    }
  }
}

type Tagged<T> = (u64, Result<T, String>);

/// Async query slot with loading/success/error state.
pub struct Query<T> {
  state: QueryState<T>,
  epoch: Epoch,
  sender: mpsc::UnboundedSender<Tagged<T>>,
  receiver: mpsc::UnboundedReceiver<Tagged<T>>,
  task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Query<T> {
  pub fn new() -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      state: QueryState::Idle,
      epoch: Epoch::default(),
      sender,
      receiver,
      task: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Start a load, superseding any load still in flight.
  pub fn start<F>(&mut self, future: F)
  where
    F: Future<Output = Result<T, String>> + Send + 'static,
  {
    self.supersede();
    let generation = self.epoch.current();
    self.state = QueryState::Loading;

    let sender = self.sender.clone();
    self.task = Some(tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the query may have been dropped
      let _ = sender.send((generation, result));
    }));
  }

  /// Drop whatever is shown or loading and go back to idle.
  pub fn clear(&mut self) {
    self.supersede();
    self.state = QueryState::Idle;
  }

  /// Apply results that arrived since the last poll.
  ///
  /// Returns `true` if the state changed. Call this in your event loop tick
  /// handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    while let Ok((generation, result)) = self.receiver.try_recv() {
      match self.epoch.check(generation, result) {
        Arrival::Fresh(Ok(data)) => {
          self.state = QueryState::Success(data);
          self.task = None;
          changed = true;
        }
        Arrival::Fresh(Err(error)) => {
          self.state = QueryState::Error(error);
          self.task = None;
          changed = true;
        }
        Arrival::Stale => {
          debug!(generation, current = self.epoch.current(), "discarding stale result");
        }
      }
    }

    changed
  }

  fn supersede(&mut self) {
    self.epoch.advance();
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T: Send + 'static> Default for Query<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("generation", &self.epoch.current())
      .finish_non_exhaustive()
  }
}
