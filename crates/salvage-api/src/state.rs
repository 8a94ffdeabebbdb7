//! Shared application state for the game API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use salvage_core::{Clock, GameBackend, SystemClock};

/// State shared by every handler: the backend and the clock requests are
/// evaluated against.
pub struct AppState<B> {
    /// The game backend.
    pub backend: Arc<B>,
    /// Source of `now` for every operation.
    pub clock: Arc<dyn Clock>,
}

impl<B: GameBackend> AppState<B> {
    /// Create state with an explicit clock.
    pub fn new(backend: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Create state on the system wall clock.
    pub fn with_system_clock(backend: Arc<B>) -> Self {
        Self::new(backend, Arc::new(SystemClock))
    }

    /// The instant the current request is evaluated at.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
