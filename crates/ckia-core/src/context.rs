//! Run-wide execution context: deadline and cancellation

use crate::error::{CkiaError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Context every check receives. Cheap to clone; clones share cancellation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    started_at: Instant,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    /// Context with no deadline
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set a deadline relative to now.
    ///
    /// A timeout too large to represent leaves the context without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Set an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Cancelled` or `Timeout` if the run should stop.
    ///
    /// Called at every provider call and around each unit of work.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(CkiaError::Cancelled);
        }
        if self.is_expired() {
            return Err(CkiaError::Timeout(self.started_at.elapsed()));
        }
        Ok(())
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
