//! Progress reporting through tracing

use ckia_core::{CheckFailure, CheckId, ProgressReporter};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Logs run progress; per-check lines only at debug level
#[derive(Default)]
pub struct LogProgress {
    total: AtomicUsize,
}

impl ProgressReporter for LogProgress {
    fn phase_started(&self, name: &str, total_items: usize) {
        self.total.store(total_items, Ordering::Relaxed);
        info!("{}: {} check(s)", name, total_items);
    }

    fn check_completed(&self, completed: usize, id: &CheckId) {
        debug!(
            "[{}/{}] {}",
            completed,
            self.total.load(Ordering::Relaxed),
            id
        );
    }

    fn phase_completed(&self, name: &str) {
        info!("{} complete", name);
    }

    fn check_failed(&self, failure: &CheckFailure) {
        warn!("{}", failure);
    }
}
