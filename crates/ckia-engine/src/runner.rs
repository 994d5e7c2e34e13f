//! Concurrent runner that executes selected checks on a bounded pool

use crate::dispatch::Dispatcher;
use crate::registry::CheckRegistry;
use ckia_core::{
    CheckFailure, CheckId, CkiaError, ExecutionContext, FailureKind, NullProgressReporter,
    ProgressReporter, Result, RunOutcome,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Configuration for the concurrent runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of checks executing at once
    pub parallelism: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallelism: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
        }
    }
}

/// Runs checks in parallel and records one outcome per check.
///
/// A failing, timed-out or panicking check only affects its own outcome.
pub struct ConcurrentRunner<'r, C: ?Sized> {
    dispatcher: Dispatcher<'r, C>,
    config: RunnerConfig,
    progress: Arc<dyn ProgressReporter>,
}

impl<'r, C: ?Sized + Sync> ConcurrentRunner<'r, C> {
    /// Create a runner over `registry`
    pub fn new(registry: &'r CheckRegistry<C>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            config: RunnerConfig::default(),
            progress: Arc::new(NullProgressReporter),
        }
    }

    /// Set the runner configuration
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pool size
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Set the progress reporter
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Execute every id in `ids` and wait for all of them.
    ///
    /// Only pool construction can fail; per-check errors are returned as
    /// `RunOutcome::Failed` entries.
    pub fn run(
        &self,
        ids: &[CheckId],
        ctx: &ExecutionContext,
        conn: &C,
    ) -> Result<BTreeMap<CheckId, RunOutcome>> {
        let parallelism = self.config.parallelism.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("ckia-check-{}", i))
            .build()
            .map_err(|e| CkiaError::Config(format!("failed to build worker pool: {}", e)))?;

        info!(
            "Running {} check(s) with parallelism {}",
            ids.len(),
            parallelism
        );
        self.progress.phase_started("checks", ids.len());

        let outcomes = Mutex::new(BTreeMap::new());
        let completed = AtomicUsize::new(0);

        pool.install(|| {
            ids.par_iter().for_each(|id| {
                let outcome = self.run_one(id, ctx, conn);

                if let RunOutcome::Failed(failure) = &outcome {
                    warn!("{}", failure);
                    self.progress.check_failed(failure);
                }
                let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                self.progress.check_completed(count, id);

                outcomes
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(id.clone(), outcome);
            });
        });

        self.progress.phase_completed("checks");
        let outcomes = outcomes.into_inner().unwrap_or_else(PoisonError::into_inner);

        let failed = outcomes.values().filter(|o| !o.is_success()).count();
        info!(
            "Run completed: {} check(s), {} failed",
            outcomes.len(),
            failed
        );

        Ok(outcomes)
    }

    fn run_one(&self, id: &CheckId, ctx: &ExecutionContext, conn: &C) -> RunOutcome {
        if let Err(e) = ctx.checkpoint() {
            return RunOutcome::Failed(CheckFailure::from_error(id.clone(), &e));
        }

        debug!("Executing check {}", id);
        let executed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.dispatcher.execute(id, ctx, conn)
        }));

        let result = match executed {
            Ok(result) => result,
            Err(payload) => {
                return RunOutcome::Failed(CheckFailure::new(
                    id.clone(),
                    FailureKind::Internal,
                    format!("check panicked: {}", panic_message(payload.as_ref())),
                ))
            }
        };

        // A result that arrives after the deadline is discarded
        let result = result.and_then(|r| ctx.checkpoint().map(|_| r));

        match result {
            Ok(Some(result)) => {
                debug!("Check {} reported {} finding(s)", id, result.finding_count());
                RunOutcome::Completed(result)
            }
            Ok(None) => {
                debug!("Check {} had nothing to report", id);
                RunOutcome::NoFinding
            }
            Err(e) => RunOutcome::Failed(CheckFailure::from_error(id.clone(), &e)),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
