//! Selector → runner → aggregator, wired together

use crate::aggregator::{Aggregate, ResultAggregator};
use crate::registry::CheckRegistry;
use crate::runner::{ConcurrentRunner, RunnerConfig};
use crate::selector::{select, RunRequest};
use ckia_core::{ExecutionContext, NullProgressReporter, ProgressReporter, Result};
use std::sync::Arc;
use tracing::info;

/// Builder for a single audit run over a registry
pub struct AuditPipeline<'r, C: ?Sized> {
    registry: &'r CheckRegistry<C>,
    request: RunRequest,
    config: RunnerConfig,
    include_empty: bool,
    progress: Arc<dyn ProgressReporter>,
}

impl<'r, C: ?Sized + Sync> AuditPipeline<'r, C> {
    pub fn new(registry: &'r CheckRegistry<C>) -> Self {
        Self {
            registry,
            request: RunRequest::all(),
            config: RunnerConfig::default(),
            include_empty: false,
            progress: Arc::new(NullProgressReporter),
        }
    }

    /// Set the include/exclude filters
    pub fn request(mut self, request: RunRequest) -> Self {
        self.request = request;
        self
    }

    /// Set the maximum number of concurrent checks
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Keep results without findings in the report
    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    /// Set progress reporter
    pub fn progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Select, execute and aggregate
    pub fn run(self, ctx: &ExecutionContext, conn: &C) -> Result<Aggregate> {
        let eligible = select(&self.registry.list_ids(), &self.request);
        info!(
            "Selected {} of {} registered check(s)",
            eligible.len(),
            self.registry.len()
        );

        let outcomes = ConcurrentRunner::new(self.registry)
            .with_config(self.config)
            .with_progress(self.progress)
            .run(&eligible, ctx, conn)?;

        let aggregate = ResultAggregator::new()
            .include_empty(self.include_empty)
            .aggregate(outcomes);

        info!(
            "Report contains {} result(s); {} failure(s), {} dropped",
            aggregate.report.len(),
            aggregate.summary.failed,
            aggregate.summary.dropped
        );
        Ok(aggregate)
    }
}
