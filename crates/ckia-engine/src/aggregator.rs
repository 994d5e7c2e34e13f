//! Classification of per-check outcomes into the categorized report

use ckia_core::{Category, CheckDescriptor, CheckFailure, CheckId, CheckResult, Report, RunOutcome, RunSummary};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Everything produced by one run, ready for output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub report: Report,
    pub errors: Vec<CheckFailure>,
    /// Non-fatal notes, e.g. results dropped for an unknown category
    pub diagnostics: Vec<String>,
    pub summary: RunSummary,
}

impl Aggregate {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Builds the report from runner outcomes
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    include_empty: bool,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also place results that ran cleanly but found nothing
    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    pub fn aggregate(&self, outcomes: BTreeMap<CheckId, RunOutcome>) -> Aggregate {
        let mut aggregate = Aggregate::default();

        for (id, outcome) in outcomes {
            aggregate.summary.total += 1;
            match outcome {
                RunOutcome::Completed(result) => {
                    if result.is_empty() {
                        debug!("Check {} found nothing", id);
                        aggregate.summary.no_findings += 1;
                        if self.include_empty {
                            place(&mut aggregate, &id, result);
                        }
                        continue;
                    }
                    if place(&mut aggregate, &id, result) {
                        aggregate.summary.with_findings += 1;
                    }
                }
                RunOutcome::NoFinding => aggregate.summary.no_findings += 1,
                RunOutcome::Failed(failure) => {
                    aggregate.summary.failed += 1;
                    aggregate.errors.push(failure);
                }
            }
        }

        aggregate.report.sort();
        aggregate.errors.sort_by(|a, b| a.check_id.cmp(&b.check_id));
        aggregate
    }

    /// Group catalogue metadata by category, for listing
    pub fn aggregate_descriptors(&self, descriptors: Vec<CheckDescriptor>) -> Aggregate {
        let mut aggregate = Aggregate::default();

        for descriptor in descriptors {
            aggregate.summary.total += 1;
            let id = descriptor.id.clone();
            if place(&mut aggregate, &id, CheckResult::new(descriptor)) {
                aggregate.summary.with_findings += 1;
            }
        }

        aggregate.report.sort();
        aggregate
    }
}

/// Append `result` to its category; false if the category is unknown
fn place(aggregate: &mut Aggregate, id: &CheckId, result: CheckResult) -> bool {
    match classify(id) {
        Some(category) => {
            aggregate.report.push(category, result);
            true
        }
        None => {
            let note = format!(
                "dropped result of {}: unknown category '{}'",
                id,
                id.category_segment().unwrap_or("")
            );
            warn!("{}", note);
            aggregate.diagnostics.push(note);
            aggregate.summary.dropped += 1;
            false
        }
    }
}

/// Category encoded in the identifier's third segment
pub fn classify(id: &CheckId) -> Option<Category> {
    id.category()
}
