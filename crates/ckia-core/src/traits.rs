//! Core traits that define the check abstraction layer.
//!
//! Every check implements [`Check`] for the connection type of its provider,
//! so the engine can hold heterogeneous checks in one collection.

use crate::context::ExecutionContext;
use crate::error::{CkiaError, Result};
use crate::id::CheckId;
use crate::report::{CheckDescriptor, CheckFailure, CheckResult};

/// A check that can be evaluated against a provider connection of type `C`
pub trait Check<C: ?Sized>: Send + Sync {
    /// Static metadata. Must not perform any I/O.
    fn describe(&self) -> CheckDescriptor;

    /// Inspect the provider and report findings.
    ///
    /// `Ok(None)` means there was nothing to inspect; `Ok(Some(result))` with
    /// no findings means the resources were inspected and passed.
    fn execute(&self, ctx: &ExecutionContext, conn: &C) -> Result<Option<CheckResult>>;

    /// Identifier of this check, taken from its descriptor
    fn id(&self) -> CheckId {
        self.describe().id
    }
}

/// Progress reporting abstraction for UI/CLI
pub trait ProgressReporter: Send + Sync {
    /// Called when a batch of checks is about to run
    fn phase_started(&self, name: &str, total_items: usize);

    /// Called each time a check finishes, in completion order
    fn check_completed(&self, completed: usize, id: &CheckId);

    /// Called when a phase completes
    fn phase_completed(&self, name: &str);

    /// Called when a check fails
    fn check_failed(&self, failure: &CheckFailure);
}

/// No-op progress reporter for silent operation
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn phase_started(&self, _name: &str, _total_items: usize) {}
    fn check_completed(&self, _completed: usize, _id: &CheckId) {}
    fn phase_completed(&self, _name: &str) {}
    fn check_failed(&self, _failure: &CheckFailure) {}
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CkiaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            other => Err(CkiaError::Config(format!(
                "unsupported output format '{}' (supported: json)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
