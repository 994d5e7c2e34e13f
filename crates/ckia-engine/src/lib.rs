//! Execution engine for ckia checks
//!
//! Holds the check registry, dispatches operations to checks, filters and
//! runs them concurrently, and merges the outcomes into a categorized report.

mod aggregator;
mod dispatch;
pub mod output;
mod pipeline;
mod registry;
mod runner;
mod selector;

pub use aggregator::*;
pub use dispatch::*;
pub use output::{format_failures, format_json, write_report};
pub use pipeline::*;
pub use registry::*;
pub use runner::*;
pub use selector::*;
