//! Report types: check metadata, results, per-check outcomes and the final report

use crate::error::{CkiaError, Result};
use crate::id::{Category, CheckId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Static metadata describing a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDescriptor {
    pub id: CheckId,
    pub name: String,
    pub description: String,
    pub criteria: String,
    pub recommended_action: String,
    pub additional_resources: String,
}

impl CheckDescriptor {
    pub fn new(id: impl Into<CheckId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            criteria: String::new(),
            recommended_action: String::new(),
            additional_resources: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.criteria = criteria.into();
        self
    }

    pub fn with_recommended_action(mut self, action: impl Into<String>) -> Self {
        self.recommended_action = action.into();
        self
    }

    pub fn with_additional_resources(mut self, resources: impl Into<String>) -> Self {
        self.additional_resources = resources.into();
        self
    }
}

/// Result of one check: its descriptor plus check-specific fields.
///
/// Both parts are flattened into a single JSON object, so a result serializes
/// as the six descriptor fields followed by e.g. `"idleDBInstances": [...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub descriptor: CheckDescriptor,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CheckResult {
    pub fn new(descriptor: CheckDescriptor) -> Self {
        Self {
            descriptor,
            details: Map::new(),
        }
    }

    /// Attach a findings array under a stable key
    pub fn with_findings<T: Serialize>(mut self, key: impl Into<String>, findings: &[T]) -> Result<Self> {
        let value = serde_json::to_value(findings)?;
        self.details.insert(key.into(), value);
        Ok(self)
    }

    /// Attach a scalar or structured field
    pub fn with_field<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.details.insert(key.into(), value);
        Ok(self)
    }

    pub fn id(&self) -> &CheckId {
        &self.descriptor.id
    }

    /// Findings stored under `key`
    pub fn findings(&self, key: &str) -> Option<&Vec<Value>> {
        self.details.get(key).and_then(Value::as_array)
    }

    /// Total number of findings across every array-valued field
    pub fn finding_count(&self) -> usize {
        self.details
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }

    /// True when the check ran and found nothing
    pub fn is_empty(&self) -> bool {
        self.finding_count() == 0
    }
}

/// The categorized report handed to the output stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub cost_optimization: Vec<CheckResult>,

    #[serde(default)]
    pub performance: Vec<CheckResult>,

    #[serde(default)]
    pub security: Vec<CheckResult>,

    #[serde(default)]
    pub fault_tolerance: Vec<CheckResult>,

    #[serde(default)]
    pub service_limits: Vec<CheckResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: Category) -> &[CheckResult] {
        match category {
            Category::CostOptimization => &self.cost_optimization,
            Category::Performance => &self.performance,
            Category::Security => &self.security,
            Category::FaultTolerance => &self.fault_tolerance,
            Category::ServiceLimits => &self.service_limits,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<CheckResult> {
        match category {
            Category::CostOptimization => &mut self.cost_optimization,
            Category::Performance => &mut self.performance,
            Category::Security => &mut self.security,
            Category::FaultTolerance => &mut self.fault_tolerance,
            Category::ServiceLimits => &mut self.service_limits,
        }
    }

    /// Append a result to a category
    pub fn push(&mut self, category: Category, result: CheckResult) {
        self.bucket_mut(category).push(result);
    }

    /// Sort every category by check identifier
    pub fn sort(&mut self) {
        for category in Category::ALL {
            self.bucket_mut(category)
                .sort_by(|a, b| a.descriptor.id.cmp(&b.descriptor.id));
        }
    }

    /// Consume and return the report with every category sorted
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    /// Iterate all results with their category
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CheckResult)> + '_ {
        Category::ALL
            .into_iter()
            .flat_map(move |c| self.bucket(c).iter().map(move |r| (c, r)))
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.bucket(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a report from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CkiaError::Parse {
            context: "report".to_string(),
            message: e.to_string(),
        })
    }
}

/// Why a single check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unknown identifier, unknown operation or arity mismatch
    Dispatch,
    /// Provider API failure
    Provider,
    /// Run deadline exceeded
    Timeout,
    /// Run cancelled
    Cancelled,
    /// Anything else, including a panicking check
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Dispatch => write!(f, "dispatch"),
            FailureKind::Provider => write!(f, "provider"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}

/// A check that could not complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFailure {
    pub check_id: CheckId,
    pub kind: FailureKind,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CheckFailure {
    pub fn new(check_id: CheckId, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            check_id,
            kind,
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Record `err` against `check_id`
    pub fn from_error(check_id: CheckId, err: &CkiaError) -> Self {
        Self::new(check_id, err.failure_kind(), err.to_string())
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.check_id, self.message)
    }
}

/// What happened to one check during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The check ran and returned a result (which may hold no findings)
    Completed(CheckResult),
    /// The check ran and had nothing to report
    NoFinding,
    /// The check could not complete
    Failed(CheckFailure),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&CheckFailure> {
        match self {
            RunOutcome::Failed(f) => Some(f),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&CheckResult> {
        match self {
            RunOutcome::Completed(r) => Some(r),
            _ => None,
        }
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Checks that produced an outcome
    pub total: usize,
    /// Checks placed in the report
    pub with_findings: usize,
    /// Checks that ran cleanly with nothing to report
    pub no_findings: usize,
    /// Checks that failed
    pub failed: usize,
    /// Results dropped because their category is unknown
    pub dropped: usize,
}
