//! Check identifiers and report categories
//!
//! Identifiers follow `<product>:<provider>:<category>:<name>`; the third
//! segment decides which report bucket a result lands in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique identifier of a check
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(String);

impl CheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(product, provider, category, name)` when the identifier
    /// has exactly four non-empty segments
    pub fn segments(&self) -> Option<(&str, &str, &str, &str)> {
        let mut parts = self.0.split(':');
        let product = parts.next()?;
        let provider = parts.next()?;
        let category = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        if [product, provider, category, name].iter().any(|s| s.is_empty()) {
            return None;
        }
        Some((product, provider, category, name))
    }

    /// The raw category segment, if the identifier is well formed
    pub fn category_segment(&self) -> Option<&str> {
        self.segments().map(|(_, _, category, _)| category)
    }

    /// The report category encoded in the identifier
    pub fn category(&self) -> Option<Category> {
        self.category_segment().and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CheckId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CheckId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Top-level report bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    CostOptimization,
    Performance,
    Security,
    FaultTolerance,
    ServiceLimits,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::CostOptimization,
        Category::Performance,
        Category::Security,
        Category::FaultTolerance,
        Category::ServiceLimits,
    ];

    /// Key used for this category in the JSON report
    pub fn report_key(&self) -> &'static str {
        match self {
            Category::CostOptimization => "costOptimization",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::FaultTolerance => "faultTolerance",
            Category::ServiceLimits => "serviceLimits",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_key())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cost" | "costoptimization" => Ok(Category::CostOptimization),
            "performance" => Ok(Category::Performance),
            "security" => Ok(Category::Security),
            "faulttolerance" | "fault-tolerance" | "fault_tolerance" => {
                Ok(Category::FaultTolerance)
            }
            "servicelimits" | "service-limits" | "service_limits" => Ok(Category::ServiceLimits),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        let id = CheckId::new("ckia:aws:cost:IdleDBInstances");
        assert_eq!(id.segments(), Some(("ckia", "aws", "cost", "IdleDBInstances")));
        assert_eq!(id.category(), Some(Category::CostOptimization));
    }

    #[test]
    fn test_malformed_identifiers_have_no_category() {
        assert_eq!(CheckId::new("ckia:aws:cost").category(), None);
        assert_eq!(CheckId::new("ckia:aws::Foo").category(), None);
        assert_eq!(CheckId::new("a:b:cost:c:d").category(), None);
        assert_eq!(CheckId::new("").segments(), None);
    }

    #[test]
    fn test_unknown_category_segment() {
        let id = CheckId::new("x:aws:billing:Foo");
        assert_eq!(id.category_segment(), Some("billing"));
        assert_eq!(id.category(), None);
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!("security".parse(), Ok(Category::Security));
        assert_eq!("Fault-Tolerance".parse(), Ok(Category::FaultTolerance));
        assert_eq!("serviceLimits".parse(), Ok(Category::ServiceLimits));
        assert!("network".parse::<Category>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = CheckId::new("x:aws:security:Bar");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"x:aws:security:Bar\"");
    }
}
