//! Provider connection contract and the AWS resource model seen by checks

use chrono::{DateTime, Duration, Utc};
use ckia_core::{ExecutionContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Blocking AWS API surface used by the check catalogue.
///
/// Every call takes the run's execution context and must fail with
/// `Cancelled` or `Timeout` once the run should stop.
pub trait AwsConnection: Send + Sync {
    /// Region the connection is bound to
    fn region(&self) -> &str;

    fn describe_db_instances(&self, ctx: &ExecutionContext) -> Result<Vec<DbInstance>>;

    fn describe_volumes(&self, ctx: &ExecutionContext) -> Result<Vec<Volume>>;

    fn describe_snapshots(&self, ctx: &ExecutionContext, snapshot_ids: &[String]) -> Result<Vec<Snapshot>>;

    fn describe_addresses(&self, ctx: &ExecutionContext) -> Result<Vec<Address>>;

    fn describe_load_balancers(&self, ctx: &ExecutionContext) -> Result<Vec<LoadBalancer>>;

    /// Target groups attached to one load balancer
    fn describe_target_groups(&self, ctx: &ExecutionContext, load_balancer_arn: &str) -> Result<Vec<TargetGroup>>;

    fn describe_target_health(
        &self,
        ctx: &ExecutionContext,
        target_group_arn: &str,
    ) -> Result<Vec<TargetHealthDescription>>;

    /// CloudWatch datapoints for one metric and dimension within the query window
    fn get_metric_statistics(&self, ctx: &ExecutionContext, query: &MetricQuery) -> Result<Vec<Datapoint>>;

    fn list_functions(&self, ctx: &ExecutionContext) -> Result<Vec<LambdaFunction>>;

    /// IAM account summary map, e.g. `AccountMFAEnabled`
    fn get_account_summary(&self, ctx: &ExecutionContext) -> Result<BTreeMap<String, i32>>;

    fn get_caller_identity(&self, ctx: &ExecutionContext) -> Result<CallerIdentity>;
}

/// Connection type the AWS catalogue is registered against
pub type Connection = dyn AwsConnection;

/// Resource tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Value of the `Name` tag, if any
pub fn name_tag(tags: &[Tag]) -> Option<&str> {
    tags.iter()
        .find(|t| t.key == "Name")
        .map(|t| t.value.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstance {
    pub db_instance_identifier: String,
    #[serde(default)]
    pub db_instance_class: String,
    #[serde(default, rename = "multiAZ")]
    pub multi_az: bool,
    /// Provisioned storage in GiB
    #[serde(default)]
    pub allocated_storage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeState {
    Creating,
    Available,
    InUse,
    Deleting,
    Deleted,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume_id: String,
    #[serde(default)]
    pub volume_type: String,
    /// Size in GiB
    #[serde(default)]
    pub size: i32,
    pub state: VolumeState,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub snapshot_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Elastic IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub public_ip: String,
    #[serde(default)]
    pub allocation_id: Option<String>,
    #[serde(default)]
    pub association_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub load_balancer_arn: String,
    pub load_balancer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    pub target_group_arn: String,
    #[serde(default)]
    pub load_balancer_arns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetHealthState {
    Initial,
    Healthy,
    Unhealthy,
    Unused,
    Draining,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetHealthDescription {
    pub target_id: String,
    pub state: TargetHealthState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
    SampleCount,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::SampleCount => "SampleCount",
        };
        f.write_str(s)
    }
}

/// One CloudWatch datapoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub sum: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Datapoint {
    pub fn average_or_zero(&self) -> f64 {
        self.average.unwrap_or(0.0)
    }

    pub fn sum_or_zero(&self) -> f64 {
        self.sum.unwrap_or(0.0)
    }
}

/// A `GetMetricStatistics` request for a single dimension
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub statistic: Statistic,
    pub period_secs: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MetricQuery {
    /// Hourly averages over the last day until changed
    pub fn new(
        namespace: impl Into<String>,
        metric_name: impl Into<String>,
        dimension_name: impl Into<String>,
        dimension_value: impl Into<String>,
    ) -> Self {
        let end = Utc::now();
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimension_name: dimension_name.into(),
            dimension_value: dimension_value.into(),
            statistic: Statistic::Average,
            period_secs: 3600,
            start: end - Duration::days(1),
            end,
        }
    }

    pub fn statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn period_secs(mut self, period_secs: u32) -> Self {
        self.period_secs = period_secs;
        self
    }

    /// Window of `days` ending at `end`
    pub fn lookback(mut self, end: DateTime<Utc>, days: i64) -> Self {
        self.start = end - Duration::days(days);
        self.end = end;
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaFunction {
    pub function_name: String,
    #[serde(default)]
    pub runtime: Option<String>,
}

/// STS caller identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub account: String,
    #[serde(default)]
    pub arn: String,
    #[serde(default)]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_tag() {
        let tags = vec![
            Tag { key: "env".into(), value: "prod".into() },
            Tag { key: "Name".into(), value: "db-data".into() },
        ];
        assert_eq!(name_tag(&tags), Some("db-data"));
        assert_eq!(name_tag(&[]), None);
    }

    #[test]
    fn test_volume_state_wire_names() {
        let state: VolumeState = serde_yaml::from_str("in-use").unwrap();
        assert_eq!(state, VolumeState::InUse);
        let state: TargetHealthState = serde_yaml::from_str("unhealthy").unwrap();
        assert_eq!(state, TargetHealthState::Unhealthy);
    }

    #[test]
    fn test_metric_query_window() {
        let end = Utc::now();
        let query = MetricQuery::new("AWS/RDS", "DatabaseConnections", "DBInstanceIdentifier", "db-1")
            .lookback(end, 14);
        assert!(query.contains(&(end - Duration::days(13))));
        assert!(!query.contains(&(end - Duration::days(15))));
        assert_eq!(query.statistic, Statistic::Average);
    }
}
