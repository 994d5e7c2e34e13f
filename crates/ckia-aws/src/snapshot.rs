//! Connection backed by a serialized account snapshot
//!
//! A snapshot is a YAML or JSON document holding the resources, metric
//! series and IAM/STS answers of one account. Operations listed under
//! `failures` return a provider error instead of data.

use crate::connection::*;
use ckia_core::{CkiaError, ExecutionContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One metric series for a single dimension value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    #[serde(default)]
    pub datapoints: Vec<Datapoint>,
}

/// Serialized account state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    #[serde(default)]
    pub identity: CallerIdentity,
    #[serde(default)]
    pub account_summary: BTreeMap<String, i32>,
    #[serde(default)]
    pub db_instances: Vec<DbInstance>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub load_balancers: Vec<LoadBalancer>,
    #[serde(default)]
    pub target_groups: Vec<TargetGroup>,
    /// Target group ARN → health of its targets
    #[serde(default)]
    pub target_health: BTreeMap<String, Vec<TargetHealthDescription>>,
    #[serde(default)]
    pub metrics: Vec<MetricSeries>,
    #[serde(default)]
    pub functions: Vec<LambdaFunction>,
    /// Operation name → error message
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
    /// Simulated latency of every call, in milliseconds
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

impl AccountSnapshot {
    /// Load a snapshot; JSON when the extension is `.json`, YAML otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CkiaError::Connection(format!("cannot read snapshot {}: {}", path.display(), e))
        })?;

        let parsed = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| {
            CkiaError::Connection(format!("invalid snapshot {}: {}", path.display(), e))
        })
    }
}

/// [`AwsConnection`] answering from an [`AccountSnapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotConnection {
    region: String,
    account: AccountSnapshot,
}

impl SnapshotConnection {
    pub fn new(region: impl Into<String>, account: AccountSnapshot) -> Self {
        Self {
            region: region.into(),
            account,
        }
    }

    pub fn from_file(region: impl Into<String>, path: &Path) -> Result<Self> {
        Ok(Self::new(region, AccountSnapshot::from_file(path)?))
    }

    pub fn account(&self) -> &AccountSnapshot {
        &self.account
    }

    /// Suspension point shared by every call
    fn call(&self, ctx: &ExecutionContext, service: &str, operation: &str) -> Result<()> {
        ctx.checkpoint()?;
        debug!("{} {}", service, operation);

        if let Some(ms) = self.account.latency_ms {
            std::thread::sleep(std::time::Duration::from_millis(ms));
            ctx.checkpoint()?;
        }

        match self.account.failures.get(operation) {
            Some(message) => Err(CkiaError::provider(service, message.clone())),
            None => Ok(()),
        }
    }
}

impl AwsConnection for SnapshotConnection {
    fn region(&self) -> &str {
        &self.region
    }

    fn describe_db_instances(&self, ctx: &ExecutionContext) -> Result<Vec<DbInstance>> {
        self.call(ctx, "RDS", "describe_db_instances")?;
        Ok(self.account.db_instances.clone())
    }

    fn describe_volumes(&self, ctx: &ExecutionContext) -> Result<Vec<Volume>> {
        self.call(ctx, "EC2", "describe_volumes")?;
        Ok(self.account.volumes.clone())
    }

    fn describe_snapshots(&self, ctx: &ExecutionContext, snapshot_ids: &[String]) -> Result<Vec<Snapshot>> {
        self.call(ctx, "EC2", "describe_snapshots")?;
        Ok(self
            .account
            .snapshots
            .iter()
            .filter(|s| snapshot_ids.contains(&s.snapshot_id))
            .cloned()
            .collect())
    }

    fn describe_addresses(&self, ctx: &ExecutionContext) -> Result<Vec<Address>> {
        self.call(ctx, "EC2", "describe_addresses")?;
        Ok(self.account.addresses.clone())
    }

    fn describe_load_balancers(&self, ctx: &ExecutionContext) -> Result<Vec<LoadBalancer>> {
        self.call(ctx, "ELBv2", "describe_load_balancers")?;
        Ok(self.account.load_balancers.clone())
    }

    fn describe_target_groups(&self, ctx: &ExecutionContext, load_balancer_arn: &str) -> Result<Vec<TargetGroup>> {
        self.call(ctx, "ELBv2", "describe_target_groups")?;
        Ok(self
            .account
            .target_groups
            .iter()
            .filter(|g| g.load_balancer_arns.iter().any(|arn| arn == load_balancer_arn))
            .cloned()
            .collect())
    }

    fn describe_target_health(
        &self,
        ctx: &ExecutionContext,
        target_group_arn: &str,
    ) -> Result<Vec<TargetHealthDescription>> {
        self.call(ctx, "ELBv2", "describe_target_health")?;
        Ok(self
            .account
            .target_health
            .get(target_group_arn)
            .cloned()
            .unwrap_or_default())
    }

    fn get_metric_statistics(&self, ctx: &ExecutionContext, query: &MetricQuery) -> Result<Vec<Datapoint>> {
        self.call(ctx, "CloudWatch", "get_metric_statistics")?;
        Ok(self
            .account
            .metrics
            .iter()
            .filter(|m| {
                m.namespace == query.namespace
                    && m.metric_name == query.metric_name
                    && m.dimension_name == query.dimension_name
                    && m.dimension_value == query.dimension_value
            })
            .flat_map(|m| m.datapoints.iter())
            .filter(|d| query.contains(&d.timestamp))
            .cloned()
            .collect())
    }

    fn list_functions(&self, ctx: &ExecutionContext) -> Result<Vec<LambdaFunction>> {
        self.call(ctx, "Lambda", "list_functions")?;
        Ok(self.account.functions.clone())
    }

    fn get_account_summary(&self, ctx: &ExecutionContext) -> Result<BTreeMap<String, i32>> {
        self.call(ctx, "IAM", "get_account_summary")?;
        Ok(self.account.account_summary.clone())
    }

    fn get_caller_identity(&self, ctx: &ExecutionContext) -> Result<CallerIdentity> {
        self.call(ctx, "STS", "get_caller_identity")?;
        Ok(self.account.identity.clone())
    }
}
