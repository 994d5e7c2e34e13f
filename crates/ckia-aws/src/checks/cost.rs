//! Cost optimization checks

use super::common::*;
use crate::connection::*;
use chrono::{DateTime, Utc};
use ckia_core::{Check, CheckDescriptor, CheckResult, ExecutionContext, Result};
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

const TRUSTED_ADVISOR_COST: &str =
    "See comparable AWS Trusted advisor check: https://docs.aws.amazon.com/awssupport/latest/user/cost-optimization-checks.html";

// ============================================================================
// RDS
// ============================================================================

/// Days of connection history inspected per DB instance
const DB_LOOKBACK_DAYS: i64 = 14;
/// An instance without connections for this many days is idle
const DB_IDLE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleDbInstance {
    pub region: String,
    pub db_instance_name: String,
    #[serde(rename = "multiAZ")]
    pub multi_az: bool,
    pub instance_type: String,
    #[serde(rename = "storageProvisionedInGB")]
    pub storage_provisioned_in_gb: i32,
    pub days_since_last_connection: i64,
    pub estimated_monthly_savings: i64,
}

pub struct IdleDbInstances;

impl IdleDbInstances {
    pub const ID: &'static str = "ckia:aws:cost:IdleDBInstances";
}

impl Check<Connection> for IdleDbInstances {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "RDS Idle DB Instances")
                    .with_description(
                        "Checks the configuration of your Amazon Relational Database Service (Amazon RDS) \
                         for any DB instances that appear to be idle. If a DB instance has not had a connection \
                         for a prolonged period of time, you can delete the instance to reduce costs. If persistent \
                         storage is needed for data on the instance, you can use lower-cost options such as taking \
                         and retaining a DB snapshot. Manually created DB snapshots are retained until you delete them.",
                    )
                    .with_criteria("Any RDS DB instance that has not had a connection in the last 7 days is considered idle.")
                    .with_recommended_action(
                        "Consider taking a snapshot of the idle DB instance and then either stopping it or deleting it. \
                         Stopping the DB instance removes some of the costs for it, but does not remove storage costs. \
                         A stopped instance keeps all automated backups based upon the configured retention period. \
                         Stopping a DB instance usually incurs additional costs when compared to deleting the instance \
                         and then retaining only the final snapshot.",
                    )
                    .with_additional_resources(format!("{}#amazon-rds-idle-dbs-instances", TRUSTED_ADVISOR_COST))
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let instances = conn.describe_db_instances(ctx)?;
        if instances.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let mut idle = Vec::new();
        for instance in &instances {
            let query = MetricQuery::new(
                "AWS/RDS",
                "DatabaseConnections",
                "DBInstanceIdentifier",
                instance.db_instance_identifier.as_str(),
            )
            .statistic(Statistic::Average)
            .lookback(now, DB_LOOKBACK_DAYS);
            let datapoints = conn.get_metric_statistics(ctx, &query)?;

            let (days, connected) = expand_connections(&datapoints, &now);
            if !connected {
                debug!("DB instance {} idle for {} day(s)", instance.db_instance_identifier, days);
                idle.push(IdleDbInstance {
                    region: conn.region().to_string(),
                    db_instance_name: instance.db_instance_identifier.clone(),
                    multi_az: instance.multi_az,
                    instance_type: instance.db_instance_class.clone(),
                    storage_provisioned_in_gb: instance.allocated_storage,
                    days_since_last_connection: days,
                    estimated_monthly_savings: 0,
                });
            }
        }

        CheckResult::new(self.describe())
            .with_findings("idleDBInstances", &idle)
            .map(Some)
    }
}

/// Days since the last connection and whether it falls inside the idle window.
///
/// With no connection in the series the whole lookback is reported.
pub fn expand_connections(datapoints: &[Datapoint], now: &DateTime<Utc>) -> (i64, bool) {
    match latest_nonzero_average(datapoints) {
        Some(last) => {
            let days = days_since(&last, now);
            (days, days < DB_IDLE_DAYS)
        }
        None => (DB_LOOKBACK_DAYS, false),
    }
}

// ============================================================================
// EBS
// ============================================================================

const EBS_LOOKBACK_DAYS: i64 = 14;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderutilizedVolume {
    pub region: String,
    pub volume_id: String,
    pub volume_name: String,
    pub volume_type: String,
    pub volume_size: i32,
    pub monthly_storage_cost: i64,
    pub snapshot_id: Option<String>,
    pub snapshot_name: Option<String>,
    pub snapshot_age: Option<i64>,
}

pub struct UnderutilizedEbsVolumes;

impl UnderutilizedEbsVolumes {
    pub const ID: &'static str = "ckia:aws:cost:UnderutilizedEBSVolumes";
}

impl Check<Connection> for UnderutilizedEbsVolumes {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "Underutilized Amazon EBS Volumes")
                    .with_description(
                        "Checks Amazon Elastic Block Store (Amazon EBS) volume configurations and warns when volumes \
                         appear to be underutilized. Charges begin when a volume is created. If a volume remains \
                         unattached or has very low write activity (excluding boot volumes) for a period of time, the \
                         volume is underutilized. We recommend that you remove underutilized volumes to reduce costs.",
                    )
                    .with_criteria("A volume is unattached or had less than 1 IOPS per day for the past 7 days.")
                    .with_recommended_action("Consider creating a snapshot and deleting the volume to reduce costs.")
                    .with_additional_resources(format!("{}#underutilized-amazon-ebs-volumes", TRUSTED_ADVISOR_COST))
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let volumes = conn.describe_volumes(ctx)?;
        if volumes.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let mut underutilized = Vec::new();
        for volume in &volumes {
            let query = MetricQuery::new("AWS/EBS", "VolumeReadOps", "VolumeId", volume.volume_id.as_str())
                .statistic(Statistic::Average)
                .lookback(now, EBS_LOOKBACK_DAYS);
            let datapoints = conn.get_metric_statistics(ctx, &query)?;

            let Some(mut finding) = expand_underutilized_volume(conn.region(), volume, &datapoints) else {
                continue;
            };

            if let Some(snapshot_id) = finding.snapshot_id.clone() {
                let snapshots = conn.describe_snapshots(ctx, &[snapshot_id])?;
                finding = expand_snapshot(&snapshots, finding, &now);
            }
            underutilized.push(finding);
        }

        CheckResult::new(self.describe())
            .with_findings("underutilizedVolumes", &underutilized)
            .map(Some)
    }
}

/// Finding for an unattached volume with no read activity
pub fn expand_underutilized_volume(
    region: &str,
    volume: &Volume,
    datapoints: &[Datapoint],
) -> Option<UnderutilizedVolume> {
    if volume.state != VolumeState::Available || any_nonzero_average(datapoints) {
        return None;
    }

    Some(UnderutilizedVolume {
        region: region.to_string(),
        volume_id: volume.volume_id.clone(),
        volume_name: name_tag(&volume.tags).unwrap_or_default().to_string(),
        volume_type: volume.volume_type.clone(),
        volume_size: volume.size,
        monthly_storage_cost: 0,
        snapshot_id: volume.snapshot_id.clone().filter(|s| !s.is_empty()),
        snapshot_name: None,
        snapshot_age: None,
    })
}

/// Attach name and age of the volume's source snapshot
pub fn expand_snapshot(
    snapshots: &[Snapshot],
    mut volume: UnderutilizedVolume,
    now: &DateTime<Utc>,
) -> UnderutilizedVolume {
    if let Some(snapshot) = snapshots.first() {
        volume.snapshot_age = Some(days_since(&snapshot.start_time, now));
        volume.snapshot_name = name_tag(&snapshot.tags).map(str::to_string);
    }
    volume
}

// ============================================================================
// EC2 Elastic IPs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassociatedAddress {
    pub region: String,
    pub ip_address: String,
}

pub struct UnassociatedElasticIpAddresses;

impl UnassociatedElasticIpAddresses {
    pub const ID: &'static str = "ckia:aws:cost:UnassociatedElasticIPAddresses";
}

impl Check<Connection> for UnassociatedElasticIpAddresses {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "Unassociated Elastic IP Addresses")
                    .with_description(
                        "Checks for Elastic IP addresses (EIPs) that are not associated with a running Amazon Elastic \
                         Compute Cloud (Amazon EC2) instance. EIPs are static IP addresses designed for dynamic cloud \
                         computing. Unlike traditional static IP addresses, EIPs mask the failure of an instance or \
                         Availability Zone by remapping a public IP address to another instance in your account. A \
                         nominal charge is imposed for an EIP that is not associated with a running instance.",
                    )
                    .with_criteria(
                        "An allocated Elastic IP address (EIP) is not associated with a running Amazon EC2 instance.",
                    )
                    .with_recommended_action(
                        "Associate the EIP with a running active instance, or release the unassociated EIP.",
                    )
                    .with_additional_resources(format!("{}#unassociated-elastic-ip-addresses", TRUSTED_ADVISOR_COST))
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let addresses = conn.describe_addresses(ctx)?;
        if addresses.is_empty() {
            return Ok(None);
        }

        let unassociated: Vec<_> = addresses
            .iter()
            .filter_map(|a| expand_unassociated_address(conn.region(), a))
            .collect();

        CheckResult::new(self.describe())
            .with_findings("unassociatedAddresses", &unassociated)
            .map(Some)
    }
}

pub fn expand_unassociated_address(region: &str, address: &Address) -> Option<UnassociatedAddress> {
    if address.association_id.is_some() {
        return None;
    }
    Some(UnassociatedAddress {
        region: region.to_string(),
        ip_address: address.public_ip.clone(),
    })
}

// ============================================================================
// ELB
// ============================================================================

const LB_LOOKBACK_DAYS: i64 = 7;
/// Requests per datapoint below which a load balancer counts as idle
const LB_MIN_REQUESTS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdleReason {
    #[serde(rename = "no active back-end instances")]
    NoActiveInstances,
    #[serde(rename = "no healthy back-end instances")]
    NoHealthyInstances,
    #[serde(rename = "low request count")]
    LowRequestCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleLoadBalancer {
    pub region: String,
    pub load_balancer_name: String,
    pub reason: IdleReason,
    pub estimated_monthly_savings: i64,
}

pub struct IdleLoadBalancers;

impl IdleLoadBalancers {
    pub const ID: &'static str = "ckia:aws:cost:IdleLoadBalancers";
}

impl Check<Connection> for IdleLoadBalancers {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "Idle Load Balancers")
                    .with_description(
                        "Checks your Elastic Load Balancing configuration for load balancers that are idle. Any load \
                         balancer that is configured accrues charges. If a load balancer has no associated back-end \
                         instances, or if network traffic is severely limited, the load balancer is not being used \
                         effectively.",
                    )
                    .with_criteria(
                        "A load balancer has no active back-end instances. A load balancer has no healthy back-end \
                         instances. A load balancer has had less than 100 requests per day for the last 7 days.",
                    )
                    .with_recommended_action(
                        "If your load balancer has no active back-end instances, consider registering instances or \
                         deleting your load balancer. If your load balancer has no healthy back-end instances, \
                         troubleshoot why they are unhealthy or evaluate for removal. If your load balancer has had a \
                         low request count, consider deleting your load balancer.",
                    )
                    .with_additional_resources(format!("{}#idle-load-balancers", TRUSTED_ADVISOR_COST))
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let load_balancers = conn.describe_load_balancers(ctx)?;
        if load_balancers.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let mut idle = Vec::new();
        for lb in &load_balancers {
            let groups = conn.describe_target_groups(ctx, &lb.load_balancer_arn)?;

            // The first group without active or healthy targets decides
            let mut reason = groups.is_empty().then_some(IdleReason::NoActiveInstances);
            for group in &groups {
                let targets = conn.describe_target_health(ctx, &group.target_group_arn)?;
                reason = target_idle_reason(&targets);
                if reason.is_some() {
                    break;
                }
            }

            let reason = match reason {
                Some(reason) => Some(reason),
                None => {
                    let query = MetricQuery::new(
                        "AWS/ApplicationELB",
                        "RequestCount",
                        "LoadBalancer",
                        lb.load_balancer_name.as_str(),
                    )
                    .statistic(Statistic::Sum)
                    .lookback(now, LB_LOOKBACK_DAYS);
                    let datapoints = conn.get_metric_statistics(ctx, &query)?;
                    expand_low_request_count(&datapoints)
                }
            };

            if let Some(reason) = reason {
                idle.push(IdleLoadBalancer {
                    region: conn.region().to_string(),
                    load_balancer_name: lb.load_balancer_name.clone(),
                    reason,
                    estimated_monthly_savings: 0,
                });
            }
        }

        CheckResult::new(self.describe())
            .with_findings("idleLoadBalancers", &idle)
            .map(Some)
    }
}

/// Idle reason derived from target registration and health alone
pub fn target_idle_reason(targets: &[TargetHealthDescription]) -> Option<IdleReason> {
    if targets.is_empty() {
        Some(IdleReason::NoActiveInstances)
    } else if targets.iter().all(|t| t.state == TargetHealthState::Unhealthy) {
        Some(IdleReason::NoHealthyInstances)
    } else {
        None
    }
}

pub fn expand_low_request_count(datapoints: &[Datapoint]) -> Option<IdleReason> {
    if datapoints.iter().any(|d| d.sum_or_zero() > LB_MIN_REQUESTS) {
        None
    } else {
        Some(IdleReason::LowRequestCount)
    }
}

// ============================================================================
// Lambda
// ============================================================================

const LAMBDA_LOOKBACK_DAYS: i64 = 7;
/// Error percentage above which a function is reported
const LAMBDA_MAX_ERROR_RATE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighErrorRateLambdaFunction {
    pub region: String,
    pub lambda_function_name: String,
    pub reason: String,
    pub error_rate: f64,
    pub estimated_monthly_savings: i64,
}

pub struct HighErrorRateLambdaFunctions;

impl HighErrorRateLambdaFunctions {
    pub const ID: &'static str = "ckia:aws:cost:HighErrorRateLambdaFunctions";
}

impl Check<Connection> for HighErrorRateLambdaFunctions {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "Lambda Functions with Excessive Timeouts")
                    .with_description(
                        "Checks for Lambda functions with high error rates that might result in higher costs.",
                    )
                    .with_criteria(
                        "Functions where > 10% of invocations end in error on any given day within the last 7 days.",
                    )
                    .with_recommended_action(
                        "Consider the following guidelines to reduce errors. Function errors include errors returned \
                         by the function's code and errors returned by the function's runtime.",
                    )
                    .with_additional_resources(format!(
                        "{}#aws-lambda-functions-with-high-error-rates",
                        TRUSTED_ADVISOR_COST
                    ))
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let functions = conn.list_functions(ctx)?;
        if functions.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let mut flagged = Vec::new();
        for function in &functions {
            let query = |metric: &str| {
                MetricQuery::new("AWS/Lambda", metric, "FunctionName", function.function_name.as_str())
                    .statistic(Statistic::Sum)
                    .period_secs(86_400)
                    .lookback(now, LAMBDA_LOOKBACK_DAYS)
            };

            let invocations = conn.get_metric_statistics(ctx, &query("Invocations"))?;
            if total_sum(&invocations) <= 0.0 {
                continue;
            }
            let errors = conn.get_metric_statistics(ctx, &query("Errors"))?;

            if let Some(rate) = error_rate(&invocations, &errors).filter(|r| *r > LAMBDA_MAX_ERROR_RATE) {
                flagged.push(HighErrorRateLambdaFunction {
                    region: conn.region().to_string(),
                    lambda_function_name: function.function_name.clone(),
                    reason: "HighErrors".to_string(),
                    error_rate: rate,
                    estimated_monthly_savings: 0,
                });
            }
        }

        CheckResult::new(self.describe())
            .with_findings("highErrorRateLambdaFunctions", &flagged)
            .map(Some)
    }
}

/// Percentage of invocations that ended in error; `None` without invocations
pub fn error_rate(invocations: &[Datapoint], errors: &[Datapoint]) -> Option<f64> {
    let invoked = total_sum(invocations);
    if invoked <= 0.0 {
        return None;
    }
    Some(total_sum(errors) / invoked * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AccountSnapshot, MetricSeries, SnapshotConnection};

    fn volume(state: VolumeState) -> Volume {
        Volume {
            volume_id: "vol-02e71c945942481e85".into(),
            volume_type: "gp2".into(),
            size: 8,
            state,
            snapshot_id: Some("snap-0240fe3027dd6b4wa0".into()),
            tags: vec![Tag { key: "Name".into(), value: "MyVolumeName".into() }],
        }
    }

    fn idle_points() -> Vec<Datapoint> {
        (0..7).map(|_| point(0, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_expand_connections_none_found() {
        let (days, found) = expand_connections(&idle_points(), &Utc::now());
        assert!(!found);
        assert_eq!(days, 14);
    }

    #[test]
    fn test_expand_connections_within_seven_days() {
        let mut points = idle_points();
        points.push(point(48, 1.0, 0.0));
        points.push(point(72, 1.0, 0.0));

        let (days, found) = expand_connections(&points, &Utc::now());
        assert!(found);
        assert_eq!(days, 2);
    }

    #[test]
    fn test_expand_connections_after_seven_days() {
        let mut points = idle_points();
        points.push(point(192, 1.0, 0.0));
        points.push(point(240, 1.0, 0.0));

        let (days, found) = expand_connections(&points, &Utc::now());
        assert!(!found);
        assert_eq!(days, 8);
    }

    #[test]
    fn test_expand_underutilized_volume() {
        let finding = expand_underutilized_volume("us-east-1", &volume(VolumeState::Available), &idle_points())
            .unwrap();
        assert_eq!(finding.region, "us-east-1");
        assert_eq!(finding.volume_id, "vol-02e71c945942481e85");
        assert_eq!(finding.volume_name, "MyVolumeName");
        assert_eq!(finding.volume_type, "gp2");
        assert_eq!(finding.volume_size, 8);
        assert_eq!(finding.snapshot_id.as_deref(), Some("snap-0240fe3027dd6b4wa0"));
    }

    #[test]
    fn test_attached_volume_is_not_underutilized() {
        assert!(expand_underutilized_volume("us-east-1", &volume(VolumeState::InUse), &idle_points()).is_none());
    }

    #[test]
    fn test_active_volume_is_not_underutilized() {
        let points = vec![point(1, 5.0, 0.0), point(2, 1.0, 0.0), point(3, 0.0, 0.0)];
        assert!(expand_underutilized_volume("us-east-1", &volume(VolumeState::Available), &points).is_none());
    }

    #[test]
    fn test_expand_snapshot() {
        let now = Utc::now();
        let finding = expand_underutilized_volume("us-east-1", &volume(VolumeState::Available), &[]).unwrap();
        let snapshots = vec![Snapshot {
            snapshot_id: "snap-0240fe3027dd6b4wa0".into(),
            start_time: now - chrono::Duration::days(30),
            tags: vec![Tag { key: "Name".into(), value: "nightly".into() }],
        }];

        let finding = expand_snapshot(&snapshots, finding, &now);
        assert_eq!(finding.snapshot_age, Some(30));
        assert_eq!(finding.snapshot_name.as_deref(), Some("nightly"));

        let untouched = expand_snapshot(&[], finding.clone(), &now);
        assert_eq!(untouched, finding);
    }

    #[test]
    fn test_expand_unassociated_address() {
        let free = Address {
            public_ip: "203.0.113.10".into(),
            allocation_id: Some("eipalloc-1".into()),
            association_id: None,
        };
        let used = Address {
            association_id: Some("eipassoc-1".into()),
            ..free.clone()
        };

        let finding = expand_unassociated_address("us-east-1", &free).unwrap();
        assert_eq!(finding.ip_address, "203.0.113.10");
        assert!(expand_unassociated_address("us-east-1", &used).is_none());
    }

    fn target(state: TargetHealthState) -> TargetHealthDescription {
        TargetHealthDescription {
            target_id: "i-0abc".into(),
            state,
        }
    }

    #[test]
    fn test_target_idle_reason() {
        assert_eq!(target_idle_reason(&[]), Some(IdleReason::NoActiveInstances));
        assert_eq!(
            target_idle_reason(&[target(TargetHealthState::Unhealthy), target(TargetHealthState::Unhealthy)]),
            Some(IdleReason::NoHealthyInstances)
        );
        assert_eq!(
            target_idle_reason(&[target(TargetHealthState::Unhealthy), target(TargetHealthState::Healthy)]),
            None
        );
    }

    #[test]
    fn test_expand_low_request_count() {
        assert_eq!(expand_low_request_count(&[]), Some(IdleReason::LowRequestCount));
        assert_eq!(
            expand_low_request_count(&[point(1, 0.0, 40.0), point(2, 0.0, 100.0)]),
            Some(IdleReason::LowRequestCount)
        );
        assert_eq!(expand_low_request_count(&[point(1, 0.0, 101.0)]), None);
    }

    #[test]
    fn test_idle_reason_wire_names() {
        let json = serde_json::to_string(&IdleReason::NoHealthyInstances).unwrap();
        assert_eq!(json, "\"no healthy back-end instances\"");
    }

    #[test]
    fn test_error_rate_is_fractional() {
        let invocations = vec![point(24, 0.0, 30.0), point(48, 0.0, 30.0)];
        let errors = vec![point(24, 0.0, 7.0)];
        let rate = error_rate(&invocations, &errors).unwrap();
        assert!((rate - 11.666).abs() < 0.01);
        assert!(error_rate(&[], &errors).is_none());
    }

    fn series(namespace: &str, metric: &str, dimension: &str, value: &str, points: Vec<Datapoint>) -> MetricSeries {
        MetricSeries {
            namespace: namespace.into(),
            metric_name: metric.into(),
            dimension_name: dimension.into(),
            dimension_value: value.into(),
            datapoints: points,
        }
    }

    #[test]
    fn test_lambda_check_against_snapshot() {
        let mut account = AccountSnapshot::default();
        account.functions = vec![
            LambdaFunction { function_name: "flaky".into(), runtime: None },
            LambdaFunction { function_name: "steady".into(), runtime: None },
            LambdaFunction { function_name: "unused".into(), runtime: None },
        ];
        account.metrics = vec![
            series("AWS/Lambda", "Invocations", "FunctionName", "flaky", vec![point(24, 0.0, 100.0)]),
            series("AWS/Lambda", "Errors", "FunctionName", "flaky", vec![point(24, 0.0, 25.0)]),
            series("AWS/Lambda", "Invocations", "FunctionName", "steady", vec![point(24, 0.0, 100.0)]),
            series("AWS/Lambda", "Errors", "FunctionName", "steady", vec![point(24, 0.0, 1.0)]),
        ];
        let conn = SnapshotConnection::new("us-east-1", account);
        let conn: &Connection = &conn;

        let result = HighErrorRateLambdaFunctions
            .execute(&ExecutionContext::new(), conn)
            .unwrap()
            .unwrap();
        let flagged = result.findings("highErrorRateLambdaFunctions").unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0]["lambdaFunctionName"], "flaky");
    }

    #[test]
    fn test_idle_db_check_against_snapshot() {
        let mut account = AccountSnapshot::default();
        account.db_instances = vec![
            DbInstance {
                db_instance_identifier: "busy".into(),
                db_instance_class: "db.t3.micro".into(),
                multi_az: false,
                allocated_storage: 20,
            },
            DbInstance {
                db_instance_identifier: "quiet".into(),
                db_instance_class: "db.m5.large".into(),
                multi_az: true,
                allocated_storage: 100,
            },
        ];
        account.metrics = vec![series(
            "AWS/RDS",
            "DatabaseConnections",
            "DBInstanceIdentifier",
            "busy",
            vec![point(5, 3.0, 0.0)],
        )];
        let conn = SnapshotConnection::new("us-east-1", account);
        let conn: &Connection = &conn;

        let result = IdleDbInstances
            .execute(&ExecutionContext::new(), conn)
            .unwrap()
            .unwrap();
        let idle = result.findings("idleDBInstances").unwrap();
        assert_eq!(idle.len(), 1);
        assert_eq!(idle[0]["dbInstanceName"], "quiet");
        assert_eq!(idle[0]["multiAZ"], true);
        assert_eq!(idle[0]["storageProvisionedInGB"], 100);
        assert_eq!(idle[0]["daysSinceLastConnection"], 14);
    }

    fn load_balancer_account(groups: Vec<(&str, Vec<TargetHealthDescription>)>) -> AccountSnapshot {
        let mut account = AccountSnapshot::default();
        account.load_balancers = vec![LoadBalancer {
            load_balancer_arn: "arn:lb/web".into(),
            load_balancer_name: "web".into(),
        }];
        for (arn, targets) in groups {
            account.target_groups.push(TargetGroup {
                target_group_arn: arn.into(),
                load_balancer_arns: vec!["arn:lb/web".into()],
            });
            account.target_health.insert(arn.into(), targets);
        }
        account.metrics = vec![series(
            "AWS/ApplicationELB",
            "RequestCount",
            "LoadBalancer",
            "web",
            vec![point(2, 0.0, 5000.0)],
        )];
        account
    }

    fn idle_reasons(account: AccountSnapshot) -> Vec<serde_json::Value> {
        let conn = SnapshotConnection::new("us-east-1", account);
        let conn: &Connection = &conn;
        let result = IdleLoadBalancers
            .execute(&ExecutionContext::new(), conn)
            .unwrap()
            .unwrap();
        result
            .findings("idleLoadBalancers")
            .unwrap()
            .iter()
            .map(|f| f["reason"].clone())
            .collect()
    }

    #[test]
    fn test_any_empty_target_group_makes_balancer_idle() {
        let account = load_balancer_account(vec![
            ("arn:tg/empty", vec![]),
            ("arn:tg/live", vec![target(TargetHealthState::Healthy)]),
        ]);
        assert_eq!(idle_reasons(account), ["no active back-end instances"]);

        let account = load_balancer_account(vec![
            ("arn:tg/live", vec![target(TargetHealthState::Healthy)]),
            ("arn:tg/sick", vec![target(TargetHealthState::Unhealthy)]),
        ]);
        assert_eq!(idle_reasons(account), ["no healthy back-end instances"]);
    }

    #[test]
    fn test_busy_balancer_with_healthy_groups_is_not_idle() {
        let account = load_balancer_account(vec![
            ("arn:tg/a", vec![target(TargetHealthState::Healthy)]),
            ("arn:tg/b", vec![target(TargetHealthState::Unhealthy), target(TargetHealthState::Healthy)]),
        ]);
        assert!(idle_reasons(account).is_empty());

        assert_eq!(idle_reasons(load_balancer_account(vec![])), ["no active back-end instances"]);
    }

    #[test]
    fn test_checks_without_resources_report_nothing() {
        let conn = SnapshotConnection::new("us-east-1", AccountSnapshot::default());
        let conn: &Connection = &conn;
        let ctx = ExecutionContext::new();
        assert!(IdleDbInstances.execute(&ctx, conn).unwrap().is_none());
        assert!(UnderutilizedEbsVolumes.execute(&ctx, conn).unwrap().is_none());
        assert!(UnassociatedElasticIpAddresses.execute(&ctx, conn).unwrap().is_none());
        assert!(IdleLoadBalancers.execute(&ctx, conn).unwrap().is_none());
        assert!(HighErrorRateLambdaFunctions.execute(&ctx, conn).unwrap().is_none());
    }
}
