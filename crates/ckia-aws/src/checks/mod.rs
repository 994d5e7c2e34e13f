//! AWS check catalogue

pub mod common;
pub mod cost;
pub mod security;

use crate::connection::Connection;
use ckia_core::{Check, Result};
use ckia_engine::CheckRegistry;
use std::sync::Arc;

/// Every compiled-in AWS check
pub fn catalogue() -> Vec<Arc<dyn Check<Connection>>> {
    vec![
        // Cost checks
        Arc::new(cost::IdleDbInstances),
        Arc::new(cost::UnderutilizedEbsVolumes),
        Arc::new(cost::UnassociatedElasticIpAddresses),
        Arc::new(cost::IdleLoadBalancers),
        Arc::new(cost::HighErrorRateLambdaFunctions),
        // Security checks
        Arc::new(security::RootAccountMissingMfaCheck),
    ]
}

/// Register all AWS checks
pub fn register_checks(registry: &mut CheckRegistry<Connection>) -> Result<()> {
    for check in catalogue() {
        registry.register(check)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AccountSnapshot, SnapshotConnection};
    use ckia_core::{CheckId, ExecutionContext, FailureKind};
    use ckia_engine::AuditPipeline;
    use std::time::{Duration, Instant};

    #[test]
    fn test_every_check_has_a_categorized_id_and_metadata() {
        for check in catalogue() {
            let descriptor = check.describe();
            assert!(
                descriptor.id.category().is_some(),
                "{} has no known category",
                descriptor.id
            );
            assert!(!descriptor.name.is_empty());
            assert!(!descriptor.description.is_empty());
            assert!(!descriptor.criteria.is_empty());
            assert!(!descriptor.recommended_action.is_empty());
            assert!(!descriptor.additional_resources.is_empty());
        }
    }

    #[test]
    fn test_register_checks() {
        let mut registry = CheckRegistry::new();
        register_checks(&mut registry).unwrap();
        assert_eq!(registry.len(), catalogue().len());
        assert!(registry.contains(&CheckId::new(cost::IdleDbInstances::ID)));
        assert!(registry.contains(&CheckId::new(security::RootAccountMissingMfaCheck::ID)));

        // the catalogue cannot be registered twice
        assert!(register_checks(&mut registry).is_err());
    }

    #[test]
    fn test_interrupted_run_still_produces_a_report() {
        let mut registry = CheckRegistry::new();
        register_checks(&mut registry).unwrap();

        let account = AccountSnapshot {
            latency_ms: Some(300),
            ..AccountSnapshot::default()
        };
        let conn = SnapshotConnection::new("us-east-1", account);
        let conn: &Connection = &conn;

        let ctx = ExecutionContext::new();
        let interrupt = ctx.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            interrupt.cancel();
        });

        let started = Instant::now();
        let aggregate = AuditPipeline::new(&registry)
            .parallelism(1)
            .run(&ctx, conn)
            .unwrap();
        canceller.join().unwrap();

        assert!(started.elapsed() < Duration::from_millis(1200));
        assert!(aggregate.report.is_empty());
        assert_eq!(aggregate.summary.failed, catalogue().len());
        assert!(aggregate
            .errors
            .iter()
            .all(|f| f.kind == FailureKind::Cancelled));
    }
}
