use ckia_core::{
    Check, CheckDescriptor, CheckId, CheckResult, CkiaError, ExecutionContext, FailureKind,
    Report, Result,
};
use ckia_engine::{format_json, AuditPipeline, CheckRegistry, RunRequest};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// In-memory account: check id → number of findings, or None to fail
struct Account {
    findings: BTreeMap<&'static str, Option<usize>>,
}

struct Fixed(&'static str);

impl Check<Account> for Fixed {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor::new(self.0, self.0)
            .with_description("fixed test check")
            .with_recommended_action("none")
    }

    fn execute(&self, ctx: &ExecutionContext, account: &Account) -> Result<Option<CheckResult>> {
        ctx.checkpoint()?;
        match account.findings.get(self.0) {
            Some(Some(n)) => {
                let items: Vec<String> = (0..*n).map(|i| format!("resource-{}", i)).collect();
                CheckResult::new(self.describe())
                    .with_findings("resources", &items)
                    .map(Some)
            }
            Some(None) => Err(CkiaError::provider("EC2", "RequestLimitExceeded")),
            None => Ok(None),
        }
    }
}

const IDS: [&str; 5] = [
    "x:aws:cost:C1",
    "x:aws:security:C2",
    "x:aws:cost:C3",
    "x:aws:performance:C4",
    "x:aws:mystery:C5",
];

fn registry() -> CheckRegistry<Account> {
    let mut registry = CheckRegistry::new();
    for id in IDS {
        registry.register(Arc::new(Fixed(id))).unwrap();
    }
    registry
}

fn account() -> Account {
    Account {
        findings: BTreeMap::from([
            ("x:aws:cost:C1", Some(2)),
            ("x:aws:security:C2", Some(1)),
            ("x:aws:cost:C3", None),
            ("x:aws:performance:C4", Some(0)),
            ("x:aws:mystery:C5", Some(3)),
        ]),
    }
}

#[test]
fn test_full_run_isolates_the_failing_check() {
    let registry = registry();
    let aggregate = AuditPipeline::new(&registry)
        .parallelism(4)
        .run(&ExecutionContext::new(), &account())
        .unwrap();

    assert_eq!(aggregate.summary.total, 5);
    assert_eq!(aggregate.summary.failed, 1);
    assert_eq!(aggregate.errors.len(), 1);
    assert_eq!(aggregate.errors[0].check_id, CheckId::new("x:aws:cost:C3"));
    assert_eq!(aggregate.errors[0].kind, FailureKind::Provider);

    assert_eq!(aggregate.report.cost_optimization.len(), 1);
    assert_eq!(aggregate.report.security.len(), 1);
    assert!(aggregate.report.performance.is_empty());
    assert_eq!(aggregate.summary.no_findings, 1);

    assert_eq!(aggregate.summary.dropped, 1);
    assert!(aggregate.diagnostics[0].contains("x:aws:mystery:C5"));
}

#[test]
fn test_filters_restrict_the_run() {
    let registry = registry();
    let aggregate = AuditPipeline::new(&registry)
        .request(RunRequest::all().include(["x:aws:cost:C1", "x:aws:cost:C3"]))
        .run(&ExecutionContext::new(), &account())
        .unwrap();
    assert_eq!(aggregate.summary.total, 2);
    assert!(aggregate.report.security.is_empty());

    let aggregate = AuditPipeline::new(&registry)
        .request(RunRequest::all().exclude(["x:aws:cost:C3"]))
        .run(&ExecutionContext::new(), &account())
        .unwrap();
    assert_eq!(aggregate.summary.total, 4);
    assert!(aggregate.errors.is_empty());
}

#[test]
fn test_same_request_twice_gives_equal_reports() {
    let registry = registry();
    let account = account();
    let run = || {
        AuditPipeline::new(&registry)
            .parallelism(3)
            .include_empty(true)
            .run(&ExecutionContext::new(), &account)
            .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.report, second.report);
    assert_eq!(
        format_json(&first.report).unwrap(),
        format_json(&second.report).unwrap()
    );
    assert_eq!(first.report.performance.len(), 1);
}

#[test]
fn test_cancelled_run_fails_every_check() {
    let registry = registry();
    let ctx = ExecutionContext::new();
    ctx.cancel();

    let aggregate = AuditPipeline::new(&registry).run(&ctx, &account()).unwrap();
    assert!(aggregate.report.is_empty());
    assert_eq!(aggregate.errors.len(), 5);
    assert!(aggregate.errors.iter().all(|e| e.kind == FailureKind::Cancelled));
}

#[test]
fn test_expired_deadline_fails_every_check() {
    let registry = registry();
    let ctx = ExecutionContext::new().with_deadline(Instant::now());

    let aggregate = AuditPipeline::new(&registry).run(&ctx, &account()).unwrap();
    assert_eq!(aggregate.errors.len(), 5);
    assert!(aggregate.errors.iter().all(|e| e.kind == FailureKind::Timeout));
}

#[test]
fn test_report_round_trips_through_json() {
    let registry = registry();
    let aggregate = AuditPipeline::new(&registry)
        .run(&ExecutionContext::new(), &account())
        .unwrap();

    let json = format_json(&aggregate.report).unwrap();
    assert_eq!(Report::from_json(&json).unwrap(), aggregate.report);
}
