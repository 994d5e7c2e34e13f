//! Run checks against an account

use crate::progress::LogProgress;
use ckia_aws::{Connection, Session};
use ckia_core::{Config, ExecutionContext};
use ckia_engine::{format_failures, write_report, AuditPipeline, RunRequest};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Args)]
pub struct CheckArgs {
    /// Only run these checks
    #[arg(short = 'i', long, value_delimiter = ',')]
    include_checks: Vec<String>,

    /// Skip these checks (ignored when --include-checks is given)
    #[arg(short = 'e', long, value_delimiter = ',')]
    exclude_checks: Vec<String>,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long)]
    out_file: Option<PathBuf>,

    /// Report format (json)
    #[arg(short = 'f', long)]
    out_format: Option<String>,

    /// Account snapshot to audit
    #[arg(short = 's', long)]
    snapshot: Option<PathBuf>,

    /// Region to audit
    #[arg(long)]
    region: Option<String>,

    /// Maximum number of checks running at once
    #[arg(short = 'p', long)]
    parallelism: Option<usize>,

    /// Deadline for the whole run, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep results that found nothing
    #[arg(long)]
    include_empty: bool,
}

impl CheckArgs {
    /// Overlay command-line flags on the loaded configuration
    fn apply(self, config: &mut Config) {
        if !self.include_checks.is_empty() {
            config.checks.include = self.include_checks;
        }
        if !self.exclude_checks.is_empty() {
            config.checks.exclude = self.exclude_checks;
        }
        if let Some(out_file) = self.out_file {
            config.general.out_file = Some(out_file);
        }
        if let Some(format) = self.out_format {
            config.general.output_format = format;
        }
        if let Some(snapshot) = self.snapshot {
            config.aws.snapshot = Some(snapshot);
        }
        if let Some(region) = self.region {
            config.aws.region = Some(region);
        }
        if let Some(parallelism) = self.parallelism {
            config.general.parallelism = parallelism;
        }
        if let Some(timeout) = self.timeout {
            config.general.timeout_secs = Some(timeout);
        }
        if self.include_empty {
            config.general.include_empty = true;
        }
    }
}

pub fn run(args: CheckArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);

    // Validated before any provider connection
    let format = config.validate()?;
    let request = RunRequest::from_filters(&config.checks.include, &config.checks.exclude)?;
    let registry = ckia_aws::build_registry()?;

    let session = Session::resolve(&config.aws)?;
    let conn = session.connect()?;
    let conn: &Connection = &conn;

    let ctx = match config.timeout() {
        Some(timeout) => ExecutionContext::new().with_timeout(timeout),
        None => ExecutionContext::new(),
    };
    crate::interrupt::cancel_on_interrupt(ctx.cancellation().clone());

    info!(
        "Running {} check(s) in {} with {} worker(s), {} output",
        if request.is_unfiltered() { "all" } else { "selected" },
        session.region(),
        config.general.parallelism,
        format
    );

    let started = Instant::now();
    let aggregate = AuditPipeline::new(&registry)
        .request(request)
        .parallelism(config.general.parallelism)
        .include_empty(config.general.include_empty)
        .progress(Arc::new(LogProgress::default()))
        .run(&ctx, conn)?;

    if ctx.is_cancelled() {
        warn!("Run was interrupted; the report is partial");
    }
    if aggregate.has_errors() {
        eprint!("{}", format_failures(&aggregate.errors));
    }

    write_report(&aggregate.report, config.general.out_file.as_deref())?;

    if let Some(path) = &config.general.out_file {
        info!("Report written to {}", path.display());
    }
    info!(
        "{} check(s) in {:.2}s: {} with findings, {} without, {} failed",
        aggregate.summary.total,
        started.elapsed().as_secs_f64(),
        aggregate.summary.with_findings,
        aggregate.summary.no_findings,
        aggregate.summary.failed
    );
    Ok(())
}
