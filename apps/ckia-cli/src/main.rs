//! ckia CLI
//!
//! Runs cloud account checks and reports their findings by category.

mod commands;
mod interrupt;
mod progress;

use ckia_core::CkiaError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ckia - cloud account check auditor
#[derive(Parser)]
#[command(name = "ckia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Amazon Web Services checks
    #[command(subcommand)]
    Aws(commands::aws::AwsCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Aws(cmd) => commands::aws::run(cmd, cli.config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err.chain().find_map(|e| e.downcast_ref::<CkiaError>());
    match kind {
        Some(CkiaError::Config(_))
        | Some(CkiaError::Parse { .. })
        | Some(CkiaError::DuplicateIdentifier(_)) => 2,
        Some(CkiaError::Connection(_)) => 3,
        Some(CkiaError::Serialization(_)) | Some(CkiaError::Io(_)) => 4,
        _ => 1,
    }
}
