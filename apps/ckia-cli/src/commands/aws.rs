//! AWS commands

use super::{check, list};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum AwsCommands {
    /// List available checks
    List(list::ListArgs),

    /// Run checks against an account
    Check(check::CheckArgs),
}

pub fn run(cmd: AwsCommands, config: Option<&Path>) -> anyhow::Result<()> {
    match cmd {
        AwsCommands::List(args) => list::run(args),
        AwsCommands::Check(args) => check::run(args, config),
    }
}
