//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tm_core::Version;

/// Tidemark - versioned database schema migrations
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path (":memory:" for a scratch database)
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Upgrade(UpgradeArgs),

    /// Show applied, pending, and failed migrations
    Status(StatusArgs),

    /// Record migrations as applied without running them
    MarkApplied(MarkAppliedArgs),

    /// Parse pending migrations without touching the database
    Check(CheckArgs),
}

/// Arguments for the upgrade command
#[derive(Args, Debug, Default)]
pub struct UpgradeArgs {
    /// Print the SQL a live run would execute instead of running it
    #[arg(long, alias = "sqlOnly")]
    pub sql_only: bool,

    /// Choose what to do with each pending migration
    #[arg(short, long)]
    pub interactive: bool,

    /// Elevated user for the connection
    #[arg(long, alias = "rootUser")]
    pub root_user: Option<String>,

    /// Password for the elevated user
    #[arg(long, alias = "rootPass")]
    pub root_pass: Option<String>,

    /// Start from this version instead of inferring it from the ledger
    #[arg(long, alias = "fromVersion")]
    pub from_version: Option<Version>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Start from this version instead of inferring it from the ledger
    #[arg(long, alias = "fromVersion")]
    pub from_version: Option<Version>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the mark-applied command
#[derive(Args, Debug)]
pub struct MarkAppliedArgs {
    /// Short names of the migrations, e.g. 10.0/001-add-index.sql
    #[arg(required = true)]
    pub short_names: Vec<String>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Start from this version instead of inferring it from the ledger
    #[arg(long, alias = "fromVersion")]
    pub from_version: Option<Version>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
