//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{
    AddArgs, AvailableArgs, PolicyArgs, RemoveArgs, ShowArgs, TotalsArgs, UpdateArgs,
    ValidateArgs,
};

/// Apportion - Validate and edit percentage allocation tables
#[derive(Parser)]
#[command(name = "apportion")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding one <ENTITY>.json snapshot per entity
    #[arg(long, env = "APPORTION_STORE", default_value = ".", global = true)]
    pub store: PathBuf,

    /// Extra TOML policy file
    #[arg(long, env = "APPORTION_POLICIES", global = true)]
    pub policies: Option<PathBuf>,

    /// Policy to enforce
    #[arg(
        short,
        long,
        env = "APPORTION_POLICY",
        default_value = "SECTOR.DIVERSIFICATION",
        global = true
    )]
    pub policy: String,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check a stored snapshot against the policy
    Validate(ValidateArgs),

    /// List the records of a stored snapshot
    Show(ShowArgs),

    /// Show per-partition totals and remaining headroom
    Totals(TotalsArgs),

    /// List categories that can still be allocated
    Available(AvailableArgs),

    /// Add a record
    Add(AddArgs),

    /// Update fields of a record
    Update(UpdateArgs),

    /// Remove a record
    Remove(RemoveArgs),

    /// Inspect configured policies
    Policy(PolicyArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
