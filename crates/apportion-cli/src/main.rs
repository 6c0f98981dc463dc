//! Apportion CLI - Validate and edit percentage allocation tables.
//!
//! # Usage
//!
//! ```bash
//! # Check a stored snapshot against the default sector policy
//! apportion --store ./data validate strategy-42
//!
//! # Per-side totals under the position scaling policy
//! apportion --policy POSITION.SCALING totals strategy-42
//!
//! # Add a row, clamping to what fits, and write it back
//! apportion add strategy-42 --category tech --percentage 35 --clamp --write
//!
//! # Inspect policies
//! apportion policy list
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let default_level = if cli.global.quiet { "error" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = Context::new(&cli.global)?;

    // Execute command
    let result = match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &ctx).await,
        Commands::Show(args) => commands::show::execute(args, &ctx).await,
        Commands::Totals(args) => commands::totals::execute(args, &ctx).await,
        Commands::Available(args) => commands::available::execute(args, &ctx).await,
        Commands::Add(args) => commands::edit::execute_add(args, &ctx).await,
        Commands::Update(args) => commands::edit::execute_update(args, &ctx).await,
        Commands::Remove(args) => commands::edit::execute_remove(args, &ctx).await,
        Commands::Policy(args) => commands::policy::execute(args, &ctx),
    };

    if let Err(err) = &result {
        tracing::debug!(error = ?err, "command failed");
        output::print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
