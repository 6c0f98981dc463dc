//! Validate command implementation.
//!
//! Re-checks a stored snapshot against the selected policy.

use anyhow::Result;
use clap::Args;

use apportion_config::{Catalog, PolicyConfig};
use apportion_core::{AssetClass, Category, Sector};

use super::{print_violations, Context, ViolationRow};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{print_output, print_success};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Entity whose snapshot is checked
    pub entity: String,
}

/// Executes the validate command.
pub async fn execute(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => run::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => run::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn run<C: Category>(args: &ValidateArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let loaded = ctx.load::<C>(&args.entity, config).await?;

    if loaded.is_clean() {
        if ctx.format == OutputFormat::Table {
            ctx.status(
                print_success,
                &format!(
                    "{} is valid under {} ({} record(s))",
                    args.entity,
                    config.name,
                    loaded.set.len()
                ),
            );
        } else {
            print_output::<ViolationRow>(&[], ctx.format)?;
        }
        return Ok(());
    }

    print_violations(&loaded.violations, ctx.format)?;
    Err(CliError::InvalidSnapshot {
        entity: args.entity.clone(),
        count: loaded.violations.len(),
    }
    .into())
}
