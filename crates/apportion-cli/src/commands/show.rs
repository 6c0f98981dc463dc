//! Show command implementation.

use anyhow::Result;
use clap::Args;

use apportion_config::{Catalog, PolicyConfig};
use apportion_core::{AllocationSnapshot, AssetClass, Category, Sector};

use super::{Context, RecordRow};
use crate::cli::OutputFormat;
use crate::output::{print_output, print_single, print_warning};

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Entity whose records are listed
    pub entity: String,
}

/// Executes the show command.
pub async fn execute(args: ShowArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => run::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => run::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn run<C: Category>(args: &ShowArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let loaded = ctx.load::<C>(&args.entity, config).await?;

    match ctx.format {
        OutputFormat::Json => {
            print_single(&AllocationSnapshot::from_set(&args.entity, &loaded.set), ctx.format)?
        }
        _ => print_output(&RecordRow::all(&loaded.set), ctx.format)?,
    }

    if !loaded.is_clean() {
        ctx.status(
            print_warning,
            &format!(
                "{} violation(s), run `apportion validate {}` for details",
                loaded.violations.len(),
                args.entity
            ),
        );
    }
    Ok(())
}
