//! Edit command implementations: add, update, remove.
//!
//! Each command loads the stored snapshot, applies one edit in memory and
//! prints the result. Nothing is written without `--write`.

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use apportion_config::{Catalog, PolicyConfig};
use apportion_core::{
    AllocationPatch, AllocationRecord, AssetClass, Category, ClampNotice, PositionType, RecordId,
    Sector,
};

use super::{ensure_clean, finish_edit, parse_category, Context};
use crate::error::{CliError, CliResult};
use crate::output::print_warning;

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Entity to edit
    pub entity: String,

    /// Category code, name or short code
    #[arg(long)]
    pub category: String,

    /// Percentage to allocate
    #[arg(long)]
    pub percentage: Decimal,

    /// Position side (long or short)
    #[arg(long)]
    pub position_type: Option<PositionType>,

    /// Minimum number of assets for this category
    #[arg(long)]
    pub min_assets: Option<u32>,

    /// Record ID (generated if omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Reduce the percentage to what fits instead of failing
    #[arg(long)]
    pub clamp: bool,

    /// Submit the edited snapshot
    #[arg(long)]
    pub write: bool,
}

/// Arguments for the update command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Entity to edit
    pub entity: String,

    /// Record to update
    #[arg(long)]
    pub id: String,

    /// New category code, name or short code
    #[arg(long)]
    pub category: Option<String>,

    /// New percentage
    #[arg(long)]
    pub percentage: Option<Decimal>,

    /// New position side (long or short)
    #[arg(long, conflicts_with = "clear_position_type")]
    pub position_type: Option<PositionType>,

    /// Drop the position side, moving the record to the unassigned partition
    #[arg(long)]
    pub clear_position_type: bool,

    /// New minimum number of assets
    #[arg(long)]
    pub min_assets: Option<u32>,

    /// Reduce the percentage to what fits instead of failing
    #[arg(long)]
    pub clamp: bool,

    /// Submit the edited snapshot
    #[arg(long)]
    pub write: bool,
}

/// Arguments for the remove command.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Entity to edit
    pub entity: String,

    /// Record to remove
    #[arg(long)]
    pub id: String,

    /// Submit the edited snapshot
    #[arg(long)]
    pub write: bool,
}

// =============================================================================
// ADD
// =============================================================================

/// Executes the add command.
pub async fn execute_add(args: AddArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => add::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => add::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn add<C: Category>(args: &AddArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let mut loaded = ctx.load::<C>(&args.entity, config).await?;
    ensure_clean(&args.entity, &loaded, ctx.format)?;

    let record = build_record::<C>(args, config)?;
    tracing::debug!(entity = %args.entity, id = %record.id, "adding record");

    if args.clamp {
        let notice = loaded.set.add_clamped(record).map_err(CliError::from)?;
        report_clamp(ctx, notice);
    } else {
        loaded.set.add(record).map_err(CliError::from)?;
    }

    finish_edit(ctx, &args.entity, &loaded.set, args.write).await
}

fn build_record<C: Category>(args: &AddArgs, config: &PolicyConfig) -> CliResult<AllocationRecord<C>> {
    let category = parse_category::<C>(&args.category, config)?;
    let id = args
        .id
        .as_deref()
        .map_or_else(RecordId::generate, RecordId::new);

    let mut record = AllocationRecord::new(id, category, args.percentage);
    if let Some(side) = args.position_type {
        record = record.with_position_type(side);
    }
    if let Some(min_assets) = args.min_assets {
        record = record.with_min_assets(min_assets);
    }
    Ok(record)
}

// =============================================================================
// UPDATE
// =============================================================================

/// Executes the update command.
pub async fn execute_update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => update::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => update::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn update<C: Category>(args: &UpdateArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let mut loaded = ctx.load::<C>(&args.entity, config).await?;
    ensure_clean(&args.entity, &loaded, ctx.format)?;

    let patch = build_patch::<C>(args, config)?;
    let id = RecordId::new(args.id.as_str());
    tracing::debug!(entity = %args.entity, id = %id, "updating record");

    if args.clamp {
        let notice = loaded.set.update_clamped(&id, &patch).map_err(CliError::from)?;
        report_clamp(ctx, notice);
    } else {
        loaded.set.update(&id, &patch).map_err(CliError::from)?;
    }

    finish_edit(ctx, &args.entity, &loaded.set, args.write).await
}

fn build_patch<C: Category>(args: &UpdateArgs, config: &PolicyConfig) -> CliResult<AllocationPatch<C>> {
    let mut patch = AllocationPatch::new();
    if let Some(input) = &args.category {
        patch = patch.category(parse_category::<C>(input, config)?);
    }
    if let Some(percentage) = args.percentage {
        patch = patch.percentage(percentage);
    }
    if let Some(side) = args.position_type {
        patch = patch.position_type(side);
    }
    if args.clear_position_type {
        patch = patch.clear_position_type();
    }
    if let Some(min_assets) = args.min_assets {
        patch = patch.min_assets(min_assets);
    }

    if patch.is_empty() {
        return Err(CliError::MissingArgument(
            "one of --category, --percentage, --position-type, --clear-position-type, --min-assets"
                .to_string(),
        ));
    }
    Ok(patch)
}

// =============================================================================
// REMOVE
// =============================================================================

/// Executes the remove command.
///
/// Removal is allowed on a snapshot that already breaks the policy, since it
/// can only reduce totals and counts.
pub async fn execute_remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => remove::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => remove::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn remove<C: Category>(args: &RemoveArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let mut loaded = ctx.load::<C>(&args.entity, config).await?;
    let id = RecordId::new(args.id.as_str());

    if loaded.set.remove(&id).is_none() {
        ctx.status(print_warning, &format!("No record '{id}' in {}", args.entity));
    }

    let remaining = loaded.set.validate();
    if !remaining.is_empty() {
        ctx.status(
            print_warning,
            &format!("{} violation(s) remain after removal", remaining.len()),
        );
    }

    finish_edit(ctx, &args.entity, &loaded.set, args.write).await
}

fn report_clamp(ctx: &Context, notice: Option<ClampNotice>) {
    if let Some(notice) = notice {
        tracing::info!(
            id = %notice.id,
            requested = %notice.requested,
            applied = %notice.applied,
            "percentage clamped"
        );
        ctx.status(print_warning, &notice.to_string());
    }
}
