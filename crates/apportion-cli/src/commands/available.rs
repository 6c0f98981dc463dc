//! Available command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use apportion_config::{Catalog, PolicyConfig};
use apportion_core::{AssetClass, Category, RecordId, Sector};

use super::Context;
use crate::output::{print_output, print_warning};

/// Arguments for the available command.
#[derive(Args, Debug)]
pub struct AvailableArgs {
    /// Entity to inspect
    pub entity: String,

    /// Record being edited; its own category stays available
    #[arg(long)]
    pub excluding: Option<String>,
}

/// One selectable category.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CategoryRow {
    #[tabled(rename = "Code")]
    pub code: u16,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Short")]
    pub short_code: String,
}

impl CategoryRow {
    fn new<C: Category>(category: C) -> Self {
        Self {
            code: category.code(),
            name: category.name().to_string(),
            short_code: category.short_code().to_string(),
        }
    }
}

/// Executes the available command.
pub async fn execute(args: AvailableArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => run::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => run::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn run<C: Category>(args: &AvailableArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let loaded = ctx.load::<C>(&args.entity, config).await?;
    let excluding = args.excluding.as_deref().map(RecordId::new);

    if let Some(id) = &excluding {
        if !loaded.set.contains(id) {
            ctx.status(print_warning, &format!("No record '{id}' in {}", args.entity));
        }
    }

    let rows: Vec<CategoryRow> = loaded
        .set
        .available_categories(excluding.as_ref())
        .into_iter()
        .map(CategoryRow::new)
        .collect();

    if rows.is_empty() {
        ctx.status(print_warning, "All categories are already allocated");
    }
    print_output(&rows, ctx.format)
}
