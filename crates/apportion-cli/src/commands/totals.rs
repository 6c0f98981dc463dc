//! Totals command implementation.
//!
//! Shows how much of each partition is allocated and how much is left.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use apportion_config::{Catalog, PolicyConfig};
use apportion_core::{AllocationSet, AssetClass, Category, Sector};

use super::Context;
use crate::output::{format_opt, format_percent, print_output};

/// Arguments for the totals command.
#[derive(Args, Debug)]
pub struct TotalsArgs {
    /// Entity whose totals are shown
    pub entity: String,
}

/// Allocation of one partition.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PartitionRow {
    #[tabled(rename = "Partition")]
    pub partition: String,
    #[tabled(rename = "Records")]
    pub records: usize,
    #[tabled(rename = "Record Cap")]
    pub record_cap: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
}

/// Executes the totals command.
pub async fn execute(args: TotalsArgs, ctx: &Context) -> Result<()> {
    let config = ctx.policy()?;
    match config.catalog {
        Catalog::Sector => run::<Sector>(&args, ctx, &config).await,
        Catalog::AssetClass => run::<AssetClass>(&args, ctx, &config).await,
    }
}

async fn run<C: Category>(args: &TotalsArgs, ctx: &Context, config: &PolicyConfig) -> Result<()> {
    let loaded = ctx.load::<C>(&args.entity, config).await?;
    print_output(&partition_rows(&loaded.set), ctx.format)
}

fn partition_rows<C: Category>(set: &AllocationSet<C>) -> Vec<PartitionRow> {
    set.totals_by_partition()
        .into_iter()
        .map(|(key, total)| PartitionRow {
            partition: key.to_string(),
            records: set.iter().filter(|r| set.partition_of(r) == key).count(),
            record_cap: format_opt(set.policy().record_caps.cap_for(&key)),
            total: format_percent(total),
            remaining: format_percent(set.remaining_for(&key)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apportion_core::{AllocationPolicy, AllocationRecord, PartitionKey, PositionType};
    use rust_decimal::Decimal;

    #[test]
    fn test_partition_rows() {
        let policy = AllocationPolicy::position_scaling()
            .with_partition_cap(PartitionKey::Side(PositionType::Long), 2);
        let mut set = AllocationSet::new(policy);
        set.add(
            AllocationRecord::new("a", AssetClass::Equity, Decimal::new(60, 0))
                .with_position_type(PositionType::Long),
        )
        .unwrap();
        set.add(
            AllocationRecord::new("b", AssetClass::Bond, Decimal::new(25, 0))
                .with_position_type(PositionType::Short),
        )
        .unwrap();

        let rows = partition_rows(&set);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].partition, "long");
        assert_eq!(rows[0].records, 1);
        assert_eq!(rows[0].record_cap, "2");
        assert_eq!(rows[0].remaining, "40%");
        assert_eq!(rows[1].partition, "short");
        assert_eq!(rows[1].record_cap, "-");
        assert_eq!(rows[1].total, "25%");
    }

    #[test]
    fn test_empty_global_partition_listed() {
        let set = AllocationSet::<Sector>::new(AllocationPolicy::sector_diversification());
        let rows = partition_rows(&set);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].partition, "all");
        assert_eq!(rows[0].remaining, "100%");
    }
}
