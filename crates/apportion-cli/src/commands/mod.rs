//! CLI command implementations.

pub mod available;
pub mod edit;
pub mod policy;
pub mod show;
pub mod totals;
pub mod validate;

// Re-export submodules for convenience
pub use available::AvailableArgs;
pub use edit::{AddArgs, RemoveArgs, UpdateArgs};
pub use policy::PolicyArgs;
pub use show::ShowArgs;
pub use totals::TotalsArgs;
pub use validate::ValidateArgs;

use serde::Serialize;
use tabled::Tabled;

use apportion_config::{PolicyConfig, PolicyRegistry};
use apportion_core::{
    AllocationRecord, AllocationSet, AllocationSnapshot, AllocationStore, Category, LoadedSet,
    Violation,
};
use apportion_ext_file::JsonFileStore;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output::{format_opt, format_percent, print_info, print_output, print_single, print_success};

// =============================================================================
// COMMAND CONTEXT
// =============================================================================

/// Everything a command needs besides its own arguments.
pub struct Context {
    /// Output format.
    pub format: OutputFormat,
    /// Suppress status lines.
    pub quiet: bool,
    /// Registered policies.
    pub registry: PolicyRegistry,
    policy_name: String,
    store: JsonFileStore,
}

impl Context {
    /// Builds the context from global flags, loading the extra policy file if given.
    pub fn new(global: &GlobalArgs) -> CliResult<Self> {
        let registry = PolicyRegistry::new();
        if let Some(path) = &global.policies {
            let count = registry.load_file(path)?;
            tracing::debug!(path = %path.display(), count, "loaded policy file");
        }

        Ok(Self {
            format: global.format,
            quiet: global.quiet,
            registry,
            policy_name: global.policy.clone(),
            store: JsonFileStore::new(&global.store),
        })
    }

    /// The selected policy.
    pub fn policy(&self) -> CliResult<PolicyConfig> {
        Ok(self.registry.get(&self.policy_name)?)
    }

    /// Fetches an entity and validates it against the selected policy.
    pub async fn load<C: Category>(
        &self,
        entity: &str,
        config: &PolicyConfig,
    ) -> CliResult<LoadedSet<C>> {
        let rows = self.store.fetch(entity).await?;
        let loaded = AllocationSet::<C>::from_wire(config.policy.clone(), rows)?;

        tracing::debug!(
            entity,
            policy = %config.name,
            records = loaded.set.len(),
            violations = loaded.violations.len(),
            "snapshot loaded"
        );
        if !loaded.is_clean() {
            tracing::warn!(entity, violations = loaded.violations.len(), "snapshot violates policy");
        }
        Ok(loaded)
    }

    /// Submits a set for an entity.
    pub async fn submit<C: Category>(&self, entity: &str, set: &AllocationSet<C>) -> CliResult<()> {
        self.store.submit(entity, &set.to_wire()).await?;
        tracing::info!(entity, records = set.len(), "allocations submitted");
        Ok(())
    }

    /// Prints a status line unless quiet or producing machine output.
    pub fn status(&self, print: fn(&str), message: &str) {
        if !self.quiet && self.format == OutputFormat::Table {
            print(message);
        }
    }
}

// =============================================================================
// SHARED ROWS
// =============================================================================

/// One allocation record for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Code")]
    pub code: u16,
    #[tabled(rename = "Percentage")]
    pub percentage: String,
    #[tabled(rename = "Position")]
    pub position_type: String,
    #[tabled(rename = "Min Assets")]
    pub min_assets: String,
    #[tabled(rename = "Partition")]
    pub partition: String,
}

impl RecordRow {
    /// Builds the row of one record in a set.
    pub fn new<C: Category>(set: &AllocationSet<C>, record: &AllocationRecord<C>) -> Self {
        Self {
            id: record.id.to_string(),
            category: record.category.name().to_string(),
            code: record.category.code(),
            percentage: format_percent(record.percentage),
            position_type: format_opt(record.position_type),
            min_assets: format_opt(record.min_assets),
            partition: set.partition_of(record).to_string(),
        }
    }

    /// Builds rows for every record of a set.
    pub fn all<C: Category>(set: &AllocationSet<C>) -> Vec<Self> {
        set.iter().map(|r| Self::new(set, r)).collect()
    }
}

/// One violation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ViolationRow {
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Detail")]
    pub detail: String,
}

impl ViolationRow {
    /// Builds the row of one violation.
    pub fn new<C: Category>(violation: &Violation<C>) -> Self {
        Self {
            rule: violation.rule().to_string(),
            detail: violation.to_string(),
        }
    }
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Parses a category of catalog `C` by code, name or short code.
pub fn parse_category<C: Category>(input: &str, config: &PolicyConfig) -> CliResult<C> {
    C::parse(input).ok_or_else(|| CliError::UnknownCategory {
        catalog: config.catalog.to_string(),
        input: input.to_string(),
    })
}

/// Prints the violations of a loaded set.
pub fn print_violations<C: Category>(violations: &[Violation<C>], format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<ViolationRow> = violations.iter().map(ViolationRow::new).collect();
    print_output(&rows, format)
}

/// Fails if a loaded snapshot already breaks the policy.
pub fn ensure_clean<C: Category>(
    entity: &str,
    loaded: &LoadedSet<C>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if loaded.is_clean() {
        return Ok(());
    }
    print_violations(&loaded.violations, format)?;
    Err(CliError::InvalidSnapshot {
        entity: entity.to_string(),
        count: loaded.violations.len(),
    }
    .into())
}

/// Prints the edited set and submits it when `write` is set.
pub async fn finish_edit<C: Category>(
    ctx: &Context,
    entity: &str,
    set: &AllocationSet<C>,
    write: bool,
) -> anyhow::Result<()> {
    match ctx.format {
        OutputFormat::Json => print_single(&AllocationSnapshot::from_set(entity, set), ctx.format)?,
        _ => print_output(&RecordRow::all(set), ctx.format)?,
    }

    if write {
        ctx.submit(entity, set).await?;
        ctx.status(print_success, &format!("Wrote {} record(s) for {}", set.len(), entity));
    } else {
        ctx.status(print_info, "Dry run, pass --write to submit");
    }
    Ok(())
}
