//! Policy command implementation.
//!
//! Lists and inspects the registered allocation policies.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use apportion_config::PolicyConfig;

use super::Context;
use crate::cli::OutputFormat;
use crate::output::{format_opt, format_percent, print_header, print_output, print_single, KeyValue};

/// Arguments for the policy command.
#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

/// Policy subcommands.
#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// List registered policies
    List,

    /// Show one policy in detail
    Show(ShowPolicyArgs),
}

/// Arguments for the show subcommand.
#[derive(Args, Debug)]
pub struct ShowPolicyArgs {
    /// Policy name
    pub name: String,
}

/// Summary of one policy.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PolicyRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Catalog")]
    pub catalog: String,
    #[tabled(rename = "Unique")]
    pub unique: bool,
    #[tabled(rename = "Partition By")]
    pub partition_by: String,
    #[tabled(rename = "Max")]
    pub max_percentage: String,
    #[tabled(rename = "Read Only")]
    pub read_only: bool,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&PolicyConfig> for PolicyRow {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            name: config.name.clone(),
            catalog: config.catalog.to_string(),
            unique: config.policy.require_unique_category,
            partition_by: config.policy.partition_by.to_string(),
            max_percentage: format_percent(config.policy.max_percentage),
            read_only: config.read_only,
            description: config.description.clone().unwrap_or_default(),
        }
    }
}

/// Executes the policy command.
pub fn execute(args: PolicyArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PolicyCommand::List => list(ctx),
        PolicyCommand::Show(show_args) => show(&show_args, ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let rows: Vec<PolicyRow> = ctx.registry.list()?.iter().map(PolicyRow::from).collect();
    print_output(&rows, ctx.format)
}

fn show(args: &ShowPolicyArgs, ctx: &Context) -> Result<()> {
    let config = ctx.registry.get(&args.name)?;

    if ctx.format == OutputFormat::Json {
        return print_single(&config, ctx.format);
    }

    let caps = &config.policy.record_caps;
    let mut rows = vec![
        KeyValue::new("Name", config.name.as_str()),
        KeyValue::new("Description", config.description.clone().unwrap_or_default()),
        KeyValue::new("Catalog", config.catalog.to_string()),
        KeyValue::new("Unique Category", config.policy.require_unique_category.to_string()),
        KeyValue::new("Partition By", config.policy.partition_by.to_string()),
        KeyValue::new("Max Percentage", format_percent(config.policy.max_percentage)),
        KeyValue::new("Default Record Cap", format_opt(caps.default)),
    ];
    for (key, cap) in &caps.per_partition {
        rows.push(KeyValue::new(format!("Record Cap [{key}]"), cap.to_string()));
    }
    rows.push(KeyValue::new("Read Only", config.read_only.to_string()));
    rows.push(KeyValue::new("Updated", config.updated_at.to_rfc3339()));
    print_output(&rows, ctx.format)?;

    if ctx.format == OutputFormat::Table && !ctx.quiet {
        print_header("Categories");
        let categories: Vec<KeyValue> = config
            .catalog
            .entries()
            .into_iter()
            .map(|(code, name)| KeyValue::new(code.to_string(), name))
            .collect();
        print_output(&categories, ctx.format)?;
    }
    Ok(())
}
