//! CLI surface: clap definitions plus command execution.
//!
//! The generators themselves know nothing about flags or files; this module
//! wires configuration, the random source, and the pipeline together and
//! renders the run report.

use crate::catalog::PlanCatalog;
use crate::config::{ConfigLoader, GenerationConfig};
use crate::pipeline::{self, RunSummary};
use crate::random;
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// saasgen CLI - synthetic SaaS subscription dataset generator
#[derive(Parser)]
#[command(name = "saasgen")]
#[command(about = "Synthetic SaaS subscription dataset generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and export the dataset as JSON
    Generate {
        /// Number of users to seed (overrides config)
        #[arg(long)]
        users: Option<usize>,

        /// RNG seed for a reproducible run (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for the JSON record sets
        #[arg(long, default_value = "dataset")]
        output: PathBuf,
    },
    /// Print the plan catalog
    Plans {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(long, default_value = "saasgen.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the parsed command, returning the text to print on success
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    match &cli.command {
        Commands::Generate {
            users,
            seed,
            output,
        } => generate(cli, *users, *seed, output),
        Commands::Plans { format } => render_catalog(&PlanCatalog::standard(), format),
        Commands::InitConfig { path, force } => init_config(path, *force),
    }
}

fn generate(
    cli: &Cli,
    users: Option<usize>,
    seed: Option<u64>,
    output: &Path,
) -> anyhow::Result<String> {
    let mut config = load_config(cli)?;
    if let Some(users) = users {
        config.user_count = users;
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }

    let catalog = PlanCatalog::standard();
    let mut rng = random::for_run(config.seed);
    let run = pipeline::run(&config, &catalog, &mut rng)?;
    run.write_json(output, &catalog)
        .with_context(|| format!("writing dataset to {}", output.display()))?;

    let summary = run.summary(&catalog);
    Ok(render_summary(&summary, output))
}

/// Load the run configuration, honoring the --config flag
pub fn load_config(cli: &Cli) -> anyhow::Result<GenerationConfig> {
    ConfigLoader::load(cli.config.as_deref()).context("loading configuration")
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<String> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    let rendered = ConfigLoader::default_toml()?;
    std::fs::write(path, rendered)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(format!("{} {}", "wrote".green(), path.display()))
}

fn render_summary(summary: &RunSummary, output: &Path) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Plan", "Subscriptions", "Usage events"]);
    for plan in &summary.per_plan {
        table.add_row(vec![
            plan.plan_name.clone(),
            plan.subscriptions.to_string(),
            plan.usage_events.to_string(),
        ]);
    }

    format!(
        "{}\n\n{} users, {} subscriptions ({} expired, {} open-ended), {} usage events\n{} {}",
        table,
        summary.users,
        summary.subscriptions,
        summary.expired_subscriptions,
        summary.open_ended_subscriptions,
        summary.usage_events,
        "dataset written to".green(),
        output.display()
    )
}

fn render_catalog(catalog: &PlanCatalog, format: &str) -> anyhow::Result<String> {
    if format == "json" {
        let entries: Vec<_> = catalog.iter().collect();
        return serde_json::to_string_pretty(&entries).context("encoding catalog");
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Id",
        "Plan",
        "Monthly fee",
        "API limit",
        "Storage limit (MB)",
    ]);
    for entry in catalog.iter() {
        table.add_row(vec![
            entry.plan_id.to_string(),
            entry.plan_name.clone(),
            format!("${:.2}", entry.monthly_fee),
            entry.api_limit.to_string(),
            entry.storage_limit_mb.to_string(),
        ]);
    }
    Ok(table.to_string())
}
