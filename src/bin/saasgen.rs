//! saasgen CLI binary
//!
//! Command-line entry point for the synthetic SaaS dataset generator.

use clap::Parser;
use saasgen::cli::Cli;
use saasgen::config::ConfigLoader;
use saasgen::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("saasgen starting");

    match saasgen::cli::execute(&cli) {
        Ok(output) => {
            info!("command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("command failed: {:#}", e);
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }

    config
}
