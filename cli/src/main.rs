// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # statsctl
//!
//! Operator control plane for the usage-statistics pipeline.
//!
//! ## Commands
//!
//! - `statsctl events process|delete|restore` - Raw event processing and event indices
//! - `statsctl aggregations process|delete|list-bookmarks|delete-index|restore` - Aggregations
//! - `statsctl config show|validate` - Configuration management
//!
//! Every invocation is short-lived: configuration is loaded, one command runs
//! against the search index / pipeline / record store, and the process exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use statsctl_cli::commands::{self, AggregationsCommand, ConfigCommand, EventsCommand};
use statsctl_core::errors::StatsError;

/// statsctl - Usage statistics control plane
#[derive(Parser, Debug)]
#[command(name = "statsctl")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "STATSCTL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STATSCTL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Event processing and event index management
    #[command(name = "events")]
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },

    /// Aggregation processing, bookmarks and aggregation index management
    #[command(name = "aggregations")]
    Aggregations {
        #[command(subcommand)]
        command: AggregationsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("{}", format!("Error: {:#}", err).red());
        std::process::exit(1);
    }

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<StatsError>() {
            Some(stats) if stats.is_abort() => eprintln!("{}", "Aborted!".red()),
            _ => eprintln!("{}", format!("Error: {:#}", err).red()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Events { command } => commands::events::handle_command(command, cli.config).await,
        Commands::Aggregations { command } => {
            commands::aggregations::handle_command(command, cli.config).await
        }
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
