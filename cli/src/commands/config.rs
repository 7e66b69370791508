// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use statsctl_core::stats_config::StatsConfigManifest;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        for (position, path) in StatsConfigManifest::candidate_paths().iter().enumerate() {
            let marker = if path.exists() { "found".green() } else { "missing".dimmed() };
            println!("  {}. {} ({})", position + 2, path.display(), marker);
        }
        println!();
    }

    let config = StatsConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    println!("{}", "Events:".bold());
    for event in &config.spec.events {
        println!("  {} {}", event.name, enabled_marker(event.enabled));
    }
    println!();

    println!("{}", "Aggregations:".bold());
    for aggregation in &config.spec.aggregations {
        println!(
            "  {} ← {} {}",
            aggregation.name,
            aggregation.event,
            enabled_marker(aggregation.enabled)
        );
    }
    if !config.spec.aggregation_indexes.is_empty() {
        println!(
            "  Aggregation indexes: {}",
            config.spec.aggregation_indexes.join(", ")
        );
    }
    println!();

    let search = &config.spec.search_index;
    println!("{}", "Search Index:".bold());
    println!("  URL: {}", search.url);
    if !search.index_prefix.is_empty() {
        println!("  Prefix: {}", search.index_prefix);
    }
    println!("  Timeout: {}s", search.timeout_secs);
    println!();

    println!("{}", "Record Store:".bold());
    match &config.spec.record_store.url {
        // Only print the reference; resolved URLs may carry credentials.
        Some(url) if url.starts_with("env:") => println!("  URL: {}", url),
        Some(_) => println!("  URL: {}", "(configured)".dimmed()),
        None => println!("  URL: {}", "(not set)".dimmed()),
    }
    println!("  Events table: {}", config.spec.record_store.events_table);
    println!();

    println!("{}", "Pipeline:".bold());
    println!("  URL: {}", config.spec.pipeline.url);
    println!();

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = StatsConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn enabled_marker(enabled: bool) -> colored::ColoredString {
    if enabled {
        "(enabled)".green()
    } else {
        "(disabled)".dimmed()
    }
}
