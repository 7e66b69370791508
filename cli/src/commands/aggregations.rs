// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Aggregation commands
//!
//! Commands: process, delete, list-bookmarks, delete-index, restore

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use super::events::index_command;
use super::DateArgs;
use crate::confirm::confirmation;
use crate::context::{Requirements, StatsContext};
use crate::output::{self, ConsoleObserver};

#[derive(Subcommand, Debug)]
pub enum AggregationsCommand {
    /// Aggregate processed events into summary documents
    Process {
        /// Aggregation types to run (default: all enabled)
        #[arg(value_name = "AGGREGATION_TYPES")]
        aggregation_types: Vec<String>,

        #[command(flatten)]
        dates: DateArgs,

        /// Advance the bookmark after aggregating
        #[arg(short = 'b', long)]
        update_bookmark: bool,

        /// Run in this process and wait for completion
        #[arg(short, long)]
        eager: bool,
    },

    /// Delete aggregated documents through each aggregator
    Delete {
        /// Aggregation types to delete (default: all enabled)
        #[arg(value_name = "AGGREGATION_TYPES")]
        aggregation_types: Vec<String>,

        #[command(flatten)]
        dates: DateArgs,

        /// Skip the confirmation prompt
        #[arg(long, alias = "yes-i-know")]
        yes: bool,
    },

    /// List the most recent aggregation bookmarks
    ListBookmarks {
        /// Aggregation types to list (default: all enabled)
        #[arg(value_name = "AGGREGATION_TYPES")]
        aggregation_types: Vec<String>,

        #[command(flatten)]
        dates: DateArgs,

        /// Bookmarks per aggregation
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },

    /// Delete aggregation indices
    DeleteIndex {
        /// Aggregation indices to delete (default: configured aggregation indexes)
        #[arg(value_name = "AGGREGATION_TYPES")]
        aggregation_types: Vec<String>,

        /// Also delete the bookmark index
        #[arg(short = 'b', long)]
        bookmark: bool,

        #[command(flatten)]
        dates: DateArgs,

        /// Continue past backend errors
        #[arg(short, long)]
        force: bool,

        /// Show each index before acting on it
        #[arg(short, long)]
        verbose: bool,

        /// Skip the confirmation prompt
        #[arg(long = "yes-i-know")]
        yes_i_know: bool,
    },

    /// Restore aggregation indices from the record store
    Restore {
        /// Aggregation indices to restore (default: configured aggregation indexes)
        #[arg(value_name = "AGGREGATION_TYPES")]
        aggregation_types: Vec<String>,

        /// Also restore the bookmark index
        #[arg(short = 'b', long)]
        bookmark: bool,

        #[command(flatten)]
        dates: DateArgs,

        /// Continue past backend errors
        #[arg(short, long)]
        force: bool,

        /// Show each index before acting on it
        #[arg(short, long)]
        verbose: bool,
    },
}

pub async fn handle_command(
    command: AggregationsCommand,
    config_path: Option<PathBuf>,
) -> Result<()> {
    match command {
        AggregationsCommand::Process {
            aggregation_types,
            dates,
            update_bookmark,
            eager,
        } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let outcome = context
                .service
                .process_aggregations(
                    &aggregation_types,
                    dates.start_date.as_deref(),
                    dates.end_date.as_deref(),
                    update_bookmark,
                    eager,
                )
                .await?;
            output::print_dispatch("Aggregation", &outcome);
        }
        AggregationsCommand::Delete {
            aggregation_types,
            dates,
            yes,
        } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let deletions = context
                .service
                .delete_aggregations(
                    &aggregation_types,
                    dates.start_date.as_deref(),
                    dates.end_date.as_deref(),
                    confirmation(yes).as_ref(),
                )
                .await?;
            output::print_aggregation_deletions(&deletions);
        }
        AggregationsCommand::ListBookmarks {
            aggregation_types,
            dates,
            limit,
        } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let listing = context
                .service
                .list_bookmarks(
                    &aggregation_types,
                    dates.start_date.as_deref(),
                    dates.end_date.as_deref(),
                    limit,
                )
                .await?;
            output::print_bookmarks(&listing);
        }
        AggregationsCommand::DeleteIndex {
            aggregation_types,
            bookmark,
            dates,
            force,
            verbose,
            yes_i_know,
        } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let report = context
                .service
                .delete_aggregation_index(
                    index_command(aggregation_types, dates, bookmark, force, verbose),
                    confirmation(yes_i_know).as_ref(),
                    &ConsoleObserver,
                )
                .await?;
            output::print_report(&report);
        }
        AggregationsCommand::Restore {
            aggregation_types,
            bookmark,
            dates,
            force,
            verbose,
        } => {
            let context = StatsContext::build(config_path, Requirements::restore())?;
            println!("{}", "Restoring aggregation indices...".bold());
            let report = context
                .service
                .restore_aggregations(
                    index_command(aggregation_types, dates, bookmark, force, verbose),
                    &ConsoleObserver,
                )
                .await?;
            output::print_report(&report);
        }
    }
    Ok(())
}
