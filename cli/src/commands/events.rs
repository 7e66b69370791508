// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Event commands
//!
//! Commands: process, delete, restore

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use statsctl_core::application::IndexCommand;

use super::DateArgs;
use crate::confirm::confirmation;
use crate::context::{Requirements, StatsContext};
use crate::output::{self, ConsoleObserver};

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// Process raw usage events into normalized records
    Process {
        /// Event types to process (default: all enabled)
        #[arg(value_name = "EVENT_TYPES")]
        event_types: Vec<String>,

        /// Run in this process and wait for completion
        #[arg(short, long)]
        eager: bool,
    },

    /// Delete event indices
    Delete {
        /// Event types to delete (default: all enabled)
        #[arg(value_name = "EVENT_TYPES")]
        event_types: Vec<String>,

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

    /// Restore event indices from the record store
    Restore {
        /// Event types to restore (default: all enabled)
        #[arg(value_name = "EVENT_TYPES")]
        event_types: Vec<String>,

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

pub async fn handle_command(command: EventsCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        EventsCommand::Process { event_types, eager } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let outcome = context.service.process_events(&event_types, eager).await?;
            output::print_dispatch("Event processing", &outcome);
        }
        EventsCommand::Delete {
            event_types,
            dates,
            force,
            verbose,
            yes_i_know,
        } => {
            let context = StatsContext::build(config_path, Requirements::default())?;
            let report = context
                .service
                .delete_events(
                    index_command(event_types, dates, false, force, verbose),
                    confirmation(yes_i_know).as_ref(),
                    &ConsoleObserver,
                )
                .await?;
            output::print_report(&report);
        }
        EventsCommand::Restore {
            event_types,
            dates,
            force,
            verbose,
        } => {
            let context = StatsContext::build(config_path, Requirements::restore())?;
            println!("{}", "Restoring event indices...".bold());
            let report = context
                .service
                .restore_events(
                    index_command(event_types, dates, false, force, verbose),
                    &ConsoleObserver,
                )
                .await?;
            output::print_report(&report);
        }
    }
    Ok(())
}

pub(crate) fn index_command(
    types: Vec<String>,
    dates: DateArgs,
    bookmark: bool,
    force: bool,
    verbose: bool,
) -> IndexCommand {
    IndexCommand {
        types,
        start_date: dates.start_date,
        end_date: dates.end_date,
        bookmark,
        force,
        verbose,
    }
}
