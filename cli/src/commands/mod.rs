// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for statsctl

pub mod aggregations;
pub mod config;
pub mod events;

pub use self::aggregations::AggregationsCommand;
pub use self::config::ConfigCommand;
pub use self::events::EventsCommand;

use clap::Args;

/// Date window shared by most commands (YYYY-MM-DD|YYYY-MM|YYYY).
#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    /// Start date (YYYY-MM-DD|YYYY-MM|YYYY)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD|YYYY-MM|YYYY)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,
}
