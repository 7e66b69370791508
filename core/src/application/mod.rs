// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod type_validator;
pub mod confirmation;
pub mod job_dispatcher;
pub mod index_lifecycle;
pub mod bookmarks;
pub mod stats_commands;

// Re-export services for convenience
pub use type_validator::TypeValidator;
pub use confirmation::{Confirmation, PreAffirmed};
pub use job_dispatcher::JobDispatcher;
pub use index_lifecycle::{IndexLifecycleController, LifecycleObserver, SilentObserver};
pub use bookmarks::BookmarkManager;
pub use stats_commands::{AggregationDeletion, IndexCommand, StatsCommandService};
