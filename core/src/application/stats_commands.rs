// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Stats Command Service
//!
//! The operations behind `statsctl events ...` and `statsctl aggregations ...`.
//! Every operation follows the same order:
//!
//! 1. Resolve type names (validate, or fall back when none were given)
//! 2. Check date boundaries
//! 3. Confirm, for destructive operations
//! 4. Dispatch a job or drive the index lifecycle
//!
//! Steps 1 and 2 fail before anything is touched.
//!
//! Fallbacks when no type names are given:
//!
//! | Operation | Universe | Fallback |
//! |-----------|----------|----------|
//! | `events *` | events | enabled events |
//! | `aggregations process`, `delete`, `list-bookmarks` | aggregations | enabled aggregations |
//! | `aggregations delete-index`, `restore` | events | configured aggregation indexes |

use std::sync::Arc;
use tracing::info;

use crate::application::bookmarks::BookmarkManager;
use crate::application::confirmation::{self, Confirmation};
use crate::application::index_lifecycle::{IndexLifecycleController, LifecycleObserver};
use crate::application::job_dispatcher::JobDispatcher;
use crate::application::type_validator::TypeValidator;
use crate::domain::bookmark::Bookmark;
use crate::domain::date_spec::{BoundaryRole, DateRange, DateSpec};
use crate::domain::errors::StatsError;
use crate::domain::index::{IndexAction, IndexRequest, LifecycleReport, TargetKind};
use crate::domain::job::{DispatchMode, DispatchOutcome, JobRequest};
use crate::domain::registry::{AggregationConfig, TypeRegistry};
use crate::domain::repository::{AggregatorFactory, IndexBackend, JobRunner, TaskQueue};
use crate::domain::type_name::{TypeName, TypeUniverse};

/// Raw arguments of a delete/restore command, before validation.
#[derive(Debug, Clone, Default)]
pub struct IndexCommand {
    pub types: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub bookmark: bool,
    pub force: bool,
    pub verbose: bool,
}

/// Documents removed by one aggregator's own delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationDeletion {
    pub aggregation: TypeName,
    pub documents: u64,
}

pub struct StatsCommandService {
    registry: Arc<dyn TypeRegistry>,
    dispatcher: JobDispatcher,
    lifecycle: IndexLifecycleController,
    aggregators: Arc<dyn AggregatorFactory>,
    bookmarks: BookmarkManager,
}

impl StatsCommandService {
    pub fn new(
        registry: Arc<dyn TypeRegistry>,
        runner: Arc<dyn JobRunner>,
        queue: Arc<dyn TaskQueue>,
        backend: Arc<dyn IndexBackend>,
        aggregators: Arc<dyn AggregatorFactory>,
    ) -> Self {
        Self {
            registry,
            dispatcher: JobDispatcher::new(runner, queue),
            lifecycle: IndexLifecycleController::new(backend),
            bookmarks: BookmarkManager::new(aggregators.clone()),
            aggregators,
        }
    }

    // ------------------------------------------------------------------
    // events
    // ------------------------------------------------------------------

    pub async fn process_events(
        &self,
        types: &[String],
        eager: bool,
    ) -> Result<DispatchOutcome, StatsError> {
        let event_types = self.event_types(types)?;
        self.dispatcher
            .dispatch(
                JobRequest::ProcessEvents { event_types },
                DispatchMode::from_eager_flag(eager),
            )
            .await
    }

    pub async fn delete_events(
        &self,
        command: IndexCommand,
        confirmation: &dyn Confirmation,
        observer: &dyn LifecycleObserver,
    ) -> Result<LifecycleReport, StatsError> {
        let types = self.event_types(&command.types)?;
        let request = index_request(IndexAction::Delete, TargetKind::Events, types, command)?;
        confirmation::require(confirmation, &delete_prompt(&request))?;
        self.lifecycle.execute(&request, observer).await
    }

    pub async fn restore_events(
        &self,
        command: IndexCommand,
        observer: &dyn LifecycleObserver,
    ) -> Result<LifecycleReport, StatsError> {
        let types = self.event_types(&command.types)?;
        let request = index_request(IndexAction::Restore, TargetKind::Events, types, command)?;
        self.lifecycle.execute(&request, observer).await
    }

    // ------------------------------------------------------------------
    // aggregations
    // ------------------------------------------------------------------

    pub async fn process_aggregations(
        &self,
        types: &[String],
        start_date: Option<&str>,
        end_date: Option<&str>,
        update_bookmark: bool,
        eager: bool,
    ) -> Result<DispatchOutcome, StatsError> {
        let aggregation_types = self.aggregation_types(types)?;
        let start_date = DateSpec::verify(start_date)?;
        let end_date = DateSpec::verify(end_date)?;

        self.dispatcher
            .dispatch(
                JobRequest::AggregateEvents {
                    aggregation_types,
                    start_date,
                    end_date,
                    update_bookmark,
                },
                DispatchMode::from_eager_flag(eager),
            )
            .await
    }

    /// Remove aggregated documents through each aggregator's own delete.
    pub async fn delete_aggregations(
        &self,
        types: &[String],
        start_date: Option<&str>,
        end_date: Option<&str>,
        confirmation: &dyn Confirmation,
    ) -> Result<Vec<AggregationDeletion>, StatsError> {
        let aggregation_types = self.aggregation_types(types)?;
        let start = DateSpec::parse(start_date, BoundaryRole::Start)?;
        let end = DateSpec::parse(end_date, BoundaryRole::End)?;
        let configs = self.aggregation_configs(&aggregation_types)?;

        confirmation::require(
            confirmation,
            &format!(
                "Delete aggregations {} within {}?",
                join(&aggregation_types),
                DateRange::new(start, end)
            ),
        )?;

        let mut deletions = Vec::with_capacity(configs.len());
        for config in &configs {
            let aggregator = self.aggregators.build(config);
            let documents = aggregator.delete(start, end).await.map_err(|err| {
                metrics::counter!("statsctl_backend_errors_total", "operation" => "delete_aggregation")
                    .increment(1);
                StatsError::backend("delete aggregation", &config.name, err)
            })?;
            info!(aggregation = %config.name, documents, "Aggregation deleted");
            deletions.push(AggregationDeletion {
                aggregation: config.name.clone(),
                documents,
            });
        }
        Ok(deletions)
    }

    pub async fn list_bookmarks(
        &self,
        types: &[String],
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(TypeName, Vec<Bookmark>)>, StatsError> {
        let aggregation_types = self.aggregation_types(types)?;
        let range = DateRange::new(
            DateSpec::parse(start_date, BoundaryRole::Start)?,
            DateSpec::parse(end_date, BoundaryRole::End)?,
        );
        let configs = self.aggregation_configs(&aggregation_types)?;

        let mut listing = Vec::with_capacity(configs.len());
        for config in &configs {
            let bookmarks = self.bookmarks.list(config, &range, limit).await?;
            listing.push((config.name.clone(), bookmarks));
        }
        Ok(listing)
    }

    pub async fn delete_aggregation_index(
        &self,
        command: IndexCommand,
        confirmation: &dyn Confirmation,
        observer: &dyn LifecycleObserver,
    ) -> Result<LifecycleReport, StatsError> {
        let types = self.aggregation_index_types(&command.types)?;
        let request = index_request(IndexAction::Delete, TargetKind::Aggregations, types, command)?;
        confirmation::require(confirmation, &delete_prompt(&request))?;
        self.lifecycle.execute(&request, observer).await
    }

    pub async fn restore_aggregations(
        &self,
        command: IndexCommand,
        observer: &dyn LifecycleObserver,
    ) -> Result<LifecycleReport, StatsError> {
        let types = self.aggregation_index_types(&command.types)?;
        let request = index_request(IndexAction::Restore, TargetKind::Aggregations, types, command)?;
        self.lifecycle.execute(&request, observer).await
    }

    // ------------------------------------------------------------------
    // type resolution
    // ------------------------------------------------------------------

    fn event_types(&self, raw: &[String]) -> Result<Vec<TypeName>, StatsError> {
        Ok(TypeValidator::validate_or(
            self.registry.as_ref(),
            TypeUniverse::Events,
            raw,
            |registry| registry.enabled_events(),
        )?)
    }

    fn aggregation_types(&self, raw: &[String]) -> Result<Vec<TypeName>, StatsError> {
        Ok(TypeValidator::validate_or(
            self.registry.as_ref(),
            TypeUniverse::Aggregations,
            raw,
            |registry| registry.enabled_aggregations(),
        )?)
    }

    /// Aggregation indexes are keyed by event kind.
    fn aggregation_index_types(&self, raw: &[String]) -> Result<Vec<TypeName>, StatsError> {
        Ok(TypeValidator::validate_or(
            self.registry.as_ref(),
            TypeUniverse::Events,
            raw,
            |registry| registry.aggregation_index_names(),
        )?)
    }

    fn aggregation_configs(&self, types: &[TypeName]) -> Result<Vec<AggregationConfig>, StatsError> {
        types
            .iter()
            .map(|name| {
                self.registry
                    .aggregation_config(name)
                    .ok_or_else(|| StatsError::MissingAggregation(name.clone()))
            })
            .collect()
    }
}

/// Build the request, checking both dates in verify mode.
fn index_request(
    action: IndexAction,
    target: TargetKind,
    types: Vec<TypeName>,
    command: IndexCommand,
) -> Result<IndexRequest, StatsError> {
    Ok(IndexRequest {
        action,
        target,
        types,
        start_date: DateSpec::verify(command.start_date.as_deref())?,
        end_date: DateSpec::verify(command.end_date.as_deref())?,
        bookmark: command.bookmark,
        force: command.force,
        verbose: command.verbose,
    })
}

fn delete_prompt(request: &IndexRequest) -> String {
    let range = match (&request.start_date, &request.end_date) {
        (None, None) => "all dates".to_string(),
        (start, end) => format!(
            "{} to {}",
            start.as_deref().unwrap_or("the beginning"),
            end.as_deref().unwrap_or("now")
        ),
    };
    let bookmarks = if request.includes_bookmarks() {
        " and their bookmark indices"
    } else {
        ""
    };
    format!(
        "Delete {} indices for {}{} ({})? This cannot be undone.",
        request.target,
        join(&request.types),
        bookmarks,
        range
    )
}

fn join(types: &[TypeName]) -> String {
    types
        .iter()
        .map(TypeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
