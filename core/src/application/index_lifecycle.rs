// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Index Lifecycle Controller
//!
//! Drives delete and restore of event and aggregation partitions (and, when
//! requested, the aggregation bookmark partition) over a date range.
//!
//! Per type name:
//! 1. Plan: list existing partitions (delete) or partitions the record store
//!    holds data for (restore)
//! 2. Narrate the plan when `verbose`
//! 3. Execute partition by partition
//! 4. Report the type's outcome to the observer
//!
//! Without `force` the first backend error aborts the remaining work. With
//! `force` each error becomes a warning on the type's outcome and work
//! continues with the next partition.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::date_spec::DateRange;
use crate::domain::errors::StatsError;
use crate::domain::index::{
    IndexAction, IndexPartition, IndexRequest, LifecycleReport, PartitionKind, TypeOutcome,
};
use crate::domain::repository::{BackendError, IndexBackend};
use crate::domain::type_name::TypeName;

/// Receives progress while a request executes.
pub trait LifecycleObserver: Send + Sync {
    /// Called for each partition before execution starts (verbose only).
    fn planned(&self, _action: IndexAction, _partition: &IndexPartition) {}

    /// Backend error downgraded under `force`, or nothing to act on.
    fn warning(&self, _type_name: &TypeName, _message: &str) {}

    /// All partitions of a type have been handled.
    fn type_completed(&self, _action: IndexAction, _outcome: &TypeOutcome) {}
}

pub struct SilentObserver;

impl LifecycleObserver for SilentObserver {}

pub struct IndexLifecycleController {
    backend: Arc<dyn IndexBackend>,
}

impl IndexLifecycleController {
    pub fn new(backend: Arc<dyn IndexBackend>) -> Self {
        Self { backend }
    }

    pub async fn execute(
        &self,
        request: &IndexRequest,
        observer: &dyn LifecycleObserver,
    ) -> Result<LifecycleReport, StatsError> {
        let range = request.range()?;
        info!(
            action = request.action.verb(),
            target = %request.target,
            types = request.types.len(),
            %range,
            force = request.force,
            "Starting index lifecycle operation"
        );

        let mut kinds = vec![request.target.partition_kind()];
        if request.includes_bookmarks() {
            kinds.push(PartitionKind::Bookmarks);
        }

        let mut outcomes = Vec::with_capacity(request.types.len());
        for type_name in &request.types {
            let mut outcome = TypeOutcome::new(type_name.clone());

            for kind in &kinds {
                let plan = match self.plan(request.action, *kind, type_name, &range).await {
                    Ok(plan) => plan,
                    Err(err) => {
                        self.tolerate(request, "plan", type_name, err, &mut outcome, observer)?;
                        continue;
                    }
                };

                if plan.is_empty() {
                    debug!(type_name = %type_name, kind = ?kind, "No partitions in range");
                    observer.warning(
                        type_name,
                        &format!("no {} partitions to {} in {}", kind.label(), request.action.verb(), range),
                    );
                    continue;
                }

                if request.verbose {
                    for partition in &plan {
                        observer.planned(request.action, partition);
                    }
                }

                for partition in &plan {
                    let result = match request.action {
                        IndexAction::Delete => self.backend.delete_partition(partition).await.map(|_| 0),
                        IndexAction::Restore => self.backend.restore_partition(partition, &range).await,
                    };

                    match result {
                        Ok(documents) => {
                            debug!(partition = %partition, documents, "Partition {}", request.action.past_tense());
                            record_success(request.action);
                            outcome.partitions.push(partition.name.clone());
                            outcome.documents += documents;
                        }
                        Err(err) => {
                            self.tolerate(request, &partition.name, type_name, err, &mut outcome, observer)?;
                        }
                    }
                }
            }

            info!(
                type_name = %type_name,
                partitions = outcome.partitions.len(),
                warnings = outcome.warnings.len(),
                "Type {}",
                request.action.past_tense()
            );
            observer.type_completed(request.action, &outcome);
            outcomes.push(outcome);
        }

        Ok(LifecycleReport {
            action: request.action,
            target: request.target,
            outcomes,
        })
    }

    async fn plan(
        &self,
        action: IndexAction,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError> {
        match action {
            IndexAction::Delete => self.backend.list_partitions(kind, type_name, range).await,
            IndexAction::Restore => self.backend.restore_plan(kind, type_name, range).await,
        }
    }

    /// Downgrade `err` to a warning under `force`, otherwise make it fatal.
    fn tolerate(
        &self,
        request: &IndexRequest,
        subject: &str,
        type_name: &TypeName,
        err: BackendError,
        outcome: &mut TypeOutcome,
        observer: &dyn LifecycleObserver,
    ) -> Result<(), StatsError> {
        metrics::counter!("statsctl_backend_errors_total", "operation" => request.action.verb())
            .increment(1);

        if !request.force {
            return Err(StatsError::backend(request.action.verb(), type_name, err));
        }

        let message = format!("{} {}: {}", request.action.verb(), subject, err);
        warn!(type_name = %type_name, error = %err, "Ignoring backend error (force)");
        observer.warning(type_name, &message);
        outcome.warnings.push(message);
        Ok(())
    }
}

fn record_success(action: IndexAction) {
    match action {
        IndexAction::Delete => metrics::counter!("statsctl_partitions_deleted_total").increment(1),
        IndexAction::Restore => metrics::counter!("statsctl_partitions_restored_total").increment(1),
    }
}
