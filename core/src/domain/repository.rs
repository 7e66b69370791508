// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Ports to External Collaborators
//!
//! The control plane never owns persisted data. Everything it touches is
//! reached through the traits below, implemented in
//! `crate::infrastructure`:
//!
//! | Trait | Collaborator | Implementation |
//! |-------|--------------|----------------|
//! | `IndexBackend` | search index + record store | `SearchIndexBackend` |
//! | `RecordStore` | authoritative statistics tables | `PostgresRecordStore` |
//! | `Aggregator` / `AggregatorFactory` | per-kind aggregator | `SearchIndexAggregator` |
//! | `JobRunner` / `TaskQueue` | pipeline job runtime | `PipelineClient` |

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::bookmark::Bookmark;
use crate::domain::date_spec::DateRange;
use crate::domain::index::{IndexPartition, PartitionKind};
use crate::domain::job::{JobEnvelope, JobReport, TaskId};
use crate::domain::registry::AggregationConfig;
use crate::domain::type_name::TypeName;

/// Partitioned index storage as seen by the lifecycle controller.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Existing partitions of `type_name` whose month overlaps `range`.
    async fn list_partitions(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError>;

    async fn delete_partition(&self, partition: &IndexPartition) -> Result<(), BackendError>;

    /// Partitions the backing store holds records for within `range`.
    async fn restore_plan(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError>;

    /// Replay stored records for one partition, limited to `range`.
    /// Returns the number of documents written.
    async fn restore_partition(
        &self,
        partition: &IndexPartition,
        range: &DateRange,
    ) -> Result<u64, BackendError>;
}

/// A row from the authoritative store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub document: serde_json::Value,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Distinct months (first day) holding records within `range`.
    async fn record_months(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<NaiveDate>, BackendError>;

    async fn fetch_records(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<StoredRecord>, BackendError>;
}

/// Capabilities of an instantiated aggregator.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Delete aggregated documents within the bounds. Returns documents removed.
    async fn delete(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<u64, BackendError>;

    /// Bookmarks within the bounds, newest first, at most `limit`.
    async fn list_bookmarks(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BackendError>;
}

pub trait AggregatorFactory: Send + Sync {
    fn build(&self, config: &AggregationConfig) -> Arc<dyn Aggregator>;
}

/// Runs a job to completion in the calling invocation.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: &JobEnvelope) -> Result<JobReport, JobError>;
}

/// Accepts a job for asynchronous execution.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn submit(&self, job: &JobEnvelope) -> Result<TaskId, BackendError>;
}

/// Failures reported by storage, index and queue collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Partition not found: {0}")]
    PartitionNotFound(String),

    #[error("Backend unavailable: {0}")]
    Transient(String),

    #[error("Backend rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Serialization(err.to_string())
        } else {
            BackendError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => BackendError::Transient(err.to_string()),
            _ => BackendError::Store(err.to_string()),
        }
    }
}

/// Failure of an eagerly executed job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The job ran and raised.
    #[error("{0}")]
    Failed(String),

    /// The runner could not be reached or did not answer.
    #[error("job runner unreachable: {0}")]
    Unreachable(String),
}
