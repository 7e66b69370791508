// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use statsctl_core::application::{Confirmation, LifecycleObserver, StatsCommandService};
use statsctl_core::bookmark::Bookmark;
use statsctl_core::date_spec::DateRange;
use statsctl_core::index::{IndexAction, IndexNaming, IndexPartition, PartitionKind, TypeOutcome};
use statsctl_core::job::{JobEnvelope, JobReport, TaskId};
use statsctl_core::registry::AggregationConfig;
use statsctl_core::repository::{
    Aggregator, AggregatorFactory, BackendError, IndexBackend, JobError, JobRunner, TaskQueue,
};
use statsctl_core::stats_config::StatsConfigManifest;
use statsctl_core::type_name::TypeName;

pub const CONFIG: &str = r#"
apiVersion: statsctl/v1
kind: StatsConfig
metadata:
  name: test
spec:
  events:
    - name: file-download
    - name: record-view
    - name: item-create
      enabled: false
  aggregations:
    - name: file-download-agg
      event: file-download
    - name: record-view-agg
      event: record-view
  aggregation_indexes: [record-view, file-download]
"#;

pub fn manifest() -> StatsConfigManifest {
    StatsConfigManifest::from_yaml_str(CONFIG).unwrap()
}

pub fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

// ----------------------------------------------------------------------------
// Index backend
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBackend {
    naming: IndexNaming,
    /// Partitions currently in the index.
    pub partitions: Mutex<Vec<IndexPartition>>,
    /// Partitions the record store can rebuild.
    pub restorable: Mutex<Vec<IndexPartition>>,
    /// Type names whose partition operations fail.
    pub failing: Mutex<HashSet<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub restored: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn add_months(&self, kind: PartitionKind, type_name: &str, months: &[(i32, u32)]) {
        let ty = TypeName::from(type_name);
        let mut partitions = self.partitions.lock();
        let mut restorable = self.restorable.lock();
        for (year, month) in months {
            let partition = self.naming.partition_for(kind, &ty, &day(*year, *month, 1));
            partitions.push(partition.clone());
            restorable.push(partition);
        }
    }

    pub fn add_bookmark_index(&self, type_name: &str) {
        let partition = self.naming.bookmark_partition(&TypeName::from(type_name));
        self.partitions.lock().push(partition.clone());
        self.restorable.lock().push(partition);
    }

    pub fn fail_for(&self, type_name: &str) {
        self.failing.lock().insert(type_name.to_string());
    }

    fn check(&self, partition: &IndexPartition) -> Result<(), BackendError> {
        if self.failing.lock().contains(partition.type_name.as_str()) {
            return Err(BackendError::Transient(format!("{} unavailable", partition.name)));
        }
        Ok(())
    }

    fn select(
        source: &[IndexPartition],
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Vec<IndexPartition> {
        source
            .iter()
            .filter(|p| p.kind == kind && &p.type_name == type_name)
            .filter(|p| IndexNaming::in_range(p, range))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl IndexBackend for MemoryBackend {
    async fn list_partitions(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError> {
        Ok(Self::select(&self.partitions.lock(), kind, type_name, range))
    }

    async fn delete_partition(&self, partition: &IndexPartition) -> Result<(), BackendError> {
        self.check(partition)?;
        self.partitions.lock().retain(|p| p.name != partition.name);
        self.deleted.lock().push(partition.name.clone());
        Ok(())
    }

    async fn restore_plan(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError> {
        Ok(Self::select(&self.restorable.lock(), kind, type_name, range))
    }

    async fn restore_partition(
        &self,
        partition: &IndexPartition,
        _range: &DateRange,
    ) -> Result<u64, BackendError> {
        self.check(partition)?;
        self.restored.lock().push(partition.name.clone());
        Ok(10)
    }
}

// ----------------------------------------------------------------------------
// Job runtime
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingRunner {
    pub fail_with: Mutex<Option<String>>,
    pub runs: Mutex<Vec<JobEnvelope>>,
}

#[async_trait]
impl JobRunner for RecordingRunner {
    async fn run(&self, job: &JobEnvelope) -> Result<JobReport, JobError> {
        self.runs.lock().push(job.clone());
        match self.fail_with.lock().clone() {
            Some(message) => Err(JobError::Failed(message)),
            None => Ok(JobReport {
                processed: 7,
                message: None,
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingQueue {
    pub unreachable: Mutex<bool>,
    pub submitted: Mutex<Vec<JobEnvelope>>,
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn submit(&self, job: &JobEnvelope) -> Result<TaskId, BackendError> {
        if *self.unreachable.lock() {
            return Err(BackendError::Transient("connection refused".to_string()));
        }
        let mut submitted = self.submitted.lock();
        submitted.push(job.clone());
        Ok(TaskId(format!("task-{}", submitted.len())))
    }
}

// ----------------------------------------------------------------------------
// Aggregators
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct AggregatorState {
    pub bookmarks: Mutex<Vec<Bookmark>>,
    pub deletes: Mutex<Vec<(TypeName, Option<NaiveDateTime>, Option<NaiveDateTime>)>>,
}

pub struct MemoryAggregator {
    name: TypeName,
    state: Arc<AggregatorState>,
}

#[async_trait]
impl Aggregator for MemoryAggregator {
    async fn delete(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<u64, BackendError> {
        self.state.deletes.lock().push((self.name.clone(), start, end));
        Ok(3)
    }

    /// Returns matches oldest first and ignores `limit`, so callers must
    /// order and truncate themselves.
    async fn list_bookmarks(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        _limit: usize,
    ) -> Result<Vec<Bookmark>, BackendError> {
        let range = DateRange::new(start, end);
        let mut matching: Vec<Bookmark> = self
            .state
            .bookmarks
            .lock()
            .iter()
            .filter(|b| b.aggregation == self.name && range.contains(&b.date))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(matching)
    }
}

#[derive(Default)]
pub struct MemoryAggregators {
    pub state: Arc<AggregatorState>,
}

impl AggregatorFactory for MemoryAggregators {
    fn build(&self, config: &AggregationConfig) -> Arc<dyn Aggregator> {
        Arc::new(MemoryAggregator {
            name: config.name.clone(),
            state: self.state.clone(),
        })
    }
}

// ----------------------------------------------------------------------------
// Operator interaction
// ----------------------------------------------------------------------------

pub struct ScriptedConfirmation {
    answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn accept() -> Self {
        Self {
            answer: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn decline() -> Self {
        Self {
            answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub planned: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<(String, String)>>,
    pub completed: Mutex<Vec<String>>,
}

impl LifecycleObserver for RecordingObserver {
    fn planned(&self, _action: IndexAction, partition: &IndexPartition) {
        self.planned.lock().push(partition.name.clone());
    }

    fn warning(&self, type_name: &TypeName, message: &str) {
        self.warnings
            .lock()
            .push((type_name.to_string(), message.to_string()));
    }

    fn type_completed(&self, _action: IndexAction, outcome: &TypeOutcome) {
        self.completed.lock().push(outcome.type_name.to_string());
    }
}

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub runner: Arc<RecordingRunner>,
    pub queue: Arc<RecordingQueue>,
    pub aggregators: Arc<MemoryAggregators>,
    pub service: StatsCommandService,
}

impl Harness {
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::default());
        let runner = Arc::new(RecordingRunner::default());
        let queue = Arc::new(RecordingQueue::default());
        let aggregators = Arc::new(MemoryAggregators::default());
        let service = StatsCommandService::new(
            Arc::new(manifest()),
            runner.clone(),
            queue.clone(),
            backend.clone(),
            aggregators.clone(),
        );
        Self {
            backend,
            runner,
            queue,
            aggregators,
            service,
        }
    }
}
