// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Processing and aggregation jobs and how they are dispatched.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::type_name::TypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Work handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobRequest {
    /// Normalize raw usage events of the given kinds.
    ProcessEvents { event_types: Vec<TypeName> },

    /// Aggregate normalized records into summary documents.
    ///
    /// Dates are the operator's verified text; the pipeline re-parses them.
    AggregateEvents {
        aggregation_types: Vec<TypeName>,
        start_date: Option<String>,
        end_date: Option<String>,
        update_bookmark: bool,
    },
}

impl JobRequest {
    pub fn name(&self) -> &'static str {
        match self {
            JobRequest::ProcessEvents { .. } => "process_events",
            JobRequest::AggregateEvents { .. } => "aggregate_events",
        }
    }

    pub fn types(&self) -> &[TypeName] {
        match self {
            JobRequest::ProcessEvents { event_types } => event_types,
            JobRequest::AggregateEvents {
                aggregation_types, ..
            } => aggregation_types,
        }
    }
}

/// Job plus the identifier used to correlate logs and pipeline records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub job_id: JobId,
    #[serde(flatten)]
    pub request: JobRequest,
}

impl JobEnvelope {
    pub fn new(request: JobRequest) -> Self {
        Self {
            job_id: JobId::new(),
            request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Run in the calling invocation, wait, propagate failure.
    Eager,
    /// Hand to the task facility and return at once.
    Deferred,
}

impl DispatchMode {
    pub fn from_eager_flag(eager: bool) -> Self {
        if eager {
            DispatchMode::Eager
        } else {
            DispatchMode::Deferred
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchMode::Eager => "eager",
            DispatchMode::Deferred => "deferred",
        }
    }
}

/// Identifier assigned by the task facility to an accepted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Summary the pipeline returns after an eager run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Eager run finished successfully.
    Completed { job_id: JobId, report: JobReport },
    /// Deferred job accepted; completion is not observed.
    Submitted { job_id: JobId, task_id: TaskId },
}

impl DispatchOutcome {
    pub fn job_id(&self) -> JobId {
        match self {
            DispatchOutcome::Completed { job_id, .. } | DispatchOutcome::Submitted { job_id, .. } => {
                *job_id
            }
        }
    }
}
