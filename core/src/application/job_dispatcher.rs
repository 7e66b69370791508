// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Job Dispatcher
//!
//! Hands processing and aggregation jobs to the pipeline in one of two modes:
//! - **Eager**: run through the [`JobRunner`] and wait; a job failure is fatal
//! - **Deferred**: submit to the [`TaskQueue`] and return once accepted
//!
//! A deferred job's eventual failure is never observed here. Failing to
//! submit it is a backend error.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::errors::StatsError;
use crate::domain::job::{DispatchMode, DispatchOutcome, JobEnvelope, JobRequest};
use crate::domain::repository::{JobRunner, TaskQueue};

pub struct JobDispatcher {
    runner: Arc<dyn JobRunner>,
    queue: Arc<dyn TaskQueue>,
}

impl JobDispatcher {
    pub fn new(runner: Arc<dyn JobRunner>, queue: Arc<dyn TaskQueue>) -> Self {
        Self { runner, queue }
    }

    pub async fn dispatch(
        &self,
        request: JobRequest,
        mode: DispatchMode,
    ) -> Result<DispatchOutcome, StatsError> {
        let envelope = JobEnvelope::new(request);
        let job = envelope.request.name();
        let job_id = envelope.job_id;

        debug!(%job_id, job, types = ?envelope.request.types(), mode = mode.label(), "Dispatching job");
        metrics::counter!("statsctl_jobs_dispatched_total", "mode" => mode.label(), "job" => job)
            .increment(1);

        match mode {
            DispatchMode::Eager => {
                let report = self.runner.run(&envelope).await.map_err(|source| {
                    error!(%job_id, job, error = %source, "Eager job failed");
                    StatsError::JobExecution {
                        job: job.to_string(),
                        source,
                    }
                })?;
                info!(%job_id, job, processed = report.processed, "Job completed");
                Ok(DispatchOutcome::Completed { job_id, report })
            }
            DispatchMode::Deferred => {
                let task_id = self.queue.submit(&envelope).await.map_err(|source| {
                    metrics::counter!("statsctl_backend_errors_total", "operation" => "submit")
                        .increment(1);
                    StatsError::backend("submit", job, source)
                })?;
                info!(%job_id, job, %task_id, "Job submitted");
                Ok(DispatchOutcome::Submitted { job_id, task_id })
            }
        }
    }
}
