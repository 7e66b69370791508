// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pipeline Job API Client
//!
//! Implements both dispatch ports against the pipeline's HTTP job API.
//!
//! # API Endpoints
//!
//! - `POST /api/jobs/run` - Run a job and wait for its report (eager)
//! - `POST /api/jobs` - Enqueue a job, returns `{"task_id": ...}` (deferred)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::job::{JobEnvelope, JobReport, TaskId};
use crate::domain::repository::{BackendError, JobError, JobRunner, TaskQueue};

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct JobFailure {
    error: String,
}

pub struct PipelineClient {
    /// No overall timeout: eager jobs run as long as they need.
    client: Client,

    base_url: String,

    submit_timeout: Duration,
}

impl PipelineClient {
    pub fn new(base_url: impl Into<String>, submit_timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            submit_timeout,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl JobRunner for PipelineClient {
    async fn run(&self, job: &JobEnvelope) -> Result<JobReport, JobError> {
        debug!(job_id = %job.job_id, job = job.request.name(), "Running job eagerly");
        let response = self
            .client
            .post(self.build_url("/api/jobs/run"))
            .json(job)
            .send()
            .await
            .map_err(|e| JobError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobError::Unreachable(e.to_string()))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(JobReport::default());
            }
            // A finished job can still report failure in a 200 body.
            if let Ok(failure) = serde_json::from_str::<JobFailure>(&body) {
                return Err(JobError::Failed(failure.error));
            }
            return serde_json::from_str(&body)
                .map_err(|e| JobError::Failed(format!("unreadable job report: {}", e)));
        }

        // The pipeline reports job failures as {"error": "..."}; anything
        // else is passed through verbatim.
        let message = serde_json::from_str::<JobFailure>(&body)
            .map(|failure| failure.error)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status.as_u16(), body));
        if status.is_server_error() && status != StatusCode::INTERNAL_SERVER_ERROR {
            Err(JobError::Unreachable(message))
        } else {
            Err(JobError::Failed(message))
        }
    }
}

#[async_trait]
impl TaskQueue for PipelineClient {
    async fn submit(&self, job: &JobEnvelope) -> Result<TaskId, BackendError> {
        let response = self
            .client
            .post(self.build_url("/api/jobs"))
            .timeout(self.submit_timeout)
            .json(job)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
                let accepted: SubmitResponse = response.json().await?;
                Ok(TaskId(accepted.task_id))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                if status.is_server_error() {
                    Err(BackendError::Transient(format!("HTTP {}: {}", status.as_u16(), body)))
                } else {
                    Err(BackendError::Rejected {
                        status: status.as_u16(),
                        body,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobRequest;
    use crate::domain::type_name::TypeName;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: String) -> PipelineClient {
        PipelineClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn envelope() -> JobEnvelope {
        JobEnvelope::new(JobRequest::ProcessEvents {
            event_types: vec![TypeName::from("file-download")],
        })
    }

    #[tokio::test]
    async fn test_run_returns_report() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/jobs/run")
            .match_body(Matcher::PartialJson(json!({
                "kind": "process_events",
                "event_types": ["file-download"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"processed": 120}"#)
            .create_async()
            .await;

        let report = client(server.url()).run(&envelope()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(report.processed, 120);
    }

    #[tokio::test]
    async fn test_run_failure_carries_pipeline_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jobs/run")
            .with_status(500)
            .with_body(r#"{"error": "aggregation index missing"}"#)
            .create_async()
            .await;

        let err = client(server.url()).run(&envelope()).await.unwrap_err();
        assert_eq!(err, JobError::Failed("aggregation index missing".to_string()));
    }

    #[tokio::test]
    async fn test_run_error_body_with_success_status_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jobs/run")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "aggregation index missing"}"#)
            .create_async()
            .await;

        let err = client(server.url()).run(&envelope()).await.unwrap_err();
        assert_eq!(err, JobError::Failed("aggregation index missing".to_string()));
    }

    #[tokio::test]
    async fn test_submit_returns_task_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jobs")
            .with_status(202)
            .with_header("content-type", "application/json")
            .with_body(r#"{"task_id": "celery-7f3a"}"#)
            .create_async()
            .await;

        let task = client(server.url()).submit(&envelope()).await.unwrap();
        assert_eq!(task, TaskId("celery-7f3a".to_string()));
    }

    #[tokio::test]
    async fn test_submit_unavailable_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jobs")
            .with_status(503)
            .create_async()
            .await;

        let err = client(server.url()).submit(&envelope()).await.unwrap_err();
        assert!(matches!(err, BackendError::Transient(_)));
    }
}
