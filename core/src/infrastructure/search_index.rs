// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Search Index HTTP Client
//!
//! Thin client over the Elasticsearch/OpenSearch REST API. Only the calls the
//! control plane needs are covered.
//!
//! # API Endpoints
//!
//! - `GET /_cat/indices/{pattern}?format=json&h=index` - List indices
//! - `HEAD /{index}` - Index existence
//! - `DELETE /{index}` - Delete index
//! - `POST /_bulk` - Bulk index (NDJSON)
//! - `POST /{index}/_delete_by_query` - Delete documents by query
//! - `POST /{index}/_search` - Search

use chrono::NaiveDateTime;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::domain::repository::BackendError;

/// Timestamp format understood by the index's date fields.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub fn format_timestamp(instant: &NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Range filter on `field`; `None` when both sides are unbounded.
pub fn range_filter(
    field: &str,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Option<Value> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let mut bounds = serde_json::Map::new();
    if let Some(start) = start {
        bounds.insert("gte".to_string(), json!(format_timestamp(&start)));
    }
    if let Some(end) = end {
        bounds.insert("lte".to_string(), json!(format_timestamp(&end)));
    }
    Some(json!({ "range": { field: bounds } }))
}

#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source", default)]
    source: Value,
}

pub struct SearchIndexClient {
    client: Client,

    /// Cluster base URL (e.g., "http://localhost:9200")
    base_url: String,

    /// Documents per `_bulk` request
    bulk_batch_size: usize,
}

impl SearchIndexClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        bulk_batch_size: usize,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bulk_batch_size: bulk_batch_size.max(1),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Names of indices matching `pattern`. No match is an empty list.
    pub async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let url = self.build_url(&format!("/_cat/indices/{}?format=json&h=index", pattern));
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let indices: Vec<CatIndex> = response.json().await?;
                let mut names: Vec<String> = indices.into_iter().map(|i| i.index).collect();
                names.sort();
                Ok(names)
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => Err(failure(status, response).await),
        }
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        let response = self.client.head(self.build_url(&format!("/{}", index))).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(failure(status, response).await),
        }
    }

    pub async fn delete_index(&self, index: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.build_url(&format!("/{}", index)))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                debug!(index, "Deleted index");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(BackendError::PartitionNotFound(index.to_string())),
            status => Err(failure(status, response).await),
        }
    }

    /// Index `(id, document)` pairs into `index` in batches.
    /// Returns the number of documents written.
    pub async fn bulk_index(
        &self,
        index: &str,
        documents: &[(String, Value)],
    ) -> Result<u64, BackendError> {
        let mut written = 0u64;

        for batch in documents.chunks(self.bulk_batch_size) {
            let mut body = String::new();
            for (id, document) in batch {
                body.push_str(&serde_json::to_string(&json!({
                    "index": { "_index": index, "_id": id }
                }))?);
                body.push('\n');
                body.push_str(&serde_json::to_string(document)?);
                body.push('\n');
            }

            let response = self
                .client
                .post(self.build_url("/_bulk"))
                .header("Content-Type", "application/x-ndjson")
                .body(body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(failure(status, response).await);
            }

            let result: BulkResponse = response.json().await?;
            if result.errors {
                let first_error = result
                    .items
                    .iter()
                    .find_map(|item| item.get("index").and_then(|op| op.get("error")))
                    .map(Value::to_string)
                    .unwrap_or_else(|| "unknown bulk item failure".to_string());
                return Err(BackendError::Rejected {
                    status: status.as_u16(),
                    body: first_error,
                });
            }

            written += batch.len() as u64;
            debug!(index, batch = batch.len(), written, "Bulk batch indexed");
        }

        Ok(written)
    }

    /// Delete every document in `index` matching `query`.
    /// A missing index deletes nothing.
    pub async fn delete_by_query(&self, index: &str, query: Value) -> Result<u64, BackendError> {
        let response = self
            .client
            .post(self.build_url(&format!(
                "/{}/_delete_by_query?conflicts=proceed&refresh=true",
                index
            )))
            .json(&json!({ "query": query }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let result: DeleteByQueryResponse = response.json().await?;
                Ok(result.deleted)
            }
            StatusCode::NOT_FOUND => Ok(0),
            status => Err(failure(status, response).await),
        }
    }

    /// `_source` of every hit. A missing index yields no hits.
    pub async fn search(&self, index: &str, body: Value) -> Result<Vec<Value>, BackendError> {
        let response = self
            .client
            .post(self.build_url(&format!("/{}/_search", index)))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let result: SearchResponse = response.json().await?;
                Ok(result.hits.hits.into_iter().map(|hit| hit.source).collect())
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => Err(failure(status, response).await),
        }
    }
}

/// Classify a non-success response.
async fn failure(status: StatusCode, response: Response) -> BackendError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| format!("HTTP {}", status));
    if status.is_server_error() {
        BackendError::Transient(format!("HTTP {}: {}", status.as_u16(), body))
    } else {
        BackendError::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    fn client(url: String) -> SearchIndexClient {
        SearchIndexClient::new(url, Duration::from_secs(5), 2).unwrap()
    }

    #[test]
    fn test_range_filter() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let filter = range_filter("timestamp", Some(start), None).unwrap();
        assert_eq!(filter["range"]["timestamp"]["gte"], "2024-01-01T00:00:00.000");
        assert!(filter["range"]["timestamp"].get("lte").is_none());
        assert!(range_filter("timestamp", None, None).is_none());
    }

    #[tokio::test]
    async fn test_list_indices() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/_cat/indices/events-stats-record-view-*")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"index":"events-stats-record-view-2024-02"},{"index":"events-stats-record-view-2024-01"}]"#)
            .create_async()
            .await;

        let names = client(server.url())
            .list_indices("events-stats-record-view-*")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            names,
            vec!["events-stats-record-view-2024-01", "events-stats-record-view-2024-02"]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/stats-file-download-2024-01")
            .with_status(404)
            .with_body(r#"{"error":"index_not_found_exception"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .delete_index("stats-file-download-2024-01")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::PartitionNotFound("stats-file-download-2024-01".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/stats-file-download-2024-01")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(server.url())
            .delete_index("stats-file-download-2024-01")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transient(_)));
    }

    #[tokio::test]
    async fn test_bulk_index_batches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/_bulk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":false,"items":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let documents: Vec<(String, Value)> = (0..3)
            .map(|i| (format!("doc-{i}"), json!({ "n": i })))
            .collect();
        let written = client(server.url())
            .bulk_index("events-stats-record-view-2024-01", &documents)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(written, 3);
    }

    #[tokio::test]
    async fn test_bulk_item_errors_are_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/_bulk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":true,"items":[{"index":{"status":400,"error":{"type":"mapper_parsing_exception"}}}]}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .bulk_index("idx", &[("a".to_string(), json!({}))])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_search_missing_index_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bookmark-record-view/_search")
            .with_status(404)
            .create_async()
            .await;

        let hits = client(server.url())
            .search("bookmark-record-view", json!({}))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
