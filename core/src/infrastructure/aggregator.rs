// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Aggregator capabilities backed by the search index.
//!
//! Aggregated documents live in `aggregation_index` and carry the window
//! timestamp in `timestamp_field`. Bookmarks live in `bookmark_index` as
//! `{ "aggregation_type": <name>, <bookmark_field>: <date> }`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::bookmark::Bookmark;
use crate::domain::registry::AggregationConfig;
use crate::domain::repository::{Aggregator, AggregatorFactory, BackendError};
use crate::infrastructure::search_index::{range_filter, SearchIndexClient};

pub struct SearchIndexAggregator {
    index: Arc<SearchIndexClient>,
    config: AggregationConfig,
}

impl SearchIndexAggregator {
    pub fn new(index: Arc<SearchIndexClient>, config: AggregationConfig) -> Self {
        Self { index, config }
    }

    fn bookmark_query(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Value {
        let mut filters = vec![json!({ "term": { "aggregation_type": self.config.name.as_str() } })];
        if let Some(range) = range_filter(&self.config.bookmark_field, start, end) {
            filters.push(range);
        }
        json!({ "bool": { "filter": filters } })
    }
}

#[async_trait]
impl Aggregator for SearchIndexAggregator {
    /// Removes aggregated documents in range, then the bookmarks in range so
    /// the next run recomputes the window.
    async fn delete(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<u64, BackendError> {
        let query = range_filter(&self.config.timestamp_field, start, end)
            .unwrap_or_else(|| json!({ "match_all": {} }));
        let deleted = self
            .index
            .delete_by_query(&self.config.aggregation_index, query)
            .await?;

        let bookmarks = self
            .index
            .delete_by_query(&self.config.bookmark_index, self.bookmark_query(start, end))
            .await?;

        debug!(aggregation = %self.config.name, deleted, bookmarks, "Aggregator delete finished");
        Ok(deleted)
    }

    async fn list_bookmarks(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BackendError> {
        let body = json!({
            "query": self.bookmark_query(start, end),
            "sort": [{ self.config.bookmark_field.as_str(): { "order": "desc" } }],
            "size": limit,
        });

        let hits = self.index.search(&self.config.bookmark_index, body).await?;
        let mut bookmarks = Vec::with_capacity(hits.len());
        for hit in hits {
            let raw = hit.get(&self.config.bookmark_field).and_then(Value::as_str);
            match raw.and_then(parse_bookmark_date) {
                Some(date) => bookmarks.push(Bookmark {
                    aggregation: self.config.name.clone(),
                    date,
                }),
                None => warn!(aggregation = %self.config.name, document = %hit, "Skipping bookmark without a readable date"),
            }
        }
        Ok(bookmarks)
    }
}

/// Bookmark dates are stored as ISO-8601 with or without offset, or as a bare date.
fn parse_bookmark_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Builds [`SearchIndexAggregator`]s sharing one client.
pub struct SearchIndexAggregatorFactory {
    index: Arc<SearchIndexClient>,
}

impl SearchIndexAggregatorFactory {
    pub fn new(index: Arc<SearchIndexClient>) -> Self {
        Self { index }
    }
}

impl AggregatorFactory for SearchIndexAggregatorFactory {
    fn build(&self, config: &AggregationConfig) -> Arc<dyn Aggregator> {
        Arc::new(SearchIndexAggregator::new(self.index.clone(), config.clone()))
    }
}
