// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `IndexBackend` over the search index and the record store.
//!
//! Deletion works on partitions that exist in the index. Restore plans from
//! the record store (one partition per month holding rows) and replays each
//! month's rows, clipped to the requested range, into its partition.

use async_trait::async_trait;
use chrono::{Datelike, NaiveTime};
use std::sync::Arc;
use tracing::debug;

use crate::domain::date_spec::DateRange;
use crate::domain::index::{IndexNaming, IndexPartition, PartitionKind};
use crate::domain::repository::{BackendError, IndexBackend, RecordStore};
use crate::domain::type_name::TypeName;
use crate::infrastructure::search_index::SearchIndexClient;

pub struct SearchIndexBackend {
    index: Arc<SearchIndexClient>,
    store: Option<Arc<dyn RecordStore>>,
    naming: IndexNaming,
}

impl SearchIndexBackend {
    pub fn new(
        index: Arc<SearchIndexClient>,
        store: Option<Arc<dyn RecordStore>>,
        naming: IndexNaming,
    ) -> Self {
        Self {
            index,
            store,
            naming,
        }
    }

    fn store(&self) -> Result<&Arc<dyn RecordStore>, BackendError> {
        self.store
            .as_ref()
            .ok_or_else(|| BackendError::Store("record store is not configured".to_string()))
    }
}

#[async_trait]
impl IndexBackend for SearchIndexBackend {
    async fn list_partitions(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError> {
        if !kind.is_monthly() {
            let partition = self.naming.bookmark_partition(type_name);
            return Ok(if self.index.index_exists(&partition.name).await? {
                vec![partition]
            } else {
                Vec::new()
            });
        }

        let names = self.index.list_indices(&self.naming.pattern(kind, type_name)).await?;
        let partitions: Vec<IndexPartition> = names
            .iter()
            .filter_map(|name| self.naming.parse_partition(kind, type_name, name))
            .filter(|partition| IndexNaming::in_range(partition, range))
            .collect();

        debug!(
            type_name = %type_name,
            listed = names.len(),
            selected = partitions.len(),
            "Listed partitions"
        );
        Ok(partitions)
    }

    async fn delete_partition(&self, partition: &IndexPartition) -> Result<(), BackendError> {
        self.index.delete_index(&partition.name).await
    }

    async fn restore_plan(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<IndexPartition>, BackendError> {
        let months = self.store()?.record_months(kind, type_name, range).await?;

        if !kind.is_monthly() {
            return Ok(if months.is_empty() {
                Vec::new()
            } else {
                vec![self.naming.bookmark_partition(type_name)]
            });
        }

        let mut partitions: Vec<IndexPartition> = months
            .iter()
            .map(|month| self.naming.partition_for(kind, type_name, &month.and_time(NaiveTime::MIN)))
            .collect();
        partitions.dedup_by(|a, b| a.name == b.name);
        Ok(partitions)
    }

    async fn restore_partition(
        &self,
        partition: &IndexPartition,
        range: &DateRange,
    ) -> Result<u64, BackendError> {
        let window = match partition.month {
            Some(month) => match DateRange::month(month.year(), month.month()) {
                Some(whole_month) => range.intersect(&whole_month),
                None => *range,
            },
            None => *range,
        };

        let records = self
            .store()?
            .fetch_records(partition.kind, &partition.type_name, &window)
            .await?;
        let documents: Vec<(String, serde_json::Value)> = records
            .into_iter()
            .map(|record| (record.id, record.document))
            .collect();

        debug!(partition = %partition, %window, documents = documents.len(), "Replaying records");
        self.index.bulk_index(&partition.name, &documents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use mockito::Matcher;
    use parking_lot::Mutex;
    use std::time::Duration;

    use crate::domain::repository::StoredRecord;

    struct FixedStore {
        months: Vec<NaiveDate>,
        records: Vec<StoredRecord>,
        fetched: Mutex<Vec<DateRange>>,
    }

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn record_months(
            &self,
            _kind: PartitionKind,
            _type_name: &TypeName,
            _range: &DateRange,
        ) -> Result<Vec<NaiveDate>, BackendError> {
            Ok(self.months.clone())
        }

        async fn fetch_records(
            &self,
            _kind: PartitionKind,
            _type_name: &TypeName,
            range: &DateRange,
        ) -> Result<Vec<StoredRecord>, BackendError> {
            self.fetched.lock().push(*range);
            Ok(self
                .records
                .iter()
                .filter(|record| range.contains(&record.timestamp))
                .cloned()
                .collect())
        }
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn backend(url: String, store: Option<Arc<dyn RecordStore>>) -> SearchIndexBackend {
        let index = SearchIndexClient::new(url, Duration::from_secs(5), 100).unwrap();
        SearchIndexBackend::new(Arc::new(index), store, IndexNaming::default())
    }

    #[tokio::test]
    async fn test_list_partitions_filters_by_range_and_type() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/_cat/indices/events-stats-record-view-*")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"index":"events-stats-record-view-2024-01"},
                    {"index":"events-stats-record-view-2024-02"},
                    {"index":"events-stats-record-view-2024-03"},
                    {"index":"events-stats-record-view-backup"}
                ]"#,
            )
            .create_async()
            .await;

        let range = DateRange::from_text(Some("2024-02"), None).unwrap();
        let partitions = backend(server.url(), None)
            .list_partitions(PartitionKind::Events, &TypeName::from("record-view"), &range)
            .await
            .unwrap();

        let names: Vec<&str> = partitions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["events-stats-record-view-2024-02", "events-stats-record-view-2024-03"]
        );
    }

    #[tokio::test]
    async fn test_bookmark_partition_listed_only_when_present() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/bookmark-record-view")
            .with_status(404)
            .create_async()
            .await;

        let partitions = backend(server.url(), None)
            .list_partitions(
                PartitionKind::Bookmarks,
                &TypeName::from("record-view"),
                &DateRange::unbounded(),
            )
            .await
            .unwrap();
        assert!(partitions.is_empty());
    }

    #[tokio::test]
    async fn test_restore_clips_each_month_to_range() {
        let mut server = mockito::Server::new_async().await;
        let bulk = server
            .mock("POST", "/_bulk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":false,"items":[]}"#)
            .create_async()
            .await;

        let store = Arc::new(FixedStore {
            months: vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
            records: vec![
                StoredRecord {
                    id: "a".to_string(),
                    timestamp: at(2024, 1, 5),
                    document: serde_json::json!({"n": 1}),
                },
                StoredRecord {
                    id: "b".to_string(),
                    timestamp: at(2024, 1, 20),
                    document: serde_json::json!({"n": 2}),
                },
            ],
            fetched: Mutex::new(Vec::new()),
        });
        let backend = backend(server.url(), Some(store.clone() as Arc<dyn RecordStore>));
        let ty = TypeName::from("file-download");
        let range = DateRange::from_text(Some("2024-01-15"), None).unwrap();

        let plan = backend
            .restore_plan(PartitionKind::Events, &ty, &range)
            .await
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].name, "events-stats-file-download-2024-01");

        let written = backend.restore_partition(&plan[0], &range).await.unwrap();
        bulk.assert_async().await;
        assert_eq!(written, 1);

        let fetched = store.fetched.lock();
        assert_eq!(fetched[0].start, Some(at(2024, 1, 15) - chrono::TimeDelta::hours(12)));
    }

    #[tokio::test]
    async fn test_restore_without_store_is_a_store_error() {
        let backend = backend("http://127.0.0.1:1".to_string(), None);
        let err = backend
            .restore_plan(PartitionKind::Events, &TypeName::from("x"), &DateRange::unbounded())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Store(_)));
    }
}
