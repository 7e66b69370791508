// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Record Store
//!
//! Authoritative statistics rows replayed by restore.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `RecordStore` over three tables sharing one shape:
//!
//! ```sql
//! CREATE TABLE stats_events (
//!     id        TEXT PRIMARY KEY,
//!     type_name TEXT NOT NULL,
//!     timestamp TIMESTAMP NOT NULL,
//!     document  JSONB NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::date_spec::DateRange;
use crate::domain::index::PartitionKind;
use crate::domain::repository::{BackendError, RecordStore, StoredRecord};
use crate::domain::stats_config::RecordStoreConfig;
use crate::domain::type_name::TypeName;

/// Table per partition kind.
#[derive(Debug, Clone)]
pub struct RecordTables {
    pub events: String,
    pub aggregations: String,
    pub bookmarks: String,
}

impl RecordTables {
    pub fn from_config(config: &RecordStoreConfig) -> anyhow::Result<Self> {
        let tables = Self {
            events: config.events_table.clone(),
            aggregations: config.aggregations_table.clone(),
            bookmarks: config.bookmarks_table.clone(),
        };
        for table in [&tables.events, &tables.aggregations, &tables.bookmarks] {
            if !is_identifier(table) {
                anyhow::bail!("Invalid record store table name: '{}'", table);
            }
        }
        Ok(tables)
    }

    fn for_kind(&self, kind: PartitionKind) -> &str {
        match kind {
            PartitionKind::Events => &self.events,
            PartitionKind::Aggregations => &self.aggregations,
            PartitionKind::Bookmarks => &self.bookmarks,
        }
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z0-9_.]` is allowed.
fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

pub struct PostgresRecordStore {
    pool: PgPool,
    tables: RecordTables,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool, tables: RecordTables) -> Self {
        Self { pool, tables }
    }

    /// Build a lazily connecting pool; nothing is dialled until the first query.
    pub fn connect_lazy(url: &str, config: &RecordStoreConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(url)?;
        Ok(Self::new(pool, RecordTables::from_config(config)?))
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn record_months(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        let sql = format!(
            r#"
            SELECT DISTINCT date_trunc('month', timestamp) AS month
            FROM {}
            WHERE type_name = $1
              AND ($2::timestamp IS NULL OR timestamp >= $2)
              AND ($3::timestamp IS NULL OR timestamp <= $3)
            ORDER BY month
            "#,
            self.tables.for_kind(kind)
        );

        let rows = sqlx::query(&sql)
            .bind(type_name.as_str())
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

        let mut months = Vec::with_capacity(rows.len());
        for row in rows {
            let month: NaiveDateTime = row.try_get("month")?;
            months.push(month.date());
        }
        Ok(months)
    }

    async fn fetch_records(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        range: &DateRange,
    ) -> Result<Vec<StoredRecord>, BackendError> {
        let sql = format!(
            r#"
            SELECT id, timestamp, document
            FROM {}
            WHERE type_name = $1
              AND ($2::timestamp IS NULL OR timestamp >= $2)
              AND ($3::timestamp IS NULL OR timestamp <= $3)
            ORDER BY timestamp ASC
            "#,
            self.tables.for_kind(kind)
        );

        let rows = sqlx::query(&sql)
            .bind(type_name.as_str())
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(StoredRecord {
                id: row.try_get("id")?,
                timestamp: row.try_get("timestamp")?,
                document: row.try_get("document")?,
            });
        }
        Ok(records)
    }
}
