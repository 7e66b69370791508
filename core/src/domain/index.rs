// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Index Partitions and Lifecycle Requests
//!
//! Stored statistics are partitioned per type name and, for events and
//! aggregations, per calendar month:
//!
//! | Kind | Partition name |
//! |------|----------------|
//! | events | `{prefix}events-stats-{type}-{YYYY}-{MM}` |
//! | aggregations | `{prefix}stats-{type}-{YYYY}-{MM}` |
//! | bookmarks | `{prefix}bookmark-{type}` |
//!
//! A monthly partition is in scope for a request when its month overlaps the
//! requested [`DateRange`]. Bookmark partitions are undated.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::date_spec::{DateFormatError, DateRange};
use crate::domain::type_name::TypeName;

/// Data domain targeted by a delete/restore request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Events,
    Aggregations,
}

impl TargetKind {
    pub fn partition_kind(&self) -> PartitionKind {
        match self {
            TargetKind::Events => PartitionKind::Events,
            TargetKind::Aggregations => PartitionKind::Aggregations,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Events => f.write_str("events"),
            TargetKind::Aggregations => f.write_str("aggregations"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    Events,
    Aggregations,
    Bookmarks,
}

impl PartitionKind {
    pub fn is_monthly(&self) -> bool {
        !matches!(self, PartitionKind::Bookmarks)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PartitionKind::Events => "event",
            PartitionKind::Aggregations => "aggregation",
            PartitionKind::Bookmarks => "bookmark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPartition {
    pub name: String,
    pub kind: PartitionKind,
    pub type_name: TypeName,
    /// First day of the partition's month; `None` for bookmark partitions.
    pub month: Option<NaiveDate>,
}

impl fmt::Display for IndexPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builds and recognises partition names under a deployment prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexNaming {
    prefix: String,
}

impl IndexNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn base(&self, kind: PartitionKind, type_name: &TypeName) -> String {
        let stem = match kind {
            PartitionKind::Events => "events-stats",
            PartitionKind::Aggregations => "stats",
            PartitionKind::Bookmarks => "bookmark",
        };
        format!("{}{}-{}", self.prefix, stem, type_name)
    }

    /// Wildcard matching every partition of a type (exact name for bookmarks).
    pub fn pattern(&self, kind: PartitionKind, type_name: &TypeName) -> String {
        let base = self.base(kind, type_name);
        if kind.is_monthly() {
            format!("{}-*", base)
        } else {
            base
        }
    }

    pub fn bookmark_partition(&self, type_name: &TypeName) -> IndexPartition {
        IndexPartition {
            name: self.base(PartitionKind::Bookmarks, type_name),
            kind: PartitionKind::Bookmarks,
            type_name: type_name.clone(),
            month: None,
        }
    }

    /// Partition that holds a document stamped with `timestamp`.
    pub fn partition_for(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        timestamp: &NaiveDateTime,
    ) -> IndexPartition {
        if !kind.is_monthly() {
            return self.bookmark_partition(type_name);
        }
        let month = timestamp.date().with_day(1);
        IndexPartition {
            name: format!(
                "{}-{:04}-{:02}",
                self.base(kind, type_name),
                timestamp.year(),
                timestamp.month()
            ),
            kind,
            type_name: type_name.clone(),
            month,
        }
    }

    /// Recognise an index name as a partition of `type_name`.
    ///
    /// Names whose suffix is not exactly `YYYY-MM` are rejected, so
    /// `stats-file-download-2024-01` is never mistaken for a partition of
    /// the `file` type.
    pub fn parse_partition(
        &self,
        kind: PartitionKind,
        type_name: &TypeName,
        index_name: &str,
    ) -> Option<IndexPartition> {
        let base = self.base(kind, type_name);
        if !kind.is_monthly() {
            return (index_name == base).then(|| self.bookmark_partition(type_name));
        }

        let suffix = index_name.strip_prefix(&base)?.strip_prefix('-')?;
        let (year, month) = suffix.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let first_day = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;

        Some(IndexPartition {
            name: index_name.to_string(),
            kind,
            type_name: type_name.clone(),
            month: Some(first_day),
        })
    }

    /// Whether a partition falls inside `range`. Bookmark partitions always do.
    pub fn in_range(partition: &IndexPartition, range: &DateRange) -> bool {
        match partition.month {
            Some(month) => range.overlaps_month(month.year(), month.month()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAction {
    Delete,
    Restore,
}

impl IndexAction {
    pub fn verb(&self) -> &'static str {
        match self {
            IndexAction::Delete => "delete",
            IndexAction::Restore => "restore",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            IndexAction::Delete => "deleted",
            IndexAction::Restore => "restored",
        }
    }
}

/// One delete or restore invocation. Built per command, consumed once.
///
/// Dates are kept as the operator's verified text and re-parsed by
/// [`IndexRequest::range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    pub action: IndexAction,
    pub target: TargetKind,
    pub types: Vec<TypeName>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Also act on the bookmark partition (aggregations only).
    pub bookmark: bool,
    /// Downgrade backend errors to warnings and keep going.
    pub force: bool,
    /// Narrate planned operations before executing them.
    pub verbose: bool,
}

pub type DeletionRequest = IndexRequest;
pub type RestoreRequest = IndexRequest;

impl IndexRequest {
    pub fn range(&self) -> Result<DateRange, DateFormatError> {
        DateRange::from_text(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn includes_bookmarks(&self) -> bool {
        self.bookmark && self.target == TargetKind::Aggregations
    }
}

/// What happened to one type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeOutcome {
    pub type_name: TypeName,
    /// Partitions that were deleted or restored.
    pub partitions: Vec<String>,
    /// Documents written during restore.
    pub documents: u64,
    /// Backend errors downgraded under `force`.
    pub warnings: Vec<String>,
}

impl TypeOutcome {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub action: IndexAction,
    pub target: TargetKind,
    pub outcomes: Vec<TypeOutcome>,
}

impl LifecycleReport {
    pub fn partitions(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .flat_map(|outcome| outcome.partitions.iter().map(String::as_str))
    }

    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.warnings.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_names() {
        let naming = IndexNaming::new("prod-");
        let ty = TypeName::from("file-download");
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(10, 0, 0).unwrap();

        assert_eq!(
            naming.partition_for(PartitionKind::Events, &ty, &ts).name,
            "prod-events-stats-file-download-2024-03"
        );
        assert_eq!(
            naming.partition_for(PartitionKind::Aggregations, &ty, &ts).name,
            "prod-stats-file-download-2024-03"
        );
        assert_eq!(naming.bookmark_partition(&ty).name, "prod-bookmark-file-download");
        assert_eq!(
            naming.pattern(PartitionKind::Events, &ty),
            "prod-events-stats-file-download-*"
        );
    }

    #[test]
    fn test_parse_partition_rejects_other_types() {
        let naming = IndexNaming::default();
        let file = TypeName::from("file");

        assert!(naming
            .parse_partition(PartitionKind::Aggregations, &file, "stats-file-download-2024-01")
            .is_none());

        let parsed = naming
            .parse_partition(PartitionKind::Aggregations, &file, "stats-file-2024-01")
            .unwrap();
        assert_eq!(parsed.month, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_parse_partition_rejects_bad_suffix() {
        let naming = IndexNaming::default();
        let ty = TypeName::from("record-view");
        for name in [
            "events-stats-record-view",
            "events-stats-record-view-2024",
            "events-stats-record-view-2024-13",
            "events-stats-record-view-2024-1",
            "events-stats-record-view-backup",
        ] {
            assert!(naming.parse_partition(PartitionKind::Events, &ty, name).is_none(), "{name}");
        }
    }

    #[test]
    fn test_in_range() {
        let naming = IndexNaming::default();
        let ty = TypeName::from("record-view");
        let range = DateRange::from_text(Some("2024-02"), Some("2024-03")).unwrap();

        let jan = naming.parse_partition(PartitionKind::Events, &ty, "events-stats-record-view-2024-01").unwrap();
        let mar = naming.parse_partition(PartitionKind::Events, &ty, "events-stats-record-view-2024-03").unwrap();

        assert!(!IndexNaming::in_range(&jan, &range));
        assert!(IndexNaming::in_range(&mar, &range));
        assert!(IndexNaming::in_range(&naming.bookmark_partition(&ty), &range));
    }

    #[test]
    fn test_type_outcome_starts_empty() {
        let outcome = TypeOutcome::new(TypeName::from("record-view"));
        assert_eq!(outcome.type_name.as_str(), "record-view");
        assert!(outcome.partitions.is_empty());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.documents, 0);
        assert_eq!(TypeName::default().as_str(), "");
    }
}
