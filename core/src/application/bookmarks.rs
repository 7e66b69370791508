// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Read path over aggregation bookmarks.

use std::sync::Arc;
use tracing::debug;

use crate::domain::bookmark::{newest_first, Bookmark};
use crate::domain::date_spec::DateRange;
use crate::domain::errors::StatsError;
use crate::domain::registry::AggregationConfig;
use crate::domain::repository::AggregatorFactory;

pub struct BookmarkManager {
    aggregators: Arc<dyn AggregatorFactory>,
}

impl BookmarkManager {
    pub fn new(aggregators: Arc<dyn AggregatorFactory>) -> Self {
        Self { aggregators }
    }

    /// At most `limit` bookmarks within `range`, newest first.
    ///
    /// Ordering and limit are re-applied to whatever the aggregator returns.
    pub async fn list(
        &self,
        config: &AggregationConfig,
        range: &DateRange,
        limit: usize,
    ) -> Result<Vec<Bookmark>, StatsError> {
        let aggregator = self.aggregators.build(config);
        let bookmarks = aggregator
            .list_bookmarks(range.start, range.end, limit)
            .await
            .map_err(|err| {
                metrics::counter!("statsctl_backend_errors_total", "operation" => "list_bookmarks")
                    .increment(1);
                StatsError::backend("list bookmarks", &config.name, err)
            })?;

        debug!(aggregation = %config.name, returned = bookmarks.len(), limit, "Listed bookmarks");
        Ok(newest_first(bookmarks, limit))
    }
}
