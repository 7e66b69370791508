// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod search_index;
pub mod record_store;
pub mod lifecycle_backend;
pub mod aggregator;
pub mod pipeline_client;

pub use search_index::SearchIndexClient;
pub use record_store::PostgresRecordStore;
pub use lifecycle_backend::SearchIndexBackend;
pub use aggregator::{SearchIndexAggregator, SearchIndexAggregatorFactory};
pub use pipeline_client::PipelineClient;
