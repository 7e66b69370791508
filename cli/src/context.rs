// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-invocation wiring.
//!
//! Loads the configuration once and builds the command service from it.
//! Nothing here outlives the command being run.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use statsctl_core::application::StatsCommandService;
use statsctl_core::infrastructure::{
    PipelineClient, PostgresRecordStore, SearchIndexAggregatorFactory, SearchIndexBackend,
    SearchIndexClient,
};
use statsctl_core::repository::RecordStore;
use statsctl_core::stats_config::StatsConfigManifest;

/// Which optional collaborators a command needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Requirements {
    /// Restore replays rows from the record store.
    pub record_store: bool,
}

impl Requirements {
    pub fn restore() -> Self {
        Self { record_store: true }
    }
}

pub struct StatsContext {
    pub config: StatsConfigManifest,
    pub service: StatsCommandService,
}

impl StatsContext {
    pub fn build(config_path: Option<PathBuf>, requirements: Requirements) -> Result<Self> {
        let config = StatsConfigManifest::load_or_default(config_path)
            .context("Failed to load configuration")?;
        config
            .validate()
            .context("Configuration validation failed")?;

        let search = &config.spec.search_index;
        let index = Arc::new(
            SearchIndexClient::new(
                search.url.clone(),
                Duration::from_secs(search.timeout_secs),
                search.bulk_batch_size,
            )
            .context("Failed to create search index client")?,
        );

        let pipeline = Arc::new(
            PipelineClient::new(
                config.spec.pipeline.url.clone(),
                Duration::from_secs(config.spec.pipeline.submit_timeout_secs),
            )
            .context("Failed to create pipeline client")?,
        );

        let store: Option<Arc<dyn RecordStore>> = if requirements.record_store {
            let url = config.record_store_url()?;
            let store = PostgresRecordStore::connect_lazy(&url, &config.spec.record_store)
                .context("Failed to configure record store")?;
            Some(Arc::new(store) as Arc<dyn RecordStore>)
        } else {
            None
        };

        debug!(
            search_url = %search.url,
            pipeline_url = %config.spec.pipeline.url,
            record_store = store.is_some(),
            "Wired statsctl services"
        );

        let backend = Arc::new(SearchIndexBackend::new(index.clone(), store, config.naming()));
        let aggregators = Arc::new(SearchIndexAggregatorFactory::new(index));
        let service = StatsCommandService::new(
            Arc::new(config.clone()),
            pipeline.clone(),
            pipeline,
            backend,
            aggregators,
        );

        Ok(Self { config, service })
    }
}
