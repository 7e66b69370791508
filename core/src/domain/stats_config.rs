// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Stats Configuration Types
//
// Defines the configuration manifest for a statsctl deployment:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Enabled event kinds and aggregation kinds (the type registry)
// - Fallback list of physical aggregation indexes
// - Search index, record store and pipeline endpoints
//
// The manifest is loaded once per invocation and passed explicitly to every
// component that needs the registry; there is no process-wide state.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::index::{IndexNaming, PartitionKind};
use crate::domain::registry::{AggregationConfig, TypeRegistry};
use crate::domain::type_name::TypeName;

pub const API_VERSION: &str = "statsctl/v1";
pub const KIND: &str = "StatsConfig";

/// Top-level configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfigManifest {
    /// API version (must be "statsctl/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "StatsConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: StatsConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfigSpec {
    /// Event kinds known to the pipeline
    #[serde(default)]
    pub events: Vec<EventTypeConfig>,

    /// Aggregation kinds known to the pipeline
    #[serde(default)]
    pub aggregations: Vec<AggregationTypeConfig>,

    /// Physical aggregation index names (keyed by event kind) used when
    /// `aggregations delete-index` / `aggregations restore` get no types
    #[serde(default)]
    pub aggregation_indexes: Vec<String>,

    #[serde(default)]
    pub search_index: SearchIndexConfig,

    #[serde(default)]
    pub record_store: RecordStoreConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTypeConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationTypeConfig {
    pub name: String,

    /// Event kind this aggregation is computed from
    pub event: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Override for the aggregated documents index (default: `{prefix}stats-{event}-*`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_index: Option<String>,

    /// Override for the bookmark index (default: `{prefix}bookmark-{event}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark_index: Option<String>,

    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    #[serde(default = "default_bookmark_field")]
    pub bookmark_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndexConfig {
    /// Base URL of the search cluster
    #[serde(default = "default_search_url")]
    pub url: String,

    /// Prefix prepended to every index name
    #[serde(default)]
    pub index_prefix: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Documents per `_bulk` request during restore
    #[serde(default = "default_bulk_batch_size")]
    pub bulk_batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStoreConfig {
    /// PostgreSQL URL (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_events_table")]
    pub events_table: String,

    #[serde(default = "default_aggregations_table")]
    pub aggregations_table: String,

    #[serde(default = "default_bookmarks_table")]
    pub bookmarks_table: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the pipeline job API
    #[serde(default = "default_pipeline_url")]
    pub url: String,

    /// Timeout for deferred submission; eager runs wait without limit
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timestamp_field() -> String {
    "timestamp".to_string()
}

fn default_bookmark_field() -> String {
    "date".to_string()
}

fn default_search_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bulk_batch_size() -> usize {
    500
}

fn default_events_table() -> String {
    "stats_events".to_string()
}

fn default_aggregations_table() -> String {
    "stats_aggregations".to_string()
}

fn default_bookmarks_table() -> String {
    "stats_bookmarks".to_string()
}

fn default_max_connections() -> u32 {
    2
}

fn default_pipeline_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_submit_timeout() -> u64 {
    10
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            index_prefix: String::new(),
            timeout_secs: default_timeout_secs(),
            bulk_batch_size: default_bulk_batch_size(),
        }
    }
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            events_table: default_events_table(),
            aggregations_table: default_aggregations_table(),
            bookmarks_table: default_bookmarks_table(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: default_pipeline_url(),
            submit_timeout_secs: default_submit_timeout(),
        }
    }
}

impl Default for StatsConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "statsctl".to_string(),
                version: None,
                labels: None,
            },
            spec: StatsConfigSpec::default(),
        }
    }
}

impl StatsConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Locations checked by [`Self::discover_config`], in precedence order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var("STATSCTL_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./statsctl.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".statsctl").join("config.yaml"));
        }
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/statsctl/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\statsctl\\config.yaml"));
        paths
    }

    /// Discover configuration file using precedence order
    /// 1. STATSCTL_CONFIG_PATH environment variable
    /// 2. ./statsctl.yaml (working directory)
    /// 3. ~/.statsctl/config.yaml (user home)
    /// 4. /etc/statsctl/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(&config_path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", config_path, e)
            })?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using empty defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STATSCTL_SEARCH_URL") {
            tracing::info!("Environment override: STATSCTL_SEARCH_URL");
            self.spec.search_index.url = val;
        }
        if let Ok(val) = std::env::var("STATSCTL_INDEX_PREFIX") {
            tracing::info!("Environment override: STATSCTL_INDEX_PREFIX={}", val);
            self.spec.search_index.index_prefix = val;
        }
        if let Ok(val) = std::env::var("STATSCTL_DATABASE_URL") {
            tracing::info!("Environment override: STATSCTL_DATABASE_URL");
            self.spec.record_store.url = Some(val);
        }
        if let Ok(val) = std::env::var("STATSCTL_PIPELINE_URL") {
            tracing::info!("Environment override: STATSCTL_PIPELINE_URL");
            self.spec.pipeline.url = val;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let mut events = HashSet::new();
        for event in &self.spec.events {
            if event.name.trim().is_empty() {
                anyhow::bail!("Event name cannot be empty");
            }
            if !events.insert(event.name.as_str()) {
                anyhow::bail!("Duplicate event type: {}", event.name);
            }
        }

        let enabled_events: HashSet<&str> = self
            .spec
            .events
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.name.as_str())
            .collect();

        let mut aggregations = HashSet::new();
        for aggregation in &self.spec.aggregations {
            if aggregation.name.trim().is_empty() {
                anyhow::bail!("Aggregation name cannot be empty");
            }
            if !aggregations.insert(aggregation.name.as_str()) {
                anyhow::bail!("Duplicate aggregation type: {}", aggregation.name);
            }
            if aggregation.enabled && !enabled_events.contains(aggregation.event.as_str()) {
                anyhow::bail!(
                    "Aggregation '{}' references event '{}' which is not an enabled event type",
                    aggregation.name,
                    aggregation.event
                );
            }
        }

        for index in &self.spec.aggregation_indexes {
            if !enabled_events.contains(index.as_str()) {
                anyhow::bail!(
                    "aggregation_indexes entry '{}' is not an enabled event type",
                    index
                );
            }
        }

        if self.spec.search_index.url.is_empty() {
            anyhow::bail!("spec.search_index.url cannot be empty");
        }
        if self.spec.search_index.bulk_batch_size == 0 {
            anyhow::bail!("spec.search_index.bulk_batch_size must be greater than zero");
        }
        if self.spec.pipeline.url.is_empty() {
            anyhow::bail!("spec.pipeline.url cannot be empty");
        }

        Ok(())
    }

    pub fn naming(&self) -> IndexNaming {
        IndexNaming::new(self.spec.search_index.index_prefix.clone())
    }

    /// Record store URL with any `env:VAR` reference resolved.
    pub fn record_store_url(&self) -> anyhow::Result<String> {
        let Some(url) = &self.spec.record_store.url else {
            anyhow::bail!(
                "spec.record_store.url is not configured (set it or STATSCTL_DATABASE_URL)"
            );
        };
        resolve_env_reference(url)
    }
}

/// Resolve `env:VAR_NAME` to the variable's value; other strings pass through.
pub fn resolve_env_reference(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix("env:") {
        Some(var) => std::env::var(var)
            .map_err(|_| anyhow::anyhow!("Environment variable '{}' is not set", var)),
        None => Ok(value.to_string()),
    }
}

impl TypeRegistry for StatsConfigManifest {
    fn enabled_events(&self) -> Vec<TypeName> {
        self.spec
            .events
            .iter()
            .filter(|e| e.enabled)
            .map(|e| TypeName::new(e.name.clone()))
            .collect()
    }

    fn enabled_aggregations(&self) -> Vec<TypeName> {
        self.spec
            .aggregations
            .iter()
            .filter(|a| a.enabled)
            .map(|a| TypeName::new(a.name.clone()))
            .collect()
    }

    fn aggregation_index_names(&self) -> Vec<TypeName> {
        self.spec
            .aggregation_indexes
            .iter()
            .map(|name| TypeName::new(name.clone()))
            .collect()
    }

    fn aggregation_config(&self, name: &TypeName) -> Option<AggregationConfig> {
        let naming = self.naming();
        self.spec
            .aggregations
            .iter()
            .find(|a| a.enabled && a.name == name.as_str())
            .map(|a| {
                let event = TypeName::new(a.event.clone());
                AggregationConfig {
                    name: name.clone(),
                    aggregation_index: a
                        .aggregation_index
                        .clone()
                        .unwrap_or_else(|| naming.pattern(PartitionKind::Aggregations, &event)),
                    bookmark_index: a
                        .bookmark_index
                        .clone()
                        .unwrap_or_else(|| naming.base(PartitionKind::Bookmarks, &event)),
                    timestamp_field: a.timestamp_field.clone(),
                    bookmark_field: a.bookmark_field.clone(),
                    event,
                }
            })
    }
}
