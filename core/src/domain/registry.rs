// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Registry of enabled event and aggregation kinds.
//!
//! The registry is configuration-derived: a fresh one is built for every
//! invocation from the loaded [`crate::domain::stats_config::StatsConfigManifest`].

use serde::{Deserialize, Serialize};

use crate::domain::type_name::{TypeName, TypeUniverse};

/// Parameters needed to instantiate an aggregator for one aggregation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Aggregation kind name.
    pub name: TypeName,
    /// Event kind the aggregation is computed from.
    pub event: TypeName,
    /// Index (or alias/pattern) holding aggregated documents.
    pub aggregation_index: String,
    /// Index holding the bookmark documents for this kind.
    pub bookmark_index: String,
    /// Document field carrying the aggregation window timestamp.
    pub timestamp_field: String,
    /// Document field carrying the bookmark date.
    pub bookmark_field: String,
}

pub trait TypeRegistry: Send + Sync {
    /// Enabled event kinds, in configuration order.
    fn enabled_events(&self) -> Vec<TypeName>;

    /// Enabled aggregation kinds, in configuration order.
    fn enabled_aggregations(&self) -> Vec<TypeName>;

    /// Physical aggregation index names used when `delete-index`/`restore`
    /// are invoked without explicit types.
    fn aggregation_index_names(&self) -> Vec<TypeName>;

    fn aggregation_config(&self, name: &TypeName) -> Option<AggregationConfig>;

    /// Members of a validation universe.
    fn universe(&self, universe: TypeUniverse) -> Vec<TypeName> {
        match universe {
            TypeUniverse::Events => self.enabled_events(),
            TypeUniverse::Aggregations => self.enabled_aggregations(),
        }
    }
}
