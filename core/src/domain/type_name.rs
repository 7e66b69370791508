// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Type names and the universes they are validated against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an event kind (`file-download`) or aggregation kind (`record-view-agg`).
///
/// A `TypeName` carries no proof of membership in any registry; membership is
/// established by [`crate::application::type_validator::TypeValidator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Validation context for operator-supplied type names.
///
/// The two universes are distinct even when they contain the same literal
/// string: `record-view` may be both an event kind and an aggregation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeUniverse {
    Events,
    Aggregations,
}

impl TypeUniverse {
    /// Noun used in operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            TypeUniverse::Events => "event",
            TypeUniverse::Aggregations => "aggregation",
        }
    }
}

impl fmt::Display for TypeUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
