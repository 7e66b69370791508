// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Type Validation Service
//!
//! Checks operator-supplied type names against one universe of the
//! [`TypeRegistry`]. The universe is resolved at call time, after the
//! configuration for this invocation has been loaded.

use std::collections::HashSet;

use crate::domain::errors::ValidationError;
use crate::domain::registry::TypeRegistry;
use crate::domain::type_name::{TypeName, TypeUniverse};

pub struct TypeValidator;

impl TypeValidator {
    /// Return `raw` unchanged as type names when every entry is a member of
    /// `universe`; otherwise report all offending names at once.
    ///
    /// An empty input validates to an empty list. Falling back to a default
    /// set is left to the caller.
    pub fn validate(
        registry: &dyn TypeRegistry,
        universe: TypeUniverse,
        raw: &[String],
    ) -> Result<Vec<TypeName>, ValidationError> {
        let valid = registry.universe(universe);
        let known: HashSet<&str> = valid.iter().map(TypeName::as_str).collect();

        let mut seen = HashSet::new();
        let invalid: Vec<String> = raw
            .iter()
            .filter(|name| !known.contains(name.as_str()))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();

        if !invalid.is_empty() {
            return Err(ValidationError {
                universe,
                invalid,
                valid,
            });
        }

        Ok(raw.iter().map(|name| TypeName::new(name.clone())).collect())
    }

    /// Validate, substituting `fallback` when nothing was supplied.
    pub fn validate_or<F>(
        registry: &dyn TypeRegistry,
        universe: TypeUniverse,
        raw: &[String],
        fallback: F,
    ) -> Result<Vec<TypeName>, ValidationError>
    where
        F: FnOnce(&dyn TypeRegistry) -> Vec<TypeName>,
    {
        if raw.is_empty() {
            return Ok(fallback(registry));
        }
        Self::validate(registry, universe, raw)
    }
}
