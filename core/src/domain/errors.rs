// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Error Taxonomy
//!
//! | Variant | Raised | Operator effect |
//! |---------|--------|-----------------|
//! | `Validation`, `DateFormat` | pre-flight, before any side effect | fatal |
//! | `ConfirmationAborted` | destructive prompt declined | clean abort, nothing touched |
//! | `JobExecution` | eager dispatch only | fatal |
//! | `Backend` | delete/restore/list/submit | fatal unless downgraded by `force` |

use thiserror::Error;

use crate::domain::date_spec::DateFormatError;
use crate::domain::repository::{BackendError, JobError};
use crate::domain::type_name::{TypeName, TypeUniverse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid {} type(s): {}. Valid values: {}",
    .universe,
    join(.invalid),
    join(.valid)
)]
pub struct ValidationError {
    pub universe: TypeUniverse,
    /// Every offending name, once each, in the order first supplied.
    pub invalid: Vec<String>,
    /// The whole universe the names were checked against.
    pub valid: Vec<TypeName>,
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DateFormat(#[from] DateFormatError),

    #[error("Aborted!")]
    ConfirmationAborted,

    #[error("Job {job} failed: {source}")]
    JobExecution {
        job: String,
        #[source]
        source: JobError,
    },

    #[error("{operation} failed for '{type_name}': {source}")]
    Backend {
        operation: String,
        type_name: String,
        #[source]
        source: BackendError,
    },

    #[error("No configuration registered for aggregation '{0}'")]
    MissingAggregation(TypeName),
}

impl StatsError {
    pub fn backend(operation: impl Into<String>, type_name: impl ToString, source: BackendError) -> Self {
        StatsError::Backend {
            operation: operation.into(),
            type_name: type_name.to_string(),
            source,
        }
    }

    /// Operator declined; not a failure of the system.
    pub fn is_abort(&self) -> bool {
        matches!(self, StatsError::ConfirmationAborted)
    }
}
