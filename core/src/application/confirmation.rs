// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Confirmation gate for destructive commands.

use crate::domain::errors::StatsError;

/// Asks the operator to affirm a destructive operation.
pub trait Confirmation: Send + Sync {
    /// `true` only on an affirmative answer.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation already given on the command line (`--yes-i-know`, `--yes`).
pub struct PreAffirmed;

impl Confirmation for PreAffirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Fail with [`StatsError::ConfirmationAborted`] unless the prompt is accepted.
pub fn require(confirmation: &dyn Confirmation, prompt: &str) -> Result<(), StatsError> {
    if confirmation.confirm(prompt) {
        Ok(())
    } else {
        tracing::info!(prompt, "Destructive operation declined");
        Err(StatsError::ConfirmationAborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Declined;

    impl Confirmation for Declined {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_require() {
        assert!(require(&PreAffirmed, "Delete?").is_ok());
        assert!(require(&Declined, "Delete?").unwrap_err().is_abort());
    }
}
