// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Interactive confirmation for destructive commands.

use colored::Colorize;
use dialoguer::Confirm;

use statsctl_core::application::{Confirmation, PreAffirmed};

/// Asks on the terminal. No TTY, or any prompt error, counts as "no".
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new()
            .with_prompt(prompt.yellow().to_string())
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// `--yes-i-know` / `--yes` skip the prompt.
pub fn confirmation(pre_affirmed: bool) -> Box<dyn Confirmation> {
    if pre_affirmed {
        Box::new(PreAffirmed)
    } else {
        Box::new(TerminalConfirmation)
    }
}
