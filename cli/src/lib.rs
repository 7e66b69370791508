// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! statsctl CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Argument surfaces, service wiring and operator output

pub mod commands;
pub mod confirm;
pub mod context;
pub mod output;
