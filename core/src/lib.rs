// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `statsctl-core` — Usage-Statistics Control Plane
//!
//! Mediates between operator intent and the statistics pipeline: validates
//! type names against the configured registry, parses date boundaries,
//! dispatches processing/aggregation jobs and drives delete/restore of the
//! event, aggregation and bookmark indices.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | type names, date grammar, requests, ports, configuration |
//! | [`application`] | Application | validator, dispatcher, lifecycle controller, command service |
//! | [`infrastructure`] | Infrastructure | search index, record store and pipeline adapters |

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
