// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Value objects, error taxonomy and the ports the application layer drives.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types; no I/O outside of `stats_config` file loading

pub mod type_name;
pub mod date_spec;
pub mod registry;
pub mod bookmark;
pub mod index;
pub mod job;
pub mod errors;
pub mod repository;
pub mod stats_config;
