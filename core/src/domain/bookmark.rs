// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::type_name::TypeName;

/// Marker of the last date through which an aggregation kind was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub aggregation: TypeName,
    pub date: NaiveDateTime,
}

/// Sort newest first and keep at most `limit` entries.
pub fn newest_first(mut bookmarks: Vec<Bookmark>, limit: usize) -> Vec<Bookmark> {
    bookmarks.sort_by(|a, b| b.date.cmp(&a.date));
    bookmarks.truncate(limit);
    bookmarks
}
