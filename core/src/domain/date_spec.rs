// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Date Boundaries
//!
//! Operator dates are accepted at three granularities: `YYYY`, `YYYY-MM` and
//! `YYYY-MM-DD`. A single grammar ([`DateSpec::parse_text`]) produces a
//! [`ParsedDate`]; the two call modes only differ in which part they keep:
//!
//! - [`DateSpec::verify`] keeps the original text (consumers that re-parse later)
//! - [`DateSpec::parse`] keeps a normalized instant for a [`BoundaryRole`]
//!
//! Absent or blank input means "unbounded on that side" in both modes.
//! Ordering between a start and an end boundary is never checked here; an
//! inverted range simply selects nothing downstream.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DATE_FORMAT_HELP: &str = "YYYY-MM-DD|YYYY-MM|YYYY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date '{input}': {reason}. Date format: YYYY-MM-DD|YYYY-MM|YYYY")]
pub struct DateFormatError {
    pub input: String,
    pub reason: String,
}

impl DateFormatError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    Year,
    Month,
    Day,
}

/// Which side of a range a boundary sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRole {
    /// Normalizes to the first instant of the granularity's range.
    Start,
    /// Normalizes to the last instant of the granularity's range.
    End,
}

/// Result of the shared date grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    text: String,
    granularity: DateGranularity,
    first: NaiveDateTime,
    last: NaiveDateTime,
}

impl ParsedDate {
    /// The operator's text as supplied.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn granularity(&self) -> DateGranularity {
        self.granularity
    }

    pub fn instant(&self, role: BoundaryRole) -> NaiveDateTime {
        match role {
            BoundaryRole::Start => self.first,
            BoundaryRole::End => self.last,
        }
    }
}

/// Entry points for the two parsing modes.
pub struct DateSpec;

impl DateSpec {
    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    ///
    /// Returns `Ok(None)` for absent or blank input.
    pub fn parse_text(input: Option<&str>) -> Result<Option<ParsedDate>, DateFormatError> {
        let Some(raw) = input else {
            return Ok(None);
        };
        let text = raw.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() > 3 {
            return Err(DateFormatError::new(text, "too many components"));
        }

        let year = numeric_component(text, parts[0], 4, 4, "year")?;
        let month = parts
            .get(1)
            .map(|part| numeric_component(text, part, 1, 2, "month"))
            .transpose()?;
        let day = parts
            .get(2)
            .map(|part| numeric_component(text, part, 1, 2, "day"))
            .transpose()?;

        let (granularity, first_day, next_day) = match (month, day) {
            (None, _) => {
                let first = ymd(text, year, 1, 1)?;
                let next = ymd(text, year + 1, 1, 1)?;
                (DateGranularity::Year, first, next)
            }
            (Some(month), None) => {
                let first = ymd(text, year, month, 1)?;
                let next = first_of_next_month(text, first)?;
                (DateGranularity::Month, first, next)
            }
            (Some(month), Some(day)) => {
                let first = ymd(text, year, month, day)?;
                let next = first
                    .succ_opt()
                    .ok_or_else(|| DateFormatError::new(text, "date out of range"))?;
                (DateGranularity::Day, first, next)
            }
        };

        let first = first_day.and_time(NaiveTime::MIN);
        let last = next_day.and_time(NaiveTime::MIN) - TimeDelta::milliseconds(1);

        Ok(Some(ParsedDate {
            text: raw.to_string(),
            granularity,
            first,
            last,
        }))
    }

    /// Verify-only mode: validate and hand back the original text.
    pub fn verify(input: Option<&str>) -> Result<Option<String>, DateFormatError> {
        Ok(Self::parse_text(input)?.map(|parsed| parsed.text))
    }

    /// Parse mode: validate and normalize to an instant for `role`.
    pub fn parse(
        input: Option<&str>,
        role: BoundaryRole,
    ) -> Result<Option<NaiveDateTime>, DateFormatError> {
        Ok(Self::parse_text(input)?.map(|parsed| parsed.instant(role)))
    }
}

fn numeric_component(
    input: &str,
    part: &str,
    min_len: usize,
    max_len: usize,
    name: &str,
) -> Result<i32, DateFormatError> {
    if part.len() < min_len || part.len() > max_len || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateFormatError::new(input, format!("malformed {}", name)));
    }
    part.parse::<i32>()
        .map_err(|_| DateFormatError::new(input, format!("malformed {}", name)))
}

fn ymd(input: &str, year: i32, month: i32, day: i32) -> Result<NaiveDate, DateFormatError> {
    let (Ok(month), Ok(day)) = (u32::try_from(month), u32::try_from(day)) else {
        return Err(DateFormatError::new(input, "no such calendar date"));
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateFormatError::new(input, "no such calendar date"))
}

fn first_of_next_month(input: &str, date: NaiveDate) -> Result<NaiveDate, DateFormatError> {
    if date.month() == 12 {
        ymd(input, date.year() + 1, 1, 1)
    } else {
        ymd(input, date.year(), date.month() as i32 + 1, 1)
    }
}

/// Inclusive instant range; `None` on a side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Re-parse verified boundary text into a range.
    pub fn from_text(start: Option<&str>, end: Option<&str>) -> Result<Self, DateFormatError> {
        Ok(Self {
            start: DateSpec::parse(start, BoundaryRole::Start)?,
            end: DateSpec::parse(end, BoundaryRole::End)?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        self.start.is_none_or(|start| *instant >= start)
            && self.end.is_none_or(|end| *instant <= end)
    }

    /// The whole calendar month as a bounded range.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start: Some(first_day.and_time(NaiveTime::MIN)),
            end: Some(next_month.and_time(NaiveTime::MIN) - TimeDelta::milliseconds(1)),
        })
    }

    /// Narrowest range covered by both.
    pub fn intersect(&self, other: &DateRange) -> DateRange {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        DateRange { start, end }
    }

    /// Whether any instant of the calendar month overlaps this range.
    pub fn overlaps_month(&self, year: i32, month: u32) -> bool {
        let Some(DateRange {
            start: Some(month_start),
            end: Some(month_end),
        }) = Self::month(year, month)
        else {
            return false;
        };

        self.start.is_none_or(|start| start <= month_end)
            && self.end.is_none_or(|end| end >= month_start)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |value: &Option<NaiveDateTime>| match value {
            Some(instant) => instant.format("%Y-%m-%d").to_string(),
            None => "*".to_string(),
        };
        write!(f, "[{} .. {}]", side(&self.start), side(&self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn test_verify_returns_original_text_for_every_granularity() {
        for text in ["2024", "2024-03", "2024-03-15"] {
            assert_eq!(DateSpec::verify(Some(text)).unwrap().as_deref(), Some(text));
        }
    }

    #[test]
    fn test_parse_normalizes_start_boundaries() {
        assert_eq!(
            DateSpec::parse(Some("2024"), BoundaryRole::Start).unwrap(),
            Some(at(2024, 1, 1, 0, 0, 0, 0))
        );
        assert_eq!(
            DateSpec::parse(Some("2024-03"), BoundaryRole::Start).unwrap(),
            Some(at(2024, 3, 1, 0, 0, 0, 0))
        );
        assert_eq!(
            DateSpec::parse(Some("2024-03-15"), BoundaryRole::Start).unwrap(),
            Some(at(2024, 3, 15, 0, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_normalizes_end_boundaries() {
        assert_eq!(
            DateSpec::parse(Some("2024"), BoundaryRole::End).unwrap(),
            Some(at(2024, 12, 31, 23, 59, 59, 999))
        );
        // leap year
        assert_eq!(
            DateSpec::parse(Some("2024-02"), BoundaryRole::End).unwrap(),
            Some(at(2024, 2, 29, 23, 59, 59, 999))
        );
        assert_eq!(
            DateSpec::parse(Some("2023-12"), BoundaryRole::End).unwrap(),
            Some(at(2023, 12, 31, 23, 59, 59, 999))
        );
        assert_eq!(
            DateSpec::parse(Some("2024-03-15"), BoundaryRole::End).unwrap(),
            Some(at(2024, 3, 15, 23, 59, 59, 999))
        );
    }

    #[test]
    fn test_absent_and_blank_are_unbounded() {
        assert_eq!(DateSpec::verify(None).unwrap(), None);
        assert_eq!(DateSpec::verify(Some("  ")).unwrap(), None);
        assert_eq!(DateSpec::parse(Some(""), BoundaryRole::End).unwrap(), None);
    }

    #[test]
    fn test_verify_returns_text_as_supplied() {
        assert_eq!(DateSpec::verify(Some(" 2024")).unwrap().as_deref(), Some(" 2024"));
        assert_eq!(
            DateSpec::parse(Some(" 2024"), BoundaryRole::Start).unwrap(),
            Some(at(2024, 1, 1, 0, 0, 0, 0))
        );
    }

    #[test]
    fn test_malformed_text_fails_identically_in_both_modes() {
        for text in ["20", "2024-13", "2024-02-30", "24-01-01", "2024/01", "2024-01-01-01", "abcd", "2024-1x"] {
            let verify_err = DateSpec::verify(Some(text)).unwrap_err();
            let parse_err = DateSpec::parse(Some(text), BoundaryRole::Start).unwrap_err();
            assert_eq!(verify_err, parse_err, "mode mismatch for {text}");
            assert_eq!(verify_err.input, text);
        }
    }

    #[test]
    fn test_single_digit_month_and_day_accepted() {
        let parsed = DateSpec::parse_text(Some("2024-3-5")).unwrap().unwrap();
        assert_eq!(parsed.granularity(), DateGranularity::Day);
        assert_eq!(parsed.instant(BoundaryRole::Start), at(2024, 3, 5, 0, 0, 0, 0));
    }

    #[test]
    fn test_inverted_range_is_not_an_error() {
        let range = DateRange::from_text(Some("2024-05"), Some("2024-01")).unwrap();
        assert!(!range.overlaps_month(2024, 3));
        assert!(!range.contains(&at(2024, 3, 1, 0, 0, 0, 0)));
    }

    #[test]
    fn test_month_overlap() {
        let range = DateRange::from_text(Some("2024-01-15"), Some("2024-03")).unwrap();
        assert!(!range.overlaps_month(2023, 12));
        assert!(range.overlaps_month(2024, 1));
        assert!(range.overlaps_month(2024, 3));
        assert!(!range.overlaps_month(2024, 4));
        assert!(DateRange::unbounded().overlaps_month(1999, 7));
    }

    #[test]
    fn test_intersect_with_month() {
        let range = DateRange::from_text(Some("2024-01-15"), None).unwrap();
        let january = DateRange::month(2024, 1).unwrap();
        let clipped = range.intersect(&january);

        assert_eq!(clipped.start, Some(at(2024, 1, 15, 0, 0, 0, 0)));
        assert_eq!(clipped.end, Some(at(2024, 1, 31, 23, 59, 59, 999)));
    }

    #[test]
    fn test_range_display() {
        let range = DateRange::from_text(Some("2024"), None).unwrap();
        assert_eq!(range.to_string(), "[2024-01-01 .. *]");
    }
}
