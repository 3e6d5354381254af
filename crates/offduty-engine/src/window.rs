//! Half-open time-of-day windows, measured in minutes after local midnight.
//!
//! A window covers `[start_minute, end_minute)`: the start minute is inside the
//! window, the end minute is not. Windows never wrap past midnight; availability
//! from 22:00 to 02:00 is two windows on two different days.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Number of minutes in a day. Valid minute values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A permitted time-of-day interval within a single day.
///
/// Fields are public because persisted schedules are loaded without
/// validation. A window with `start_minute >= end_minute` is treated as empty
/// everywhere: it contains no minute and overlaps nothing. Use [`TimeWindow::new`]
/// when building windows from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(rename = "startMinutes")]
    pub start_minute: u16,
    #[serde(rename = "endMinutes")]
    pub end_minute: u16,
}

impl TimeWindow {
    /// Build a validated window.
    ///
    /// # Errors
    /// Returns `FilterError::InvalidWindow` when either bound is outside the day
    /// or when `start >= end` (overnight or empty ranges).
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self> {
        let invalid = |reason: &str| FilterError::InvalidWindow {
            start: start_minute,
            end: end_minute,
            reason: reason.to_string(),
        };

        if start_minute >= MINUTES_PER_DAY || end_minute >= MINUTES_PER_DAY {
            return Err(invalid("minutes must be below 1440"));
        }
        if start_minute >= end_minute {
            return Err(invalid(
                "start must be before end; split overnight ranges into two days",
            ));
        }

        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// `true` when the window is a non-empty interval inside a single day.
    pub fn is_valid(&self) -> bool {
        self.start_minute < self.end_minute && self.end_minute < MINUTES_PER_DAY
    }

    /// `true` when the window covers no minute (`start >= end`).
    pub fn is_empty(&self) -> bool {
        self.start_minute >= self.end_minute
    }

    /// `true` when `minute` falls in `[start, end)`. Inverted windows contain nothing.
    pub fn contains(&self, minute: u16) -> bool {
        self.start_minute <= minute && minute < self.end_minute
    }

    /// Two windows overlap iff `a.start < b.end && b.start < a.end`.
    ///
    /// Adjacent windows (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.overlap_minutes(other) > 0
    }

    /// Length of the shared part of two windows, 0 when they are disjoint.
    pub fn overlap_minutes(&self, other: &TimeWindow) -> u16 {
        let start = self.start_minute.max(other.start_minute);
        let end = self.end_minute.min(other.end_minute);
        if self.is_empty() || other.is_empty() {
            return 0;
        }
        end.saturating_sub(start)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            format_minute(self.start_minute),
            format_minute(self.end_minute)
        )
    }
}

/// Parses `HH:MM-HH:MM` (whitespace around the dash is allowed).
impl FromStr for TimeWindow {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| FilterError::InvalidTime(format!("expected HH:MM-HH:MM, got '{}'", s)))?;
        TimeWindow::new(parse_minute(start)?, parse_minute(end)?)
    }
}

/// Format a minute-of-day as zero-padded `HH:MM`.
pub fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Parse `H:MM` or `HH:MM` into a minute-of-day.
pub fn parse_minute(s: &str) -> Result<u16> {
    let trimmed = s.trim();
    let (h, m) = trimmed
        .split_once(':')
        .ok_or_else(|| FilterError::InvalidTime(trimmed.to_string()))?;
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
        return Err(FilterError::InvalidTime(trimmed.to_string()));
    }
    let hour: u16 = h
        .parse()
        .map_err(|_| FilterError::InvalidTime(trimmed.to_string()))?;
    let minute: u16 = m
        .parse()
        .map_err(|_| FilterError::InvalidTime(trimmed.to_string()))?;
    hm_to_minute(hour, minute)
}

fn hm_to_minute(hour: u16, minute: u16) -> Result<u16> {
    if hour > 23 || minute > 59 {
        return Err(FilterError::InvalidTime(format!("{}:{:02}", hour, minute)));
    }
    Ok(hour * 60 + minute)
}
