//! Weekly schedule of permitted call windows.
//!
//! Days are numbered `0..=6` with 0 = Sunday. A day missing from the schedule,
//! or present with no windows, permits no calls.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::window::TimeWindow;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The permitted windows for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: u8,
    #[serde(default)]
    pub windows: Vec<TimeWindow>,
}

impl DaySchedule {
    pub fn new(day_of_week: u8, windows: Vec<TimeWindow>) -> Self {
        Self {
            day_of_week,
            windows,
        }
    }
}

/// A week of [`DaySchedule`]s, at most one per day.
///
/// Schedules loaded from storage are kept as stored. Should a stored schedule
/// repeat a day, lookups use the first occurrence. The editing methods never
/// create duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: Vec<DaySchedule>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_days(days: Vec<DaySchedule>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    /// `true` when no day has any window.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.windows.is_empty())
    }

    pub fn day(&self, day_of_week: u8) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day_of_week == day_of_week)
    }

    /// Windows for a day, empty when the day is not scheduled.
    pub fn windows_for(&self, day_of_week: u8) -> &[TimeWindow] {
        self.day(day_of_week)
            .map(|d| d.windows.as_slice())
            .unwrap_or(&[])
    }

    /// Days that have at least one window, ascending.
    pub fn days_with_windows(&self) -> Vec<u8> {
        let mut days: Vec<u8> = self
            .days
            .iter()
            .filter(|d| !d.windows.is_empty())
            .map(|d| d.day_of_week)
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// Append a window to a day, creating the day when absent.
    ///
    /// # Errors
    /// Returns `FilterError::InvalidDay` when `day_of_week > 6`.
    pub fn add_window(&mut self, day_of_week: u8, window: TimeWindow) -> Result<()> {
        check_day(day_of_week)?;
        match self.day_mut(day_of_week) {
            Some(day) => day.windows.push(window),
            None => self.days.push(DaySchedule::new(day_of_week, vec![window])),
        }
        Ok(())
    }

    /// Remove the first window equal to `window`. Returns whether one was removed.
    pub fn remove_window(&mut self, day_of_week: u8, window: &TimeWindow) -> bool {
        let Some(day) = self.day_mut(day_of_week) else {
            return false;
        };
        match day.windows.iter().position(|w| w == window) {
            Some(idx) => {
                day.windows.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replace the first window equal to `old` with `new`, keeping its position.
    pub fn replace_window(&mut self, day_of_week: u8, old: &TimeWindow, new: TimeWindow) -> bool {
        let Some(day) = self.day_mut(day_of_week) else {
            return false;
        };
        match day.windows.iter_mut().find(|w| **w == *old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    fn day_mut(&mut self, day_of_week: u8) -> Option<&mut DaySchedule> {
        self.days.iter_mut().find(|d| d.day_of_week == day_of_week)
    }
}

/// Day index (0 = Sunday) of a chrono weekday.
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// English name of a day index, or `"Unknown"` when out of range.
pub fn day_name(day_of_week: u8) -> &'static str {
    DAY_NAMES
        .get(day_of_week as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Parse a day given as an index (`0`-`6`, 0 = Sunday) or an English name or
/// three-letter abbreviation, case-insensitive.
pub fn parse_day(s: &str) -> Result<u8> {
    let trimmed = s.trim();
    if let Ok(idx) = trimmed.parse::<u8>() {
        check_day(idx)?;
        return Ok(idx);
    }
    let lower = trimmed.to_ascii_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| {
            let name = name.to_ascii_lowercase();
            lower == name || (lower.len() >= 3 && name.starts_with(&lower))
        })
        .map(|idx| idx as u8)
        .ok_or_else(|| FilterError::InvalidDay(trimmed.to_string()))
}

fn check_day(day_of_week: u8) -> Result<()> {
    if day_of_week > 6 {
        return Err(FilterError::InvalidDay(day_of_week.to_string()));
    }
    Ok(())
}
