//! Pack a day's windows into non-overlapping columns.
//!
//! Greedy interval-graph coloring: windows are taken in start order and each
//! goes into the first column whose last window has already ended. Taking
//! windows in start order makes first-fit optimal, so the number of columns is
//! exactly the largest number of windows covering any single minute. More than
//! one column therefore means the day has overlapping windows. Empty windows
//! still get a column slot but are left out of [`column_count`].
//!
//! The schedule editor uses the columns to lay windows out side by side; the
//! decision engine uses [`has_overlap`] for diagnostics.

use serde::Serialize;

use crate::window::TimeWindow;

/// A pair of windows that share at least one minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowOverlap {
    pub first: TimeWindow,
    pub second: TimeWindow,
    pub overlap_minutes: u16,
}

/// Assign windows to the minimal number of columns.
///
/// Windows are stable-sorted by `start_minute`, so equal starts keep their
/// input order. Within a column windows are ordered by start and each starts
/// no earlier than the previous one ends (`prev.end <= next.start`). Every
/// input window appears exactly once in the output.
///
/// Runs in O(n·k) for n windows and k columns.
pub fn pack_columns(windows: &[TimeWindow]) -> Vec<Vec<TimeWindow>> {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| w.start_minute);

    let mut columns: Vec<Vec<TimeWindow>> = Vec::new();
    for window in sorted {
        let free = columns.iter_mut().find(|column| {
            column
                .last()
                .is_some_and(|last| last.end_minute <= window.start_minute)
        });
        match free {
            Some(column) => column.push(window),
            None => columns.push(vec![window]),
        }
    }

    columns
}

/// Largest number of windows covering any single minute.
///
/// Empty windows (`start >= end`) cover nothing and are left out, so this
/// equals the length of [`pack_columns`] whenever no window is empty.
pub fn column_count(windows: &[TimeWindow]) -> usize {
    let non_empty: Vec<TimeWindow> = windows.iter().copied().filter(|w| !w.is_empty()).collect();
    pack_columns(&non_empty).len()
}

/// `true` when at least two windows share a minute.
pub fn has_overlap(windows: &[TimeWindow]) -> bool {
    column_count(windows) > 1
}

/// All pairs of overlapping windows, in start order.
///
/// Adjacent windows (one ends exactly when the other starts) are not overlaps.
pub fn find_overlaps(windows: &[TimeWindow]) -> Vec<WindowOverlap> {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| w.start_minute);

    let mut overlaps = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            let overlap_minutes = a.overlap_minutes(b);
            if overlap_minutes > 0 {
                overlaps.push(WindowOverlap {
                    first: *a,
                    second: *b,
                    overlap_minutes,
                });
            }
        }
    }

    overlaps
}

/// The windows covering `minute`, with the index of the column holding each.
pub fn windows_at(columns: &[Vec<TimeWindow>], minute: u16) -> Vec<(usize, TimeWindow)> {
    columns
        .iter()
        .enumerate()
        .flat_map(|(idx, column)| {
            column
                .iter()
                .filter(move |w| w.contains(minute))
                .map(move |w| (idx, *w))
        })
        .collect()
}
