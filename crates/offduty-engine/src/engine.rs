//! Allow/block decisions for incoming calls.
//!
//! [`decide`] is a pure function of the moment, the caller's number and one
//! snapshot of the configuration. [`CallScreener`] wires it to a store, a call
//! log and a clock, and performs the only side effect: recording blocked calls.
//!
//! Decision order:
//!
//! 1. Filter disabled → allow.
//! 2. Caller equivalent to a whitelisted number → allow.
//! 3. No windows today → block.
//! 4. Current minute inside any of today's windows → allow, otherwise block.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, Moment};
use crate::contacts::{self, BlockedCallEntry, WhitelistedContact};
use crate::packer;
use crate::phone;
use crate::schedule::{day_name, Schedule};
use crate::store::{CallLog, ScheduleStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    FilterDisabled,
    Whitelisted,
    WithinHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Today has no schedule entry, or an entry with no windows.
    NoScheduleToday,
    /// Today has windows but none contains the current minute.
    OutsideHours,
}

/// Outcome of screening one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow {
        reason: AllowReason,
    },
    Block {
        reason: BlockReason,
        /// The entry to record in the call log.
        logged: BlockedCallEntry,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    /// Short machine-readable reason, e.g. `"within_hours"`.
    pub fn reason(&self) -> &'static str {
        match self {
            Decision::Allow { reason } => match reason {
                AllowReason::FilterDisabled => "filter_disabled",
                AllowReason::Whitelisted => "whitelisted",
                AllowReason::WithinHours => "within_hours",
            },
            Decision::Block { reason, .. } => match reason {
                BlockReason::NoScheduleToday => "no_schedule_today",
                BlockReason::OutsideHours => "outside_hours",
            },
        }
    }
}

/// Decide whether a call placed at `now` from `incoming_number` is allowed.
///
/// Pure: the result depends only on the arguments. On block, the returned
/// [`BlockedCallEntry`] carries the normalized number and `now`'s timestamp;
/// recording it is the caller's job (see [`CallScreener`]).
///
/// Window bounds are half-open: a call at a window's start minute is inside it,
/// a call at its end minute is not. Inverted windows never match.
pub fn decide(
    now: &Moment,
    incoming_number: &str,
    enabled: bool,
    whitelist: &[WhitelistedContact],
    schedule: &Schedule,
) -> Decision {
    if !enabled {
        debug!("filter disabled, allowing call");
        return Decision::Allow {
            reason: AllowReason::FilterDisabled,
        };
    }

    let number = phone::normalize(incoming_number);
    debug!(%number, "screening call");

    if let Some(contact) = contacts::find_match(whitelist, &number) {
        debug!(contact = %contact.name, "caller is whitelisted, allowing call");
        return Decision::Allow {
            reason: AllowReason::Whitelisted,
        };
    }

    let day = now.day_of_week;
    let minute = now.minute_of_day;
    debug!(day = day_name(day), minute, "checking schedule");

    let windows = schedule.windows_for(day);
    let block = |reason| Decision::Block {
        reason,
        logged: BlockedCallEntry {
            number: number.clone(),
            timestamp_millis: now.timestamp_millis,
        },
    };

    if windows.is_empty() {
        debug!(day = day_name(day), "no windows scheduled today, blocking call");
        return block(BlockReason::NoScheduleToday);
    }

    if packer::has_overlap(windows) {
        debug!(
            day = day_name(day),
            overlaps = packer::find_overlaps(windows).len(),
            "today's schedule has overlapping windows"
        );
    }

    match windows.iter().find(|w| w.contains(minute)) {
        Some(window) => {
            debug!(%window, "inside scheduled window, allowing call");
            Decision::Allow {
                reason: AllowReason::WithinHours,
            }
        }
        None => {
            debug!("outside all of today's windows, blocking call");
            block(BlockReason::OutsideHours)
        }
    }
}

/// Screens calls against a store, recording blocked calls in a log.
pub struct CallScreener<S, L, C> {
    store: S,
    log: L,
    clock: C,
    record_lock: Mutex<()>,
}

impl<S, L, C> CallScreener<S, L, C>
where
    S: ScheduleStore,
    L: CallLog,
    C: Clock,
{
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            store,
            log,
            clock,
            record_lock: Mutex::new(()),
        }
    }

    /// Screen a call arriving now.
    ///
    /// The clock is read and the log written under one lock, so calls screened
    /// concurrently through the same screener are logged in time order.
    pub fn screen(&self, incoming_number: &str) -> Decision {
        let _guard = self
            .record_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        self.screen_locked(&now, incoming_number)
    }

    /// Screen a call at an explicit moment.
    pub fn screen_at(&self, now: &Moment, incoming_number: &str) -> Decision {
        let _guard = self
            .record_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.screen_locked(now, incoming_number)
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    fn screen_locked(&self, now: &Moment, incoming_number: &str) -> Decision {
        let snapshot = self.store.snapshot();
        let decision = decide(
            now,
            incoming_number,
            snapshot.enabled,
            &snapshot.whitelist,
            &snapshot.schedule,
        );

        if let Decision::Block { reason, logged } = &decision {
            info!(number = %logged.number, reason = ?reason, "blocked call");
            if let Err(e) = self.log.prepend(logged.clone()) {
                warn!(error = %e, "failed to record blocked call");
            }
        }

        decision
    }
}
