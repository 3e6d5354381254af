//! # offduty-engine
//!
//! Decides whether an incoming phone call is allowed or blocked, from a
//! whitelist of contacts and a weekly schedule of permitted time-of-day windows.
//!
//! ```rust
//! use offduty_engine::{decide, Decision, DaySchedule, Moment, Schedule, TimeWindow};
//!
//! // Monday 09:00-17:00.
//! let schedule = Schedule::from_days(vec![DaySchedule::new(
//!     1,
//!     vec![TimeWindow::new(540, 1020).unwrap()],
//! )]);
//!
//! let monday_1130 = Moment { day_of_week: 1, minute_of_day: 690, timestamp_millis: 0 };
//! assert!(decide(&monday_1130, "+15551234567", true, &[], &schedule).is_allowed());
//!
//! let monday_2000 = Moment { day_of_week: 1, minute_of_day: 1200, timestamp_millis: 0 };
//! assert!(matches!(
//!     decide(&monday_2000, "+15551234567", true, &[], &schedule),
//!     Decision::Block { .. }
//! ));
//! ```
//!
//! ## Modules
//!
//! - [`window`] — half-open minute-of-day intervals
//! - [`schedule`] — per-day window lists and schedule editing
//! - [`contacts`] — whitelist entries and blocked-call log entries
//! - [`phone`] — number normalization and loose equivalence
//! - [`clock`] — current moment in a configured time zone
//! - [`packer`] — column packing and overlap detection for a day's windows
//! - [`engine`] — the allow/block decision and the call screener
//! - [`store`] — storage contracts and an in-memory store
//! - [`json_store`] — file-backed JSON store
//! - [`error`] — error types

pub mod clock;
pub mod contacts;
pub mod engine;
pub mod error;
pub mod json_store;
pub mod packer;
pub mod phone;
pub mod schedule;
pub mod store;
pub mod window;

pub use clock::{Clock, FixedClock, Moment, SystemClock, Zone};
pub use contacts::{BlockedCallEntry, WhitelistedContact};
pub use engine::{decide, AllowReason, BlockReason, CallScreener, Decision};
pub use error::FilterError;
pub use json_store::JsonFileStore;
pub use packer::{find_overlaps, has_overlap, pack_columns};
pub use schedule::{DaySchedule, Schedule};
pub use store::{CallLog, FilterSnapshot, MemoryStore, ScheduleStore, StoredData};
pub use window::TimeWindow;
