//! Storage contracts consumed by the call screener, and an in-memory store.
//!
//! Read methods never fail: missing or unreadable data reads as empty, so the
//! decision engine only ever sees "no schedule", never "no answer".

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::contacts::{BlockedCallEntry, WhitelistedContact};
use crate::error::Result;
use crate::schedule::Schedule;

/// One consistent view of everything a decision depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub enabled: bool,
    pub whitelist: Vec<WhitelistedContact>,
    pub schedule: Schedule,
}

/// Supplies the filter configuration.
pub trait ScheduleStore: Send + Sync {
    fn whitelist(&self) -> Vec<WhitelistedContact>;
    fn schedule(&self) -> Schedule;
    fn is_enabled(&self) -> bool;

    /// Read all three values together. Implementations backed by shared state
    /// should override this to read under a single lock.
    fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            enabled: self.is_enabled(),
            whitelist: self.whitelist(),
            schedule: self.schedule(),
        }
    }
}

/// Most-recent-first record of blocked calls.
pub trait CallLog: Send + Sync {
    /// Insert `entry` at the head of the log as a single write.
    fn prepend(&self, entry: BlockedCallEntry) -> Result<()>;
    fn entries(&self) -> Vec<BlockedCallEntry>;
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for &T {
    fn whitelist(&self) -> Vec<WhitelistedContact> {
        (**self).whitelist()
    }

    fn schedule(&self) -> Schedule {
        (**self).schedule()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn snapshot(&self) -> FilterSnapshot {
        (**self).snapshot()
    }
}

impl<T: CallLog + ?Sized> CallLog for &T {
    fn prepend(&self, entry: BlockedCallEntry) -> Result<()> {
        (**self).prepend(entry)
    }

    fn entries(&self) -> Vec<BlockedCallEntry> {
        (**self).entries()
    }
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    fn whitelist(&self) -> Vec<WhitelistedContact> {
        (**self).whitelist()
    }

    fn schedule(&self) -> Schedule {
        (**self).schedule()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn snapshot(&self) -> FilterSnapshot {
        (**self).snapshot()
    }
}

impl<T: CallLog + ?Sized> CallLog for Arc<T> {
    fn prepend(&self, entry: BlockedCallEntry) -> Result<()> {
        (**self).prepend(entry)
    }

    fn entries(&self) -> Vec<BlockedCallEntry> {
        (**self).entries()
    }
}

/// Everything the filter persists.
///
/// Section names follow the persisted document layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredData {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub whitelist: Vec<WhitelistedContact>,
    #[serde(default)]
    pub blocked_calls: Vec<BlockedCallEntry>,
}

impl StoredData {
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            enabled: self.enabled,
            whitelist: self.whitelist.clone(),
            schedule: self.schedule.clone(),
        }
    }

    /// Drop schedule, whitelist and log. The enabled flag survives.
    pub fn clear(&mut self) {
        self.schedule = Schedule::default();
        self.whitelist.clear();
        self.blocked_calls.clear();
    }
}

/// Process-local store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoredData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoredData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    pub fn set_schedule(&self, schedule: Schedule) {
        self.lock().schedule = schedule;
    }

    pub fn set_whitelist(&self, whitelist: Vec<WhitelistedContact>) {
        self.lock().whitelist = whitelist;
    }

    pub fn clear_all_data(&self) {
        self.lock().clear();
    }

    /// Copy of the full stored state.
    pub fn data(&self) -> StoredData {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoredData> {
        // Every mutation is a single assignment, so poisoned data is still whole.
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScheduleStore for MemoryStore {
    fn whitelist(&self) -> Vec<WhitelistedContact> {
        self.lock().whitelist.clone()
    }

    fn schedule(&self) -> Schedule {
        self.lock().schedule.clone()
    }

    fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    fn snapshot(&self) -> FilterSnapshot {
        self.lock().snapshot()
    }
}

impl CallLog for MemoryStore {
    fn prepend(&self, entry: BlockedCallEntry) -> Result<()> {
        self.lock().blocked_calls.insert(0, entry);
        Ok(())
    }

    fn entries(&self) -> Vec<BlockedCallEntry> {
        self.lock().blocked_calls.clone()
    }
}
