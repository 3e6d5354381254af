//! File-backed store: one JSON document holding the enabled flag, schedule,
//! whitelist and blocked-call log.
//!
//! ```json
//! {
//!   "enabled": true,
//!   "schedule": [{"dayOfWeek": 1, "windows": [{"startMinutes": 540, "endMinutes": 1020}]}],
//!   "whitelist": [{"name": "Mom", "phoneE164": "+15551234567"}],
//!   "blocked_calls": [{"number": "+15559876543", "timestamp": 1773660000000}]
//! }
//! ```
//!
//! Each section is decoded on its own. A section that fails to decode reads as
//! its empty default and is logged; the other sections are unaffected.
//!
//! Updates hold an exclusive lock on a sibling `<name>.lock` file from read to
//! write, so stores in different threads or processes sharing one document never
//! drop each other's changes. Each write goes to a fresh temporary file in the
//! same directory that is then persisted over the document.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::contacts::{BlockedCallEntry, WhitelistedContact};
use crate::error::Result;
use crate::schedule::Schedule;
use crate::store::{CallLog, FilterSnapshot, ScheduleStore, StoredData};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Bind a store to `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document, degrading unreadable parts to defaults.
    pub fn load(&self) -> StoredData {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, using defaults");
                return StoredData::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read store file, using defaults");
                return StoredData::default();
            }
        };

        let root: Value = match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "store document is not an object, using defaults");
                return StoredData::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store document is not valid JSON, using defaults");
                return StoredData::default();
            }
        };

        let data = StoredData {
            enabled: section(&root, "enabled"),
            schedule: section(&root, "schedule"),
            whitelist: section(&root, "whitelist"),
            blocked_calls: section(&root, "blocked_calls"),
        };
        for day in data.schedule.days() {
            for window in day.windows.iter().filter(|w| !w.is_valid()) {
                warn!(day = day.day_of_week, %window, "stored window is empty or outside the day");
            }
        }
        data
    }

    /// Apply `f` to the stored document and write it back.
    ///
    /// Read, modify and write happen under an exclusive file lock, so
    /// concurrent updates never lose each other's changes.
    pub fn update<R>(&self, f: impl FnOnce(&mut StoredData) -> R) -> Result<R> {
        fs::create_dir_all(self.dir())?;
        let mut lock = self.lock_file()?;
        let _guard = lock.write()?;
        let mut data = self.load();
        let out = f(&mut data);
        self.save(&data)?;
        Ok(out)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.update(|d| d.enabled = enabled)
    }

    pub fn set_schedule(&self, schedule: Schedule) -> Result<()> {
        self.update(|d| d.schedule = schedule)
    }

    pub fn set_whitelist(&self, whitelist: Vec<WhitelistedContact>) -> Result<()> {
        self.update(|d| d.whitelist = whitelist)
    }

    /// Remove schedule, whitelist and blocked-call log, keeping the enabled flag.
    pub fn clear_all_data(&self) -> Result<()> {
        self.update(StoredData::clear)
    }

    fn save(&self, data: &StoredData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn lock_file(&self) -> Result<RwLock<File>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        Ok(RwLock::new(file))
    }
}

fn section<T: DeserializeOwned + Default>(root: &Value, key: &str) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(section = key, error = %e, "malformed store section, using empty default");
            T::default()
        }),
    }
}

impl ScheduleStore for JsonFileStore {
    fn whitelist(&self) -> Vec<WhitelistedContact> {
        self.load().whitelist
    }

    fn schedule(&self) -> Schedule {
        self.load().schedule
    }

    fn is_enabled(&self) -> bool {
        self.load().enabled
    }

    fn snapshot(&self) -> FilterSnapshot {
        let lock = match self.lock_file() {
            Ok(lock) => lock,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "store lock unavailable, reading unlocked");
                return self.load().snapshot();
            }
        };
        let _guard = match lock.read() {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot take store read lock, reading unlocked");
                None
            }
        };
        self.load().snapshot()
    }
}

impl CallLog for JsonFileStore {
    fn prepend(&self, entry: BlockedCallEntry) -> Result<()> {
        self.update(|d| d.blocked_calls.insert(0, entry))
    }

    fn entries(&self) -> Vec<BlockedCallEntry> {
        self.load().blocked_calls
    }
}
