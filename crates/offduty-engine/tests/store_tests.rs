//! Tests for the JSON file store and the in-memory store.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use offduty_engine::{
    BlockedCallEntry, CallLog, DaySchedule, JsonFileStore, MemoryStore, Schedule, ScheduleStore,
    StoredData, TimeWindow, WhitelistedContact,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Unique path under the system temp dir, removed up front.
fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "offduty-store-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn entry(number: &str, timestamp_millis: i64) -> BlockedCallEntry {
    BlockedCallEntry {
        number: number.to_string(),
        timestamp_millis,
    }
}

fn weekday_schedule() -> Schedule {
    Schedule::from_days(vec![DaySchedule::new(
        1,
        vec![TimeWindow::new(540, 1020).unwrap()],
    )])
}

// ── JsonFileStore: reads ────────────────────────────────────────────────────

#[test]
fn missing_file_reads_as_empty() {
    let store = JsonFileStore::open(temp_store("missing"));

    assert!(!store.is_enabled());
    assert!(store.whitelist().is_empty());
    assert!(store.schedule().days().is_empty());
    assert!(store.entries().is_empty());
}

#[test]
fn garbage_file_reads_as_empty() {
    let path = temp_store("garbage");
    std::fs::write(&path, "this is not json").unwrap();
    let store = JsonFileStore::open(&path);

    assert_eq!(store.load(), StoredData::default());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn malformed_section_degrades_alone() {
    let path = temp_store("malformed-section");
    std::fs::write(
        &path,
        r#"{
            "enabled": true,
            "schedule": "oops",
            "whitelist": [{"name": "Mom", "phoneE164": "+15551234567"}],
            "blocked_calls": [{"number": 42}]
        }"#,
    )
    .unwrap();
    let store = JsonFileStore::open(&path);

    assert!(store.is_enabled());
    assert!(store.schedule().days().is_empty());
    assert_eq!(store.whitelist().len(), 1);
    assert!(store.entries().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn null_sections_read_as_empty() {
    let path = temp_store("null-sections");
    std::fs::write(&path, r#"{"enabled": null, "schedule": null}"#).unwrap();
    let store = JsonFileStore::open(&path);

    assert!(!store.is_enabled());
    assert!(store.schedule().days().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn reads_stored_field_names() {
    let path = temp_store("field-names");
    std::fs::write(
        &path,
        r#"{
            "enabled": true,
            "schedule": [{"dayOfWeek": 1, "windows": [{"startMinutes": 540, "endMinutes": 1020}]}],
            "whitelist": [],
            "blocked_calls": [{"number": "5550001111", "timestamp": 1700000000000}]
        }"#,
    )
    .unwrap();
    let store = JsonFileStore::open(&path);

    assert_eq!(store.schedule(), weekday_schedule());
    assert_eq!(store.entries(), vec![entry("5550001111", 1_700_000_000_000)]);
    let _ = std::fs::remove_file(&path);
}

// ── JsonFileStore: writes ───────────────────────────────────────────────────

#[test]
fn writes_roundtrip_through_file() {
    let path = temp_store("roundtrip");
    let store = JsonFileStore::open(&path);

    store.set_enabled(true).unwrap();
    store.set_schedule(weekday_schedule()).unwrap();
    store
        .set_whitelist(vec![WhitelistedContact::new("Mom", "+15551234567")])
        .unwrap();

    let reopened = JsonFileStore::open(&path);
    let snapshot = reopened.snapshot();
    assert!(snapshot.enabled);
    assert_eq!(snapshot.schedule, weekday_schedule());
    assert_eq!(snapshot.whitelist[0].name, "Mom");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn prepend_keeps_most_recent_first() {
    let path = temp_store("prepend");
    let store = JsonFileStore::open(&path);

    store.prepend(entry("111", 1)).unwrap();
    store.prepend(entry("222", 2)).unwrap();
    store.prepend(entry("333", 3)).unwrap();

    let stamps: Vec<i64> = store.entries().iter().map(|e| e.timestamp_millis).collect();
    assert_eq!(stamps, vec![3, 2, 1]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn clear_all_data_preserves_enabled_flag() {
    let path = temp_store("clear");
    let store = JsonFileStore::open(&path);
    store.set_enabled(true).unwrap();
    store.set_schedule(weekday_schedule()).unwrap();
    store
        .set_whitelist(vec![WhitelistedContact::new("Mom", "+15551234567")])
        .unwrap();
    store.prepend(entry("111", 1)).unwrap();

    store.clear_all_data().unwrap();

    assert!(store.is_enabled());
    assert!(store.schedule().days().is_empty());
    assert!(store.whitelist().is_empty());
    assert!(store.entries().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn update_creates_missing_parent_directories() {
    let dir = std::env::temp_dir().join(format!("offduty-store-nested-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let store = JsonFileStore::open(dir.join("a").join("store.json"));

    store.set_enabled(true).unwrap();

    assert!(store.path().exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn concurrent_prepends_are_all_kept() {
    let path = temp_store("concurrent");
    let store = Arc::new(JsonFileStore::open(&path));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.prepend(entry(&format!("55500000{:02}", i), i)).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.entries().len(), 8);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn separate_stores_on_one_file_keep_every_prepend() {
    let path = temp_store("shared-file");
    const WRITERS: i64 = 4;
    const PER_WRITER: i64 = 50;

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let store = JsonFileStore::open(path);
                for n in 0..PER_WRITER {
                    let stamp = writer * PER_WRITER + n;
                    store.prepend(entry(&format!("555{:07}", stamp), stamp)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let entries = JsonFileStore::open(&path).entries();
    assert_eq!(entries.len(), (WRITERS * PER_WRITER) as usize);

    // Each writer's own entries stay newest first.
    for writer in 0..WRITERS {
        let own: Vec<i64> = entries
            .iter()
            .map(|e| e.timestamp_millis)
            .filter(|t| t / PER_WRITER == writer)
            .collect();
        let mut expected: Vec<i64> = (0..PER_WRITER).map(|n| writer * PER_WRITER + n).collect();
        expected.reverse();
        assert_eq!(own, expected);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn updates_leave_no_temporary_files_behind() {
    let dir = std::env::temp_dir().join(format!("offduty-store-tmpfiles-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let store = JsonFileStore::open(dir.join("offduty.json"));

    for i in 0..5 {
        store.prepend(entry("5550001111", i)).unwrap();
    }

    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["offduty.json", "offduty.json.lock"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stored_invalid_window_is_kept_as_stored() {
    let path = temp_store("invalid-window");
    std::fs::write(
        &path,
        r#"{"schedule":[{"dayOfWeek":2,"windows":[{"startMinutes":600,"endMinutes":600}]}]}"#,
    )
    .unwrap();

    let windows = JsonFileStore::open(&path).schedule().windows_for(2).to_vec();
    assert_eq!(windows.len(), 1);
    assert!(!windows[0].is_valid());
    let _ = std::fs::remove_file(&path);
}

// ── MemoryStore ─────────────────────────────────────────────────────────────

#[test]
fn memory_store_clear_preserves_enabled_flag() {
    let store = MemoryStore::with_data(StoredData {
        enabled: true,
        schedule: weekday_schedule(),
        whitelist: vec![WhitelistedContact::new("Mom", "+15551234567")],
        blocked_calls: vec![entry("111", 1)],
    });

    store.clear_all_data();

    assert_eq!(
        store.data(),
        StoredData {
            enabled: true,
            ..StoredData::default()
        }
    );
}

#[test]
fn memory_store_prepend_order() {
    let store = MemoryStore::new();
    store.prepend(entry("111", 1)).unwrap();
    store.prepend(entry("222", 2)).unwrap();
    assert_eq!(store.entries()[0].number, "222");
}
