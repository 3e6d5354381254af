//! `offduty` CLI — screen calls and manage the off-duty schedule from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Turn the filter on and allow calls Monday 09:00-17:00
//! offduty enable
//! offduty schedule add --day mon --window 09:00-17:00
//!
//! # Always let this number through
//! offduty whitelist add --name Mom --number +15551234567
//!
//! # Decide for a call arriving now, or at a given instant
//! offduty screen +15559876543
//! offduty screen +15559876543 --at 2026-03-16T20:00:00+02:00
//!
//! # Inspect a day's column layout and any overlapping windows
//! offduty schedule columns --day mon
//!
//! # Blocked calls, most recent first
//! offduty log
//! ```
//!
//! The store file defaults to `offduty.json` (`--data` / `OFFDUTY_DATA`) and the
//! schedule is read in the host's zone unless `--tz` / `OFFDUTY_TZ` names one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use offduty_engine::contacts;
use offduty_engine::packer::{self, WindowOverlap};
use offduty_engine::schedule::{day_name, parse_day};
use offduty_engine::window::TimeWindow;
use offduty_engine::{
    CallLog, CallScreener, Clock, Decision, FixedClock, JsonFileStore, Schedule, ScheduleStore,
    SystemClock, WhitelistedContact, Zone,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "offduty",
    version,
    about = "Block calls outside your scheduled hours, except from whitelisted contacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store file holding schedule, whitelist and blocked-call log
    #[arg(long, global = true, env = "OFFDUTY_DATA", default_value = "offduty.json")]
    data: PathBuf,

    /// Time zone the schedule is written in: "local" or an IANA name
    #[arg(long, global = true, env = "OFFDUTY_TZ", default_value = "local")]
    tz: String,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the filter is on and what is configured
    Status,
    /// Turn the filter on
    Enable,
    /// Turn the filter off (all calls allowed)
    Disable,
    /// Decide whether a call from NUMBER is allowed, recording it if blocked
    Screen {
        /// Caller number, any formatting
        number: String,
        /// Screen as if the call arrived at this RFC 3339 instant
        #[arg(long)]
        at: Option<String>,
    },
    /// View and edit the weekly schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// View and edit always-allowed contacts
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },
    /// List blocked calls, most recent first
    Log,
    /// Remove schedule, whitelist and log (the on/off state is kept)
    Clear,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Print scheduled windows
    Show {
        /// Only this day (0-6 with 0 = Sunday, or a day name)
        #[arg(long)]
        day: Option<String>,
    },
    /// Add a window to a day
    Add {
        #[arg(long)]
        day: String,
        /// HH:MM-HH:MM, start inclusive, end exclusive
        #[arg(long)]
        window: String,
    },
    /// Remove a window from a day
    Remove {
        #[arg(long)]
        day: String,
        #[arg(long)]
        window: String,
    },
    /// Lay a day's windows out in non-overlapping columns
    Columns {
        #[arg(long)]
        day: String,
    },
}

#[derive(Subcommand)]
enum WhitelistAction {
    /// Print whitelisted contacts
    List,
    /// Add a contact
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        number: String,
    },
    /// Remove every contact whose number matches
    Remove {
        #[arg(long)]
        number: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let zone: Zone = cli
        .tz
        .parse()
        .with_context(|| format!("Unknown time zone: {}", cli.tz))?;
    let store = JsonFileStore::open(&cli.data);
    debug!(path = %cli.data.display(), %zone, "opened store");

    match cli.command {
        Commands::Status => status(&store, zone, cli.json),
        Commands::Enable => set_enabled(&store, true, cli.json),
        Commands::Disable => set_enabled(&store, false, cli.json),
        Commands::Screen { number, at } => screen(&store, zone, &number, at.as_deref(), cli.json),
        Commands::Schedule { action } => schedule(&store, action, cli.json),
        Commands::Whitelist { action } => whitelist(&store, action, cli.json),
        Commands::Log => log(&store, zone, cli.json),
        Commands::Clear => {
            store
                .clear_all_data()
                .context("Failed to clear stored data")?;
            if !cli.json {
                println!("Cleared schedule, whitelist and call log.");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[derive(Serialize)]
struct StatusReport {
    enabled: bool,
    time_zone: String,
    whitelist: usize,
    scheduled_days: Vec<u8>,
    blocked_calls: usize,
}

fn status(store: &JsonFileStore, zone: Zone, json: bool) -> Result<()> {
    let data = store.load();
    let report = StatusReport {
        enabled: data.enabled,
        time_zone: zone.to_string(),
        whitelist: data.whitelist.len(),
        scheduled_days: data.schedule.days_with_windows(),
        blocked_calls: data.blocked_calls.len(),
    };

    if json {
        return print_json(&report);
    }

    let days: Vec<&str> = report.scheduled_days.iter().map(|d| day_name(*d)).collect();
    println!(
        "Filter:         {}",
        if report.enabled { "enabled" } else { "disabled" }
    );
    println!("Time zone:      {}", report.time_zone);
    println!("Whitelist:      {} contact(s)", report.whitelist);
    println!(
        "Scheduled days: {}",
        if data.schedule.is_empty() {
            "none".to_string()
        } else {
            days.join(", ")
        }
    );
    println!("Blocked calls:  {}", report.blocked_calls);
    Ok(())
}

fn set_enabled(store: &JsonFileStore, enabled: bool, json: bool) -> Result<()> {
    store
        .set_enabled(enabled)
        .context("Failed to update filter state")?;
    if json {
        print_json(&serde_json::json!({ "enabled": enabled }))
    } else {
        println!("Filter {}.", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}

fn screen(
    store: &JsonFileStore,
    zone: Zone,
    number: &str,
    at: Option<&str>,
    json: bool,
) -> Result<()> {
    let now = match at {
        Some(raw) => {
            let instant = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --at instant (expected RFC 3339): {}", raw))?;
            zone.moment(instant.with_timezone(&Utc))
        }
        None => SystemClock::new(zone).now(),
    };

    let screener = CallScreener::new(store, store, FixedClock(now));
    let decision = screener.screen(number);

    if json {
        return print_json(&decision);
    }
    match &decision {
        Decision::Allow { .. } => println!("ALLOW ({})", decision.reason()),
        Decision::Block { logged, .. } => {
            println!("BLOCK ({}) {}", decision.reason(), logged.number)
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DayColumns {
    day_of_week: u8,
    columns: Vec<Vec<TimeWindow>>,
    overlaps: Vec<WindowOverlap>,
}

fn schedule(store: &JsonFileStore, action: ScheduleAction, json: bool) -> Result<()> {
    match action {
        ScheduleAction::Show { day } => {
            let schedule = store.schedule();
            let days = match day {
                Some(raw) => vec![parse_day(&raw)?],
                None => (0..7).collect(),
            };
            if json {
                let selected: Vec<_> = days
                    .iter()
                    .filter_map(|d| schedule.day(*d))
                    .collect();
                return print_json(&selected);
            }
            for d in days {
                println!("{:<10} {}", day_name(d), format_windows(schedule.windows_for(d)));
            }
            Ok(())
        }
        ScheduleAction::Add { day, window } => {
            let day = parse_day(&day)?;
            let window: TimeWindow = window.parse()?;
            let overlaps = store
                .update(|data| -> offduty_engine::error::Result<Vec<WindowOverlap>> {
                    data.schedule.add_window(day, window)?;
                    Ok(packer::find_overlaps(data.schedule.windows_for(day)))
                })
                .context("Failed to save schedule")??;

            for o in overlaps
                .iter()
                .filter(|o| o.first == window || o.second == window)
            {
                eprintln!(
                    "warning: {} overlaps {} by {} minute(s)",
                    o.first, o.second, o.overlap_minutes
                );
            }
            if json {
                print_json(&serde_json::json!({ "day_of_week": day, "added": window }))
            } else {
                println!("Added {} on {}.", window, day_name(day));
                Ok(())
            }
        }
        ScheduleAction::Remove { day, window } => {
            let day = parse_day(&day)?;
            let window: TimeWindow = window.parse()?;
            let removed = store
                .update(|data| data.schedule.remove_window(day, &window))
                .context("Failed to save schedule")?;
            if !removed {
                anyhow::bail!("No window {} on {}", window, day_name(day));
            }
            if json {
                print_json(&serde_json::json!({ "day_of_week": day, "removed": window }))
            } else {
                println!("Removed {} from {}.", window, day_name(day));
                Ok(())
            }
        }
        ScheduleAction::Columns { day } => {
            let day = parse_day(&day)?;
            let schedule: Schedule = store.schedule();
            let windows = schedule.windows_for(day);
            let layout = DayColumns {
                day_of_week: day,
                columns: packer::pack_columns(windows),
                overlaps: packer::find_overlaps(windows),
            };
            if json {
                return print_json(&layout);
            }
            println!("{}: {} column(s)", day_name(day), layout.columns.len());
            for (idx, column) in layout.columns.iter().enumerate() {
                println!("  column {}: {}", idx + 1, format_windows(column));
            }
            for o in &layout.overlaps {
                println!(
                    "  overlap: {} and {} share {} minute(s)",
                    o.first, o.second, o.overlap_minutes
                );
            }
            Ok(())
        }
    }
}

fn whitelist(store: &JsonFileStore, action: WhitelistAction, json: bool) -> Result<()> {
    match action {
        WhitelistAction::List => {
            let list = store.whitelist();
            if json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("Whitelist is empty.");
            }
            for c in &list {
                println!("{:<24} {}", c.name, c.phone_e164);
            }
            Ok(())
        }
        WhitelistAction::Add { name, number } => {
            let contact = WhitelistedContact::new(name, number);
            store
                .update(|data| data.whitelist.push(contact.clone()))
                .context("Failed to save whitelist")?;
            if json {
                print_json(&contact)
            } else {
                println!("Whitelisted {} ({}).", contact.name, contact.phone_e164);
                Ok(())
            }
        }
        WhitelistAction::Remove { number } => {
            let removed = store
                .update(|data| contacts::remove_number(&mut data.whitelist, &number))
                .context("Failed to save whitelist")?;
            if removed == 0 {
                anyhow::bail!("No whitelisted contact matches {}", number);
            }
            if json {
                print_json(&serde_json::json!({ "removed": removed }))
            } else {
                println!("Removed {} contact(s).", removed);
                Ok(())
            }
        }
    }
}

fn log(store: &JsonFileStore, zone: Zone, json: bool) -> Result<()> {
    let entries = store.entries();
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No blocked calls.");
    }
    for e in &entries {
        println!("{}  {}", zone.format_millis(e.timestamp_millis), e.number);
    }
    Ok(())
}

fn format_windows(windows: &[TimeWindow]) -> String {
    if windows.is_empty() {
        return "-".to_string();
    }
    windows
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{}", out);
    Ok(())
}
