//! Current moment, decomposed into the local day-of-week and minute-of-day the
//! schedule is expressed in.
//!
//! The local zone is either the host's zone or an IANA zone resolved through
//! `chrono-tz`, so a filter can run on a server whose clock is in UTC while the
//! schedule owner lives elsewhere.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::error::{FilterError, Result};
use crate::schedule::weekday_index;

/// A point in time as seen by the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moment {
    /// 0 = Sunday .. 6 = Saturday, in the local zone.
    pub day_of_week: u8,
    /// `hour * 60 + minute` in the local zone. Seconds are ignored.
    pub minute_of_day: u16,
    /// Unix epoch milliseconds.
    pub timestamp_millis: i64,
}

impl Moment {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            day_of_week: weekday_index(dt.weekday()),
            minute_of_day: (dt.hour() * 60 + dt.minute()) as u16,
            timestamp_millis: dt.timestamp_millis(),
        }
    }
}

/// Time zone the schedule is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's configured local zone.
    #[default]
    Local,
    Named(chrono_tz::Tz),
}

impl Zone {
    /// Decompose a UTC instant in this zone.
    pub fn moment(&self, instant: DateTime<Utc>) -> Moment {
        match self {
            Zone::Local => Moment::from_datetime(&instant.with_timezone(&Local)),
            Zone::Named(tz) => Moment::from_datetime(&instant.with_timezone(tz)),
        }
    }

    /// Render a UTC epoch-millis timestamp as local `YYYY-MM-DD HH:MM:SS`.
    pub fn format_millis(&self, millis: i64) -> String {
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(millis) else {
            return millis.to_string();
        };
        const FMT: &str = "%Y-%m-%d %H:%M:%S";
        match self {
            Zone::Local => instant.with_timezone(&Local).format(FMT).to_string(),
            Zone::Named(tz) => instant.with_timezone(tz).format(FMT).to_string(),
        }
    }
}

/// Accepts `"local"` (case-insensitive) or an IANA identifier such as
/// `"Asia/Jerusalem"`.
impl FromStr for Zone {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        s.parse::<chrono_tz::Tz>()
            .map(Zone::Named)
            .map_err(|_| FilterError::InvalidTimezone(s.to_string()))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Source of the current moment.
pub trait Clock: Send + Sync {
    fn now(&self) -> Moment;
}

/// Wall clock in a configured zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        self.zone.moment(Utc::now())
    }
}

/// A clock frozen at one moment. Used for replaying decisions and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Moment);

impl Clock for FixedClock {
    fn now(&self) -> Moment {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_zone_shifts_day_and_minute() {
        // Monday 2026-03-16 23:30 UTC is Tuesday 01:30 in Jerusalem (UTC+2).
        let instant = Utc.with_ymd_and_hms(2026, 3, 16, 23, 30, 0).unwrap();
        let zone: Zone = "Asia/Jerusalem".parse().unwrap();
        let m = zone.moment(instant);
        assert_eq!(m.day_of_week, 2);
        assert_eq!(m.minute_of_day, 90);
        assert_eq!(m.timestamp_millis, instant.timestamp_millis());
    }

    #[test]
    fn seconds_are_truncated() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 15, 9, 59, 59).unwrap();
        let m = Zone::Named(chrono_tz::UTC).moment(instant);
        assert_eq!(m.day_of_week, 0);
        assert_eq!(m.minute_of_day, 599);
    }

    #[test]
    fn unknown_zone_rejected() {
        let err = "Mars/Olympus_Mons".parse::<Zone>().unwrap_err();
        assert!(matches!(err, FilterError::InvalidTimezone(_)));
    }

    #[test]
    fn local_keyword_parses() {
        assert_eq!("LOCAL".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!(Zone::Local.to_string(), "local");
    }
}
