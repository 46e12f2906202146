//! Wall-clock helpers for slot scheduling.
//!
//! Slots are stored as a calendar date plus `HH:MM` start/end strings. All
//! interval arithmetic happens on minutes since midnight of those literal
//! digits; the slot's timezone only matters when a date and clock time are
//! turned into an absolute instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// A 24-hour wall-clock time with minute precision
///
/// Parsed from `HH:MM` (a single hour digit is accepted) and always rendered
/// zero-padded, so the string form sorts the same way as the minute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    /// Minutes since midnight
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClockTimeError(String);

impl fmt::Display for ParseClockTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid HH:MM time", self.0)
    }
}

impl std::error::Error for ParseClockTimeError {}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockTimeError(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(err)?;

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
            return Err(err());
        }

        let hour: u16 = hour.parse().map_err(|_| err())?;
        let minute: u16 = minute.parse().map_err(|_| err())?;
        ClockTime::from_hm(hour, minute).ok_or_else(err)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a slot date from either `YYYY-MM-DD` or an RFC 3339 timestamp
///
/// Only the calendar date is kept; any time-of-day component is dropped.
pub fn parse_slot_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
}

pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Resolves a slot's date and clock time to an absolute instant
///
/// The wall-clock value is interpreted in `timezone`; unknown zone labels
/// fall back to UTC. A local time skipped by a DST gap is read with the
/// offset in force before the gap, so it lands just after the jump; during an
/// overlap the earlier instant wins.
pub fn slot_instant(date: NaiveDate, time: ClockTime, timezone: &str) -> DateTime<Utc> {
    let naive = date.and_time(time.to_naive_time());
    let Some(tz) = parse_timezone(timezone) else {
        return Utc.from_utc_datetime(&naive);
    };

    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return local.with_timezone(&Utc);
    }
    match tz.from_local_datetime(&(naive - Duration::days(1))).earliest() {
        Some(day_before) => {
            let offset = day_before.offset().fix().local_minus_utc();
            Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset))))
        }
        None => Utc.from_utc_datetime(&naive),
    }
}

/// The calendar date `now` falls on in `timezone`
pub fn local_today(now: DateTime<Utc>, timezone: &str) -> NaiveDate {
    match parse_timezone(timezone) {
        Some(tz) => now.with_timezone(&tz).date_naive(),
        None => now.date_naive(),
    }
}
