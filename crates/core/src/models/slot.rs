use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{ClockTime, slot_instant};

/// Lifecycle state of an availability slot
///
/// `Available` and `Booked` slots occupy the mentor's calendar and take part
/// in overlap checks; `Completed` and `Cancelled` slots never block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
    Completed,
    Cancelled,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 4] = [
        SlotStatus::Available,
        SlotStatus::Booked,
        SlotStatus::Completed,
        SlotStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Booked => "booked",
            SlotStatus::Completed => "completed",
            SlotStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a slot in this state occupies its time range
    pub fn blocks_calendar(&self) -> bool {
        matches!(self, SlotStatus::Available | SlotStatus::Booked)
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SlotStatus::Available),
            "booked" => Ok(SlotStatus::Booked),
            "completed" => Ok(SlotStatus::Completed),
            "cancelled" => Ok(SlotStatus::Cancelled),
            other => Err(format!(
                "Status must be one of available, booked, completed, cancelled (got '{}')",
                other
            )),
        }
    }
}

/// A bookable interval on a mentor's calendar
///
/// `status` is the single source of truth for the booking state. `booked_by`
/// is set while booked and kept on completed slots as session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: SlotStatus,
    pub booked_by: Option<Uuid>,
    pub booking_id: Option<String>,
    pub meeting_link: Option<String>,
    pub timezone: String,
    pub notes: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn is_booked(&self) -> bool {
        self.status == SlotStatus::Booked
    }

    /// Absolute instant the slot starts at, in the slot's timezone
    pub fn starts_at(&self) -> DateTime<Utc> {
        slot_instant(self.date, self.start_time, &self.timezone)
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        slot_instant(self.date, self.end_time, &self.timezone)
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time.minutes().saturating_sub(self.start_time.minutes())
    }
}

/// A validated slot ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub mentor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub timezone: String,
    pub notes: String,
}

/// Filters for listing a mentor's slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Statuses to return; empty means every status
    pub statuses: Vec<SlotStatus>,
}

impl SlotFilter {
    pub fn matches(&self, slot: &Slot) -> bool {
        self.start_date.is_none_or(|start| slot.date >= start)
            && self.end_date.is_none_or(|end| slot.date <= end)
            && (self.statuses.is_empty() || self.statuses.contains(&slot.status))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorStats {
    pub total_slots: u64,
    pub booked_slots: u64,
    pub available_slots: u64,
    pub completed_slots: u64,
}

/// Sort key used for every slot listing: date, then start time
pub fn chronological(a: &Slot, b: &Slot) -> std::cmp::Ordering {
    (a.date, a.start_time).cmp(&(b.date, b.start_time))
}
