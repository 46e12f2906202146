use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::{MentorStats, Slot};
use super::user::{MentorSummary, UserRef};
use crate::time::ClockTime;

// Request bodies keep every field optional and stringly typed so validation
// can report all missing or malformed fields at once instead of failing on
// the first one during deserialization.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub mentor_id: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSlotInput {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub mentor_id: Option<String>,
    pub slots: Option<Vec<BulkSlotInput>>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
}

impl UpdateSlotRequest {
    pub fn touches_schedule(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub mentee_id: Option<String>,
    pub booking_id: Option<String>,
}

/// Query string of the mentor availability listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    /// Only the literal `true` enables the flag
    pub include_booked: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    /// Comma-separated skill tokens
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSearchQuery {
    pub skills: Option<String>,
    pub min_experience: Option<String>,
    pub max_experience: Option<String>,
    pub expertise: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenteeBookingsQuery {
    pub include_past: Option<String>,
}

/// A slot as returned by the API, with references resolved where available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    #[serde(flatten)]
    pub slot: Slot,
    pub is_booked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<MentorSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booker: Option<UserRef>,
}

impl From<Slot> for SlotView {
    fn from(slot: Slot) -> Self {
        Self {
            is_booked: slot.is_booked(),
            slot,
            mentor: None,
            booker: None,
        }
    }
}

impl SlotView {
    pub fn with_mentor(mut self, mentor: Option<MentorSummary>) -> Self {
        self.mentor = mentor;
        self
    }

    pub fn with_booker(mut self, booker: Option<UserRef>) -> Self {
        self.booker = booker;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotData {
    pub availability: SlotView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateData {
    pub count: usize,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorAvailabilityData {
    pub mentor_id: Uuid,
    pub count: usize,
    pub availability: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorSlots {
    pub mentor: MentorSummary,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAvailabilityData {
    pub date: NaiveDate,
    /// Number of mentors with at least one open slot
    pub count: usize,
    pub total_slots: usize,
    pub mentors: Vec<MentorSlots>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub limit: u32,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(limit.max(1)));
        Self {
            current_page: page,
            total_pages,
            total_count,
            limit,
            has_more: u64::from(page) < total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorSearchData {
    pub mentors: Vec<MentorSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub availability: SlotView,
    pub meeting_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl From<&UserRef> for Contact {
    fn from(user: &UserRef) -> Self {
        Self {
            name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetails {
    pub meeting_link: Option<String>,
    pub mentor: Option<Contact>,
    pub mentee: Option<Contact>,
    pub schedule: MeetingSchedule,
    pub can_join: bool,
    /// Whole minutes until the start, zero once it has begun
    pub time_until_meeting: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorStatsData {
    pub mentor_id: Uuid,
    #[serde(flatten)]
    pub stats: MentorStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenteeBookingsData {
    pub mentee_id: Uuid,
    pub count: usize,
    pub bookings: Vec<SlotView>,
}
