//! Input validation for slot requests.
//!
//! Every check runs and every violation is reported, so a caller can fix a
//! request in one round trip.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::booking::{check_schedule_edit, check_status_edit};
use crate::errors::{MeshError, MeshResult};
use crate::models::availability::{
    BulkCreateRequest, CreateSlotRequest, MentorSearchQuery, UpdateSlotRequest,
};
use crate::models::slot::{NewSlot, Slot, SlotStatus};
use crate::models::user::{
    DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, MentorSearch, MentorSort, split_skills,
};
use crate::overlap::batch_overlaps;
use crate::time::{ClockTime, DEFAULT_TIMEZONE, local_today, parse_slot_date, parse_timezone};

pub const MAX_NOTES_LEN: usize = 500;
pub const MAX_BULK_SLOTS: usize = 100;

/// Raw slot fields shared by single and bulk creation
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotFields<'a> {
    pub date: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub timezone: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl<'a> From<&'a CreateSlotRequest> for SlotFields<'a> {
    fn from(req: &'a CreateSlotRequest) -> Self {
        Self {
            date: req.date.as_deref(),
            start_time: req.start_time.as_deref(),
            end_time: req.end_time.as_deref(),
            timezone: req.timezone.as_deref(),
            notes: req.notes.as_deref(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_id(field: &str, raw: Option<&str>) -> Result<Uuid, String> {
    let raw = present(raw).ok_or_else(|| format!("{} is required", field))?;
    Uuid::parse_str(raw).map_err(|_| format!("{} must be a valid id", field))
}

fn parse_time(field: &str, raw: &str, errors: &mut Vec<String>) -> Option<ClockTime> {
    match raw.parse::<ClockTime>() {
        Ok(time) => Some(time),
        Err(_) => {
            errors.push(format!("{} must be in HH:MM format", field));
            None
        }
    }
}

fn check_timezone(raw: &str, errors: &mut Vec<String>) {
    if parse_timezone(raw).is_none() {
        errors.push(format!("Unknown timezone '{}'", raw));
    }
}

fn check_notes(notes: &str, errors: &mut Vec<String>) {
    if notes.chars().count() > MAX_NOTES_LEN {
        errors.push(format!("Notes cannot exceed {} characters", MAX_NOTES_LEN));
    }
}

fn check_order(start: ClockTime, end: ClockTime, errors: &mut Vec<String>) {
    if end <= start {
        errors.push("End time must be after start time".to_string());
    }
}

fn is_past_date(date: NaiveDate, timezone: &str, now: DateTime<Utc>) -> bool {
    date < local_today(now, timezone)
}

/// Validates the fields of one slot, collecting every violation
pub fn validate_slot_fields(
    mentor_id: Uuid,
    fields: SlotFields<'_>,
    now: DateTime<Utc>,
) -> Result<NewSlot, Vec<String>> {
    let mut errors = Vec::new();

    let timezone = present(fields.timezone).unwrap_or(DEFAULT_TIMEZONE).to_string();
    check_timezone(&timezone, &mut errors);

    let date = match present(fields.date) {
        None => {
            errors.push("date is required".to_string());
            None
        }
        Some(raw) => match parse_slot_date(raw) {
            Some(date) if is_past_date(date, &timezone, now) => {
                errors.push("Cannot create availability slot in the past".to_string());
                None
            }
            Some(date) => Some(date),
            None => {
                errors.push("date must be a valid calendar date (YYYY-MM-DD)".to_string());
                None
            }
        },
    };

    let start = match present(fields.start_time) {
        None => {
            errors.push("startTime is required".to_string());
            None
        }
        Some(raw) => parse_time("Start time", raw, &mut errors),
    };
    let end = match present(fields.end_time) {
        None => {
            errors.push("endTime is required".to_string());
            None
        }
        Some(raw) => parse_time("End time", raw, &mut errors),
    };
    if let (Some(start), Some(end)) = (start, end) {
        check_order(start, end, &mut errors);
    }

    let notes = fields.notes.map(str::trim).unwrap_or_default().to_string();
    check_notes(&notes, &mut errors);

    match (date, start, end) {
        (Some(date), Some(start_time), Some(end_time)) if errors.is_empty() => Ok(NewSlot {
            mentor_id,
            date,
            start_time,
            end_time,
            timezone,
            notes,
        }),
        _ => Err(errors),
    }
}

pub fn validate_create(req: &CreateSlotRequest, now: DateTime<Utc>) -> MeshResult<NewSlot> {
    let mentor = parse_id("mentorId", req.mentor_id.as_deref());
    let slot = validate_slot_fields(mentor.clone().unwrap_or_default(), req.into(), now);

    match (mentor, slot) {
        (Ok(_), Ok(slot)) => Ok(slot),
        (mentor, slot) => {
            let mut errors = Vec::new();
            if let Err(e) = mentor {
                errors.push(e);
            }
            if let Err(slot_errors) = slot {
                errors.extend(slot_errors);
            }
            Err(MeshError::validation_errors("Validation failed", errors))
        }
    }
}

/// Validates a bulk request: every element independently, then the batch
/// against itself
///
/// Element errors are prefixed with the 1-based position of the element.
pub fn validate_bulk(req: &BulkCreateRequest, now: DateTime<Utc>) -> MeshResult<(Uuid, Vec<NewSlot>)> {
    let mentor_id = parse_id("mentorId", req.mentor_id.as_deref())
        .map_err(|e| MeshError::validation_errors("mentorId and slots array are required", vec![e]))?;

    let inputs = match req.slots.as_deref() {
        Some(inputs) if !inputs.is_empty() => inputs,
        _ => {
            return Err(MeshError::validation_errors(
                "mentorId and slots array are required",
                vec!["slots must contain at least one slot".to_string()],
            ));
        }
    };
    if inputs.len() > MAX_BULK_SLOTS {
        return Err(MeshError::validation_errors(
            "Too many slots in one request",
            vec![format!("At most {} slots can be created at once", MAX_BULK_SLOTS)],
        ));
    }

    let mut errors = Vec::new();
    let mut slots = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let fields = SlotFields {
            date: input.date.as_deref(),
            start_time: input.start_time.as_deref(),
            end_time: input.end_time.as_deref(),
            timezone: input.timezone.as_deref(),
            notes: input.notes.as_deref(),
        };
        match validate_slot_fields(mentor_id, fields, now) {
            Ok(slot) => slots.push(slot),
            Err(slot_errors) => errors.extend(
                slot_errors
                    .into_iter()
                    .map(|e| format!("Slot {}: {}", index + 1, e)),
            ),
        }
    }

    if errors.is_empty() {
        for (earlier, later) in batch_overlaps(&slots) {
            errors.push(format!(
                "Slot {}: overlaps with slot {} in the same request",
                later + 1,
                earlier + 1
            ));
        }
    }

    if errors.is_empty() {
        Ok((mentor_id, slots))
    } else {
        Err(MeshError::validation_errors(
            "Some slots have validation errors",
            errors,
        ))
    }
}

/// Applies an update request to a copy of `current`
///
/// State preconditions are checked before field validation, so editing the
/// schedule of a booked slot is reported as such even if the new values are
/// also malformed.
pub fn patch_slot(current: &Slot, req: &UpdateSlotRequest, now: DateTime<Utc>) -> MeshResult<Slot> {
    if req.touches_schedule() {
        check_schedule_edit(current)?;
    }

    let new_status = match present(req.status.as_deref()) {
        Some(raw) => Some(
            raw.parse::<SlotStatus>()
                .map_err(|e| MeshError::validation_errors("Validation failed", vec![e]))?,
        ),
        None => None,
    };
    if let Some(status) = new_status {
        check_status_edit(current.status, status)?;
    }

    let mut errors = Vec::new();
    let mut next = current.clone();

    if let Some(raw) = present(req.timezone.as_deref()) {
        check_timezone(raw, &mut errors);
        next.timezone = raw.to_string();
    }

    if let Some(raw) = present(req.date.as_deref()) {
        match parse_slot_date(raw) {
            Some(date) if is_past_date(date, &next.timezone, now) => {
                errors.push("Cannot set date in the past".to_string());
            }
            Some(date) => next.date = date,
            None => errors.push("date must be a valid calendar date (YYYY-MM-DD)".to_string()),
        }
    }
    if let Some(raw) = present(req.start_time.as_deref())
        && let Some(time) = parse_time("Start time", raw, &mut errors)
    {
        next.start_time = time;
    }
    if let Some(raw) = present(req.end_time.as_deref())
        && let Some(time) = parse_time("End time", raw, &mut errors)
    {
        next.end_time = time;
    }
    check_order(next.start_time, next.end_time, &mut errors);

    if let Some(notes) = req.notes.as_deref() {
        let notes = notes.trim();
        check_notes(notes, &mut errors);
        next.notes = notes.to_string();
    }
    if let Some(link) = req.meeting_link.as_deref() {
        let link = link.trim();
        next.meeting_link = (!link.is_empty()).then(|| link.to_string());
    }
    if let Some(status) = new_status {
        next.status = status;
    }

    if errors.is_empty() {
        Ok(next)
    } else {
        Err(MeshError::validation_errors("Validation failed", errors))
    }
}

/// Parses an optional date filter such as `startDate`
/// Query flags are on only for the literal `true`; anything else is off
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

pub fn parse_date_param(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match present(raw) {
        None => Ok(None),
        Some(raw) => parse_slot_date(raw)
            .map(Some)
            .ok_or_else(|| format!("{} must be a valid calendar date (YYYY-MM-DD)", field)),
    }
}

fn parse_experience(field: &str, raw: Option<&str>, errors: &mut Vec<String>) -> Option<i32> {
    let raw = present(raw)?;
    match raw.parse::<i32>() {
        Ok(years) if years >= 0 => Some(years),
        _ => {
            errors.push(format!("{} must be a non-negative whole number", field));
            None
        }
    }
}

/// Normalizes mentor search parameters
///
/// Paging values are lenient: a missing or malformed limit falls back to the
/// default and is clamped to `1..=MAX_SEARCH_LIMIT`; the page is at least 1.
pub fn validate_search(query: &MentorSearchQuery) -> MeshResult<MentorSearch> {
    let mut errors = Vec::new();
    let min_experience = parse_experience("minExperience", query.min_experience.as_deref(), &mut errors);
    let max_experience = parse_experience("maxExperience", query.max_experience.as_deref(), &mut errors);
    if let (Some(min), Some(max)) = (min_experience, max_experience)
        && min > max
    {
        errors.push("minExperience cannot exceed maxExperience".to_string());
    }
    if !errors.is_empty() {
        return Err(MeshError::validation_errors("Invalid search parameters", errors));
    }

    let limit = present(query.limit.as_deref())
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    let page = present(query.page.as_deref())
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);

    Ok(MentorSearch {
        skills: query.skills.as_deref().map(split_skills).unwrap_or_default(),
        min_experience,
        max_experience,
        expertise: present(query.expertise.as_deref()).map(str::to_string),
        search: present(query.search.as_deref()).map(str::to_string),
        sort: MentorSort::parse_lenient(present(query.sort_by.as_deref())),
        limit,
        page,
    })
}
