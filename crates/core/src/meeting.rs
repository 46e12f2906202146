//! Meeting room links and the join window for booked sessions.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub const DEFAULT_MEETING_BASE_URL: &str = "https://meet.jit.si";

/// How long before the start a participant may join
pub const JOIN_WINDOW_MINUTES: i64 = 10;

/// Deterministic video room link for a slot
///
/// The room name depends only on the mentor and slot ids, so booking the
/// same slot again always yields the same link.
pub fn meeting_link(base_url: &str, mentor_id: Uuid, slot_id: Uuid) -> String {
    format!(
        "{}/mentormesh-{}-{}",
        base_url.trim_end_matches('/'),
        mentor_id,
        slot_id
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinWindow {
    pub can_join: bool,
    pub minutes_until_start: i64,
}

/// Join status for a session starting at `starts_at`
///
/// Joining opens ten minutes before the start and stays open afterwards.
/// Minutes are floored and never negative.
pub fn join_window(starts_at: DateTime<Utc>, now: DateTime<Utc>) -> JoinWindow {
    let until = starts_at - now;
    JoinWindow {
        can_join: until <= Duration::minutes(JOIN_WINDOW_MINUTES),
        minutes_until_start: until.num_minutes().max(0),
    }
}
