//! Overlap detection between slots on a mentor's calendar.
//!
//! Intervals are half-open: `[start, end)`. Two intervals on the same mentor
//! and date conflict iff `s1 < e2 && s2 < e1`, so back-to-back slots such as
//! 09:00-10:00 and 10:00-11:00 do not conflict. Only slots whose status
//! blocks the calendar (available, booked) are considered.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::slot::{NewSlot, Slot};
use crate::time::ClockTime;

/// Half-open interval overlap test on wall-clock times
pub fn intervals_overlap(
    a_start: ClockTime,
    a_end: ClockTime,
    b_start: ClockTime,
    b_end: ClockTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// A candidate interval to test against a mentor's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub mentor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Slot to ignore, used when re-checking a slot against its neighbours
    pub exclude: Option<Uuid>,
}

impl Candidate {
    pub fn for_new_slot(slot: &NewSlot) -> Self {
        Self {
            mentor_id: slot.mentor_id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            exclude: None,
        }
    }

    pub fn for_existing(slot: &Slot) -> Self {
        Self {
            mentor_id: slot.mentor_id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            exclude: Some(slot.id),
        }
    }

    pub fn conflicts_with(&self, slot: &Slot) -> bool {
        self.exclude != Some(slot.id)
            && slot.mentor_id == self.mentor_id
            && slot.date == self.date
            && slot.status.blocks_calendar()
            && intervals_overlap(self.start_time, self.end_time, slot.start_time, slot.end_time)
    }
}

/// Returns the earliest-starting slot that conflicts with `candidate`
pub fn find_conflict<'a, I>(slots: I, candidate: &Candidate) -> Option<&'a Slot>
where
    I: IntoIterator<Item = &'a Slot>,
{
    slots
        .into_iter()
        .filter(|slot| candidate.conflicts_with(slot))
        .min_by_key(|slot| slot.start_time)
}

/// Pairs of overlapping entries inside one batch, as `(earlier, later)` indexes
///
/// Each later entry is reported once, against the first earlier entry it
/// overlaps.
pub fn batch_overlaps(batch: &[NewSlot]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (later, b) in batch.iter().enumerate() {
        let clash = batch[..later].iter().position(|a| {
            a.mentor_id == b.mentor_id
                && a.date == b.date
                && intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
        });
        if let Some(earlier) = clash {
            pairs.push((earlier, later));
        }
    }
    pairs
}
