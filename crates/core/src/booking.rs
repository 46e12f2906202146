//! Booking state machine for availability slots.
//!
//! ```text
//! available --book--> booked --complete--> completed
//!     ^                 |
//!     +-----cancel------+
//!
//! available <--withdraw / reopen--> cancelled
//! ```
//!
//! The `check_*` functions decide whether an operation is allowed for the
//! slot as read; `Transition::apply` performs a booking transition on an
//! owned slot. Stores must compare the expected status and apply the
//! transition atomically against the current row so a concurrent booking
//! cannot slip in between.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{MeshError, MeshResult};
use crate::models::slot::{Slot, SlotStatus};

/// A booking transition, carrying what it writes to the slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Book {
        mentee_id: Uuid,
        booking_id: Option<String>,
        meeting_link: String,
    },
    Cancel,
    Complete,
}

impl Transition {
    /// Status the slot must hold for the transition to apply
    pub fn expected_status(&self) -> SlotStatus {
        match self {
            Transition::Book { .. } => SlotStatus::Available,
            Transition::Cancel | Transition::Complete => SlotStatus::Booked,
        }
    }

    pub fn target_status(&self) -> SlotStatus {
        match self {
            Transition::Book { .. } => SlotStatus::Booked,
            Transition::Cancel => SlotStatus::Available,
            Transition::Complete => SlotStatus::Completed,
        }
    }

    /// Writes the transition into `slot`
    ///
    /// Callers must have checked `expected_status` against the current row.
    pub fn apply(self, slot: &mut Slot) {
        slot.status = self.target_status();
        match self {
            Transition::Book {
                mentee_id,
                booking_id,
                meeting_link,
            } => {
                slot.booked_by = Some(mentee_id);
                slot.booking_id = booking_id;
                slot.meeting_link = Some(meeting_link);
            }
            Transition::Cancel => {
                slot.booked_by = None;
                slot.booking_id = None;
            }
            // Completed sessions keep their mentee as history
            Transition::Complete => {}
        }
    }
}

pub fn check_book(slot: &Slot, now: DateTime<Utc>) -> MeshResult<()> {
    match slot.status {
        SlotStatus::Available => {}
        SlotStatus::Booked => {
            return Err(MeshError::conflict("This slot is already booked", None));
        }
        SlotStatus::Completed | SlotStatus::Cancelled => {
            return Err(MeshError::PreconditionFailed(format!(
                "Cannot book a {} slot",
                slot.status
            )));
        }
    }
    if slot.starts_at() <= now {
        return Err(MeshError::validation("Cannot book a slot in the past"));
    }
    Ok(())
}

pub fn check_cancel(slot: &Slot) -> MeshResult<()> {
    if slot.status != SlotStatus::Booked {
        return Err(MeshError::PreconditionFailed(
            "This slot is not booked".to_string(),
        ));
    }
    Ok(())
}

pub fn check_complete(slot: &Slot) -> MeshResult<()> {
    if slot.status != SlotStatus::Booked {
        return Err(MeshError::PreconditionFailed(format!(
            "Only booked slots can be completed (slot is {})",
            slot.status
        )));
    }
    Ok(())
}

pub fn check_delete(slot: &Slot) -> MeshResult<()> {
    match slot.status {
        SlotStatus::Available | SlotStatus::Cancelled => Ok(()),
        SlotStatus::Booked => Err(MeshError::PreconditionFailed(
            "Cannot delete a booked slot. Cancel the booking first.".to_string(),
        )),
        SlotStatus::Completed => Err(MeshError::PreconditionFailed(
            "Cannot delete a completed session".to_string(),
        )),
    }
}

/// Date and time are frozen once a mentee holds or has held the slot
pub fn check_schedule_edit(slot: &Slot) -> MeshResult<()> {
    match slot.status {
        SlotStatus::Available | SlotStatus::Cancelled => Ok(()),
        SlotStatus::Booked => Err(MeshError::PreconditionFailed(
            "Cannot update date/time of a booked slot. Cancel it first or update other fields only."
                .to_string(),
        )),
        SlotStatus::Completed => Err(MeshError::PreconditionFailed(
            "Cannot update date/time of a completed session".to_string(),
        )),
    }
}

/// Status changes allowed through a plain update
///
/// Only withdrawing an open slot and re-opening a withdrawn one are direct
/// edits; booking, cancelling a booking and completing have their own
/// operations because they carry mentee data.
pub fn check_status_edit(from: SlotStatus, to: SlotStatus) -> MeshResult<()> {
    if from == to {
        return Ok(());
    }
    match (from, to) {
        (SlotStatus::Available, SlotStatus::Cancelled)
        | (SlotStatus::Cancelled, SlotStatus::Available) => Ok(()),
        (_, SlotStatus::Booked) => Err(MeshError::validation(
            "Use the booking operation to book a slot",
        )),
        (_, SlotStatus::Completed) => Err(MeshError::validation(
            "Use the complete operation to mark a session completed",
        )),
        (SlotStatus::Booked, _) => Err(MeshError::PreconditionFailed(
            "Cannot change the status of a booked slot. Cancel the booking first.".to_string(),
        )),
        (SlotStatus::Completed, _) => Err(MeshError::PreconditionFailed(
            "Cannot change the status of a completed session".to_string(),
        )),
        _ => Err(MeshError::PreconditionFailed(format!(
            "Cannot change status from {} to {}",
            from, to
        ))),
    }
}
