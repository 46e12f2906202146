//! Store traits consumed by the availability service, and their Postgres
//! implementations.
//!
//! Every mutating operation is conditional on the row's `version` (and, for
//! booking transitions, its status), so a concurrent writer makes the second
//! call fail instead of silently overwriting the first.

pub mod slot;
pub mod user;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use mentormesh_core::booking::Transition;
use mentormesh_core::models::slot::{MentorStats, NewSlot, Slot, SlotFilter, SlotStatus};
use mentormesh_core::models::user::{MentorSearch, UserRecord};
use uuid::Uuid;

use crate::DbPool;

/// Result of inserting a batch of slots
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Vec<Slot>),
    /// Element `index` of the batch overlaps `existing`; nothing was written
    Overlap { index: usize, existing: Slot },
}

/// Result of writing back an edited slot
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Slot),
    /// The edited range overlaps another blocking slot
    Overlap(Slot),
    /// The row changed (or vanished) since it was read
    Stale,
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Inserts all slots or none, checking each against stored slots of the
    /// same mentor while holding the mentor's write lock
    async fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<InsertOutcome>;

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>>;

    /// Mentor's slots matching `filter`, ordered by date and start time
    async fn list_mentor_slots(&self, mentor_id: Uuid, filter: SlotFilter) -> Result<Vec<Slot>>;

    /// Every available slot on `date`, ordered by start time
    async fn list_open_slots_on(&self, date: NaiveDate) -> Result<Vec<Slot>>;

    /// Slots booked by `mentee_id` in one of `statuses`, optionally from a date on
    async fn list_mentee_slots(
        &self,
        mentee_id: Uuid,
        statuses: Vec<SlotStatus>,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<Slot>>;

    async fn mentor_stats(&self, mentor_id: Uuid, today: NaiveDate) -> Result<MentorStats>;

    /// Writes an edited slot if its version still matches the stored row
    ///
    /// Schedule and status fields are re-checked for overlaps when the slot
    /// blocks the calendar.
    async fn save_slot(&self, slot: Slot) -> Result<SaveOutcome>;

    /// Deletes the slot if its version still matches; false otherwise
    async fn delete_slot(&self, id: Uuid, expected_version: i64) -> Result<bool>;

    /// Applies a booking transition if the row still has `expected_version`
    /// and the transition's expected status; returns the updated slot, or
    /// `None` when the row did not match
    async fn apply_transition(
        &self,
        id: Uuid,
        expected_version: i64,
        transition: Transition,
    ) -> Result<Option<Slot>>;
}

/// Read-only access to mentor and mentee records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>>;

    /// Records for the given ids; unknown ids are skipped
    async fn get_users(&self, ids: Vec<Uuid>) -> Result<Vec<UserRecord>>;

    /// One page of listed mentors matching `search`, and the total match count
    async fn search_mentors(&self, search: MentorSearch) -> Result<(Vec<UserRecord>, u64)>;
}

/// Postgres-backed slot store
#[derive(Debug, Clone)]
pub struct PgSlotRepository {
    pool: DbPool,
}

impl PgSlotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PgSlotRepository {
    async fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<InsertOutcome> {
        slot::insert_slots(&self.pool, &slots).await
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>> {
        slot::get_slot_by_id(&self.pool, id).await
    }

    async fn list_mentor_slots(&self, mentor_id: Uuid, filter: SlotFilter) -> Result<Vec<Slot>> {
        slot::get_slots_by_mentor(&self.pool, mentor_id, &filter).await
    }

    async fn list_open_slots_on(&self, date: NaiveDate) -> Result<Vec<Slot>> {
        slot::get_open_slots_by_date(&self.pool, date).await
    }

    async fn list_mentee_slots(
        &self,
        mentee_id: Uuid,
        statuses: Vec<SlotStatus>,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<Slot>> {
        slot::get_slots_by_mentee(&self.pool, mentee_id, &statuses, from_date).await
    }

    async fn mentor_stats(&self, mentor_id: Uuid, today: NaiveDate) -> Result<MentorStats> {
        slot::count_mentor_slots(&self.pool, mentor_id, today).await
    }

    async fn save_slot(&self, slot: Slot) -> Result<SaveOutcome> {
        slot::update_slot(&self.pool, &slot).await
    }

    async fn delete_slot(&self, id: Uuid, expected_version: i64) -> Result<bool> {
        slot::delete_slot(&self.pool, id, expected_version).await
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        expected_version: i64,
        transition: Transition,
    ) -> Result<Option<Slot>> {
        slot::transition_slot(&self.pool, id, expected_version, &transition).await
    }
}

/// Postgres-backed user directory
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>> {
        user::get_user_by_id(&self.pool, id).await
    }

    async fn get_users(&self, ids: Vec<Uuid>) -> Result<Vec<UserRecord>> {
        user::get_users_by_ids(&self.pool, &ids).await
    }

    async fn search_mentors(&self, search: MentorSearch) -> Result<(Vec<UserRecord>, u64)> {
        user::search_mentors(&self.pool, &search).await
    }
}
