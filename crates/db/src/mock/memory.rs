use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use mentormesh_core::booking::Transition;
use mentormesh_core::models::slot::{
    MentorStats, NewSlot, Slot, SlotFilter, SlotStatus, chronological,
};
use mentormesh_core::models::user::{MentorSearch, UserRecord};
use mentormesh_core::overlap::{Candidate, find_conflict};

use crate::repositories::{InsertOutcome, SaveOutcome, SlotRepository, UserDirectory};

#[derive(Debug, Default)]
struct State {
    slots: HashMap<Uuid, Slot>,
    users: HashMap<Uuid, UserRecord>,
}

/// Slot store and user directory held in memory
///
/// Each operation runs under a single write (or read) guard, which gives it
/// the same all-or-nothing behaviour as a Postgres transaction. Clones share
/// the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, user: UserRecord) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Stores a slot as-is, bypassing validation and overlap checks
    pub async fn seed_slot(&self, slot: Slot) {
        self.state.write().await.slots.insert(slot.id, slot);
    }

    pub async fn slot_count(&self) -> usize {
        self.state.read().await.slots.len()
    }
}

#[async_trait]
impl SlotRepository for InMemoryStore {
    async fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<InsertOutcome> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let mut staged: Vec<Slot> = Vec::with_capacity(slots.len());
        for (index, new_slot) in slots.into_iter().enumerate() {
            let candidate = Candidate::for_new_slot(&new_slot);
            if let Some(existing) = find_conflict(state.slots.values().chain(staged.iter()), &candidate)
            {
                return Ok(InsertOutcome::Overlap {
                    index,
                    existing: existing.clone(),
                });
            }

            staged.push(Slot {
                id: Uuid::new_v4(),
                mentor_id: new_slot.mentor_id,
                date: new_slot.date,
                start_time: new_slot.start_time,
                end_time: new_slot.end_time,
                status: SlotStatus::Available,
                booked_by: None,
                booking_id: None,
                meeting_link: None,
                timezone: new_slot.timezone,
                notes: new_slot.notes,
                version: 1,
                created_at: now,
                updated_at: now,
            });
        }

        for slot in &staged {
            state.slots.insert(slot.id, slot.clone());
        }
        Ok(InsertOutcome::Inserted(staged))
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>> {
        Ok(self.state.read().await.slots.get(&id).cloned())
    }

    async fn list_mentor_slots(&self, mentor_id: Uuid, filter: SlotFilter) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        let mut slots: Vec<Slot> = state
            .slots
            .values()
            .filter(|slot| slot.mentor_id == mentor_id && filter.matches(slot))
            .cloned()
            .collect();
        slots.sort_by(chronological);
        Ok(slots)
    }

    async fn list_open_slots_on(&self, date: NaiveDate) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        let mut slots: Vec<Slot> = state
            .slots
            .values()
            .filter(|slot| slot.date == date && slot.status == SlotStatus::Available)
            .cloned()
            .collect();
        slots.sort_by_key(|slot| (slot.start_time, slot.mentor_id));
        Ok(slots)
    }

    async fn list_mentee_slots(
        &self,
        mentee_id: Uuid,
        statuses: Vec<SlotStatus>,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        let mut slots: Vec<Slot> = state
            .slots
            .values()
            .filter(|slot| {
                slot.booked_by == Some(mentee_id)
                    && statuses.contains(&slot.status)
                    && from_date.is_none_or(|from| slot.date >= from)
            })
            .cloned()
            .collect();
        slots.sort_by(chronological);
        Ok(slots)
    }

    async fn mentor_stats(&self, mentor_id: Uuid, today: NaiveDate) -> Result<MentorStats> {
        let state = self.state.read().await;
        let mut stats = MentorStats::default();
        for slot in state.slots.values().filter(|s| s.mentor_id == mentor_id) {
            stats.total_slots += 1;
            match slot.status {
                SlotStatus::Booked => stats.booked_slots += 1,
                SlotStatus::Available if slot.date >= today => stats.available_slots += 1,
                SlotStatus::Completed => stats.completed_slots += 1,
                _ => {}
            }
        }
        Ok(stats)
    }

    async fn save_slot(&self, slot: Slot) -> Result<SaveOutcome> {
        let mut state = self.state.write().await;

        let Some(current) = state.slots.get(&slot.id) else {
            return Ok(SaveOutcome::Stale);
        };
        if current.version != slot.version {
            return Ok(SaveOutcome::Stale);
        }

        if slot.status.blocks_calendar()
            && let Some(existing) = find_conflict(state.slots.values(), &Candidate::for_existing(&slot))
        {
            return Ok(SaveOutcome::Overlap(existing.clone()));
        }

        // Booking fields only change through transitions
        let saved = Slot {
            booked_by: current.booked_by,
            booking_id: current.booking_id.clone(),
            version: current.version + 1,
            updated_at: Utc::now(),
            ..slot
        };
        state.slots.insert(saved.id, saved.clone());
        Ok(SaveOutcome::Saved(saved))
    }

    async fn delete_slot(&self, id: Uuid, expected_version: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.slots.get(&id) {
            Some(slot) if slot.version == expected_version => {
                state.slots.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        expected_version: i64,
        transition: Transition,
    ) -> Result<Option<Slot>> {
        let mut state = self.state.write().await;
        let Some(slot) = state.slots.get_mut(&id) else {
            return Ok(None);
        };
        if slot.version != expected_version || slot.status != transition.expected_status() {
            return Ok(None);
        }

        transition.apply(slot);
        slot.version += 1;
        slot.updated_at = Utc::now();
        Ok(Some(slot.clone()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_users(&self, ids: Vec<Uuid>) -> Result<Vec<UserRecord>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn search_mentors(&self, search: MentorSearch) -> Result<(Vec<UserRecord>, u64)> {
        let state = self.state.read().await;
        let mut matched: Vec<UserRecord> = state
            .users
            .values()
            .filter(|user| search.matches(user))
            .cloned()
            .collect();
        search.sort_records(&mut matched);

        let total = matched.len() as u64;
        let offset = usize::try_from(search.offset()).unwrap_or(usize::MAX);
        let page = matched
            .into_iter()
            .skip(offset)
            .take(search.limit as usize)
            .collect();
        Ok((page, total))
    }
}
