use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use mentormesh_core::booking::{
    Transition, check_book, check_cancel, check_complete, check_delete,
};
use mentormesh_core::clock::Clock;
use mentormesh_core::errors::{MeshError, MeshResult};
use mentormesh_core::meeting::{join_window, meeting_link};
use mentormesh_core::models::availability::{
    AvailabilityQuery, BookSlotRequest, BookingData, BulkCreateData, BulkCreateRequest, Contact,
    CreateSlotRequest, DateAvailabilityData, MeetingDetails, MeetingSchedule,
    MenteeBookingsData, MentorAvailabilityData, MentorSearchData, MentorSearchQuery, MentorSlots,
    MentorStatsData, Pagination, SlotView, UpdateSlotRequest,
};
use mentormesh_core::models::slot::{NewSlot, Slot, SlotFilter, SlotStatus};
use mentormesh_core::models::user::{MentorSummary, UserRecord, UserRef, skills_match, split_skills};
use mentormesh_core::time::{DEFAULT_TIMEZONE, local_today};
use mentormesh_core::validation::{
    parse_date_param, parse_flag, parse_id, patch_slot, validate_bulk, validate_create, validate_search,
};
use mentormesh_db::repositories::{InsertOutcome, SaveOutcome, SlotRepository, UserDirectory};

const CONCURRENT_UPDATE: &str = "Availability slot was modified concurrently, please retry";

/// Availability and booking operations
///
/// The service holds no locks of its own. Each mutation reads the slot,
/// checks the transition against that snapshot and then asks the store for a
/// conditional write; when the write does not match, the slot is re-read to
/// report why.
#[derive(Clone)]
pub struct AvailabilityService {
    slots: Arc<dyn SlotRepository>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    meeting_base_url: String,
}

impl AvailabilityService {
    pub fn new(
        slots: Arc<dyn SlotRepository>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        meeting_base_url: impl Into<String>,
    ) -> Self {
        Self {
            slots,
            users,
            clock,
            meeting_base_url: meeting_base_url.into(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn today(&self) -> NaiveDate {
        local_today(self.now(), DEFAULT_TIMEZONE)
    }

    async fn load_slot(&self, id: Uuid) -> MeshResult<Slot> {
        self.slots
            .get_slot(id)
            .await?
            .ok_or_else(MeshError::slot_not_found)
    }

    async fn require_mentor(&self, id: Uuid) -> MeshResult<UserRecord> {
        let user = self
            .users
            .get_user(id)
            .await?
            .ok_or_else(|| MeshError::NotFound("Mentor not found".to_string()))?;
        if !user.is_mentor() {
            return Err(MeshError::validation("User is not a mentor"));
        }
        Ok(user)
    }

    /// Directory records for the given ids, keyed by id
    async fn user_map<I>(&self, ids: I) -> MeshResult<HashMap<Uuid, UserRecord>>
    where
        I: IntoIterator<Item = Uuid>,
    {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.users.get_users(ids).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    async fn insert(&self, slots: Vec<NewSlot>, bulk: bool) -> MeshResult<Vec<Slot>> {
        match self.slots.insert_slots(slots).await? {
            InsertOutcome::Inserted(slots) => Ok(slots),
            InsertOutcome::Overlap { index, existing } => {
                let message = if bulk {
                    format!("Slot {} overlaps with existing availability", index + 1)
                } else {
                    "Time slot overlaps with existing availability".to_string()
                };
                debug!("Rejected overlapping slot, existing slot {}", existing.id);
                Err(MeshError::conflict(message, Some(existing)))
            }
        }
    }

    /// Explains why a conditional write on `id` did not match
    async fn lost_race<F>(&self, id: Uuid, check: F) -> MeshError
    where
        F: Fn(&Slot) -> MeshResult<()>,
    {
        match self.slots.get_slot(id).await {
            Err(e) => MeshError::Database(e),
            Ok(None) => MeshError::slot_not_found(),
            Ok(Some(slot)) => match check(&slot) {
                Err(e) => e,
                Ok(()) => {
                    warn!("Slot {} changed between read and write", id);
                    MeshError::conflict(CONCURRENT_UPDATE, None)
                }
            },
        }
    }

    pub async fn create_slot(&self, req: CreateSlotRequest) -> MeshResult<SlotView> {
        let new_slot = validate_create(&req, self.now())?;
        let mentor = self.require_mentor(new_slot.mentor_id).await?;

        let slot = self
            .insert(vec![new_slot], false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MeshError::Internal("store returned no slot".into()))?;

        info!(
            "Created slot {} for mentor {} on {} {}-{}",
            slot.id, slot.mentor_id, slot.date, slot.start_time, slot.end_time
        );
        Ok(SlotView::from(slot).with_mentor(Some(MentorSummary::from(&mentor))))
    }

    pub async fn bulk_create_slots(&self, req: BulkCreateRequest) -> MeshResult<BulkCreateData> {
        let (mentor_id, new_slots) = validate_bulk(&req, self.now())?;
        self.require_mentor(mentor_id).await?;

        let slots = self.insert(new_slots, true).await?;
        info!("Created {} slots for mentor {}", slots.len(), mentor_id);

        Ok(BulkCreateData {
            count: slots.len(),
            slots: slots.into_iter().map(SlotView::from).collect(),
        })
    }

    pub async fn list_mentor_availability(
        &self,
        mentor_id: Uuid,
        query: AvailabilityQuery,
    ) -> MeshResult<MentorAvailabilityData> {
        let mut errors = Vec::new();
        let start_date = parse_date_param("startDate", query.start_date.as_deref())
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });
        let end_date = parse_date_param("endDate", query.end_date.as_deref()).unwrap_or_else(|e| {
            errors.push(e);
            None
        });
        let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<SlotStatus>().map(Some).unwrap_or_else(|e| {
                errors.push(e);
                None
            }),
            None => None,
        };
        if !errors.is_empty() {
            return Err(MeshError::validation_errors("Invalid query parameters", errors));
        }

        let statuses = match (status, parse_flag(query.include_booked.as_deref())) {
            (Some(status), _) => vec![status],
            (None, true) => Vec::new(),
            (None, false) => vec![SlotStatus::Available, SlotStatus::Booked],
        };
        let filter = SlotFilter {
            start_date,
            end_date,
            statuses,
        };

        let slots = self.slots.list_mentor_slots(mentor_id, filter).await?;
        let bookers = self.user_map(slots.iter().filter_map(|s| s.booked_by)).await?;
        let availability: Vec<SlotView> = slots
            .into_iter()
            .map(|slot| {
                let booker = slot.booked_by.and_then(|id| bookers.get(&id)).map(UserRef::from);
                SlotView::from(slot).with_booker(booker)
            })
            .collect();

        Ok(MentorAvailabilityData {
            mentor_id,
            count: availability.len(),
            availability,
        })
    }

    /// Open slots on one date, grouped by mentor
    ///
    /// Groups follow the order of each mentor's earliest slot. Slots whose
    /// mentor is missing from the directory are left out.
    pub async fn list_available_for_date(
        &self,
        date: NaiveDate,
        skills: Option<String>,
    ) -> MeshResult<DateAvailabilityData> {
        let slots = self.slots.list_open_slots_on(date).await?;
        let mentors = self.user_map(slots.iter().map(|s| s.mentor_id)).await?;
        let wanted = skills.as_deref().map(split_skills).unwrap_or_default();

        let mut groups: Vec<MentorSlots> = Vec::new();
        let mut positions: HashMap<Uuid, usize> = HashMap::new();
        for slot in slots {
            let Some(mentor) = mentors.get(&slot.mentor_id) else {
                continue;
            };
            if !wanted.is_empty() && !skills_match(&mentor.mentor_profile.skills, &wanted) {
                continue;
            }

            let position = *positions.entry(mentor.id).or_insert_with(|| {
                groups.push(MentorSlots {
                    mentor: MentorSummary::from(mentor),
                    slots: Vec::new(),
                });
                groups.len() - 1
            });
            groups[position].slots.push(SlotView::from(slot));
        }

        let total_slots = groups.iter().map(|g| g.slots.len()).sum();
        debug!(
            "{} open slots across {} mentors on {}",
            total_slots,
            groups.len(),
            date
        );
        Ok(DateAvailabilityData {
            date,
            count: groups.len(),
            total_slots,
            mentors: groups,
        })
    }

    pub async fn search_mentors(&self, query: MentorSearchQuery) -> MeshResult<MentorSearchData> {
        let search = validate_search(&query)?;
        let (page, limit) = (search.page, search.limit);

        let (records, total) = self.users.search_mentors(search).await?;
        Ok(MentorSearchData {
            mentors: records.iter().map(MentorSummary::from).collect(),
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn get_slot(&self, id: Uuid) -> MeshResult<SlotView> {
        let slot = self.load_slot(id).await?;
        let users = self
            .user_map(std::iter::once(slot.mentor_id).chain(slot.booked_by))
            .await?;

        let mentor = users.get(&slot.mentor_id).map(MentorSummary::from);
        let booker = slot.booked_by.and_then(|id| users.get(&id)).map(UserRef::from);
        Ok(SlotView::from(slot).with_mentor(mentor).with_booker(booker))
    }

    pub async fn update_slot(&self, id: Uuid, req: UpdateSlotRequest) -> MeshResult<SlotView> {
        let current = self.load_slot(id).await?;
        let edited = patch_slot(&current, &req, self.now())?;

        match self.slots.save_slot(edited).await? {
            SaveOutcome::Saved(slot) => {
                info!("Updated slot {} (version {})", slot.id, slot.version);
                Ok(SlotView::from(slot))
            }
            SaveOutcome::Overlap(existing) => Err(MeshError::conflict(
                "Updated time overlaps with existing availability",
                Some(existing),
            )),
            SaveOutcome::Stale => Err(self.lost_race(id, |_| Ok(())).await),
        }
    }

    pub async fn delete_slot(&self, id: Uuid) -> MeshResult<()> {
        let current = self.load_slot(id).await?;
        check_delete(&current)?;

        if self.slots.delete_slot(id, current.version).await? {
            info!("Deleted slot {}", id);
            Ok(())
        } else {
            Err(self.lost_race(id, check_delete).await)
        }
    }

    pub async fn book_slot(&self, id: Uuid, req: BookSlotRequest) -> MeshResult<BookingData> {
        let mentee_id = parse_id("menteeId", req.mentee_id.as_deref())
            .map_err(|e| MeshError::validation_errors("menteeId is required", vec![e]))?;

        let current = self.load_slot(id).await?;
        let now = self.now();
        check_book(&current, now)?;

        let mentee = self
            .users
            .get_user(mentee_id)
            .await?
            .ok_or_else(|| MeshError::NotFound("Mentee not found".to_string()))?;

        let link = meeting_link(&self.meeting_base_url, current.mentor_id, current.id);
        let booking_id = req
            .booking_id
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        let transition = Transition::Book {
            mentee_id,
            booking_id,
            meeting_link: link.clone(),
        };

        match self
            .slots
            .apply_transition(id, current.version, transition)
            .await?
        {
            Some(slot) => {
                info!("Slot {} booked by mentee {}", slot.id, mentee_id);
                Ok(BookingData {
                    availability: SlotView::from(slot).with_booker(Some(UserRef::from(&mentee))),
                    meeting_link: link,
                })
            }
            None => Err(self.lost_race(id, |slot| check_book(slot, now)).await),
        }
    }

    async fn transition(
        &self,
        id: Uuid,
        transition: Transition,
        check: fn(&Slot) -> MeshResult<()>,
    ) -> MeshResult<Slot> {
        let current = self.load_slot(id).await?;
        check(&current)?;

        match self
            .slots
            .apply_transition(id, current.version, transition)
            .await?
        {
            Some(slot) => Ok(slot),
            None => Err(self.lost_race(id, check).await),
        }
    }

    pub async fn cancel_slot(&self, id: Uuid) -> MeshResult<SlotView> {
        let slot = self.transition(id, Transition::Cancel, check_cancel).await?;
        info!("Booking on slot {} cancelled", id);
        Ok(SlotView::from(slot))
    }

    pub async fn complete_slot(&self, id: Uuid) -> MeshResult<SlotView> {
        let slot = self
            .transition(id, Transition::Complete, check_complete)
            .await?;
        info!("Session on slot {} completed", id);
        Ok(SlotView::from(slot))
    }

    pub async fn meeting_details(&self, id: Uuid) -> MeshResult<MeetingDetails> {
        let slot = self.load_slot(id).await?;
        if slot.status != SlotStatus::Booked {
            return Err(MeshError::PreconditionFailed(
                "This slot is not booked".to_string(),
            ));
        }

        let users = self
            .user_map(std::iter::once(slot.mentor_id).chain(slot.booked_by))
            .await?;
        let contact = |id: Uuid| users.get(&id).map(|u| Contact::from(&UserRef::from(u)));
        let window = join_window(slot.starts_at(), self.now());

        Ok(MeetingDetails {
            meeting_link: slot.meeting_link.clone(),
            mentor: contact(slot.mentor_id),
            mentee: slot.booked_by.and_then(contact),
            schedule: MeetingSchedule {
                date: slot.date,
                start_time: slot.start_time,
                end_time: slot.end_time,
                timezone: slot.timezone.clone(),
            },
            can_join: window.can_join,
            time_until_meeting: window.minutes_until_start,
        })
    }

    pub async fn mentor_stats(&self, mentor_id: Uuid) -> MeshResult<MentorStatsData> {
        let stats = self.slots.mentor_stats(mentor_id, self.today()).await?;
        Ok(MentorStatsData { mentor_id, stats })
    }

    /// Sessions booked by a mentee
    ///
    /// Only upcoming bookings by default; `include_past` adds earlier
    /// bookings and completed sessions.
    pub async fn mentee_bookings(
        &self,
        mentee_id: Uuid,
        include_past: bool,
    ) -> MeshResult<MenteeBookingsData> {
        let (statuses, from_date) = if include_past {
            (vec![SlotStatus::Booked, SlotStatus::Completed], None)
        } else {
            (vec![SlotStatus::Booked], Some(self.today()))
        };

        let slots = self
            .slots
            .list_mentee_slots(mentee_id, statuses, from_date)
            .await?;
        let mentors = self.user_map(slots.iter().map(|s| s.mentor_id)).await?;
        let bookings: Vec<SlotView> = slots
            .into_iter()
            .map(|slot| {
                let mentor = mentors.get(&slot.mentor_id).map(MentorSummary::from);
                SlotView::from(slot).with_mentor(mentor)
            })
            .collect();

        Ok(MenteeBookingsData {
            mentee_id,
            count: bookings.len(),
            bookings,
        })
    }
}
