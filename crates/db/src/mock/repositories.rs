use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

use mentormesh_core::booking::Transition;
use mentormesh_core::models::slot::{MentorStats, NewSlot, Slot, SlotFilter, SlotStatus};
use mentormesh_core::models::user::{MentorSearch, UserRecord};

use crate::repositories::{InsertOutcome, SaveOutcome, SlotRepository, UserDirectory};

// Mock repositories for testing
mock! {
    pub SlotRepo {}

    #[async_trait]
    impl SlotRepository for SlotRepo {
        async fn insert_slots(&self, slots: Vec<NewSlot>) -> eyre::Result<InsertOutcome>;

        async fn get_slot(&self, id: Uuid) -> eyre::Result<Option<Slot>>;

        async fn list_mentor_slots(
            &self,
            mentor_id: Uuid,
            filter: SlotFilter,
        ) -> eyre::Result<Vec<Slot>>;

        async fn list_open_slots_on(&self, date: NaiveDate) -> eyre::Result<Vec<Slot>>;

        async fn list_mentee_slots(
            &self,
            mentee_id: Uuid,
            statuses: Vec<SlotStatus>,
            from_date: Option<NaiveDate>,
        ) -> eyre::Result<Vec<Slot>>;

        async fn mentor_stats(&self, mentor_id: Uuid, today: NaiveDate) -> eyre::Result<MentorStats>;

        async fn save_slot(&self, slot: Slot) -> eyre::Result<SaveOutcome>;

        async fn delete_slot(&self, id: Uuid, expected_version: i64) -> eyre::Result<bool>;

        async fn apply_transition(
            &self,
            id: Uuid,
            expected_version: i64,
            transition: Transition,
        ) -> eyre::Result<Option<Slot>>;
    }
}

mock! {
    pub Directory {}

    #[async_trait]
    impl UserDirectory for Directory {
        async fn get_user(&self, id: Uuid) -> eyre::Result<Option<UserRecord>>;

        async fn get_users(&self, ids: Vec<Uuid>) -> eyre::Result<Vec<UserRecord>>;

        async fn search_mentors(
            &self,
            search: MentorSearch,
        ) -> eyre::Result<(Vec<UserRecord>, u64)>;
    }
}
