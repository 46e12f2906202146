use chrono::{Duration, NaiveDate, TimeZone, Utc};
use mentormesh_core::{
    clock::Clock,
    errors::MeshError,
    models::{
        availability::{
            AvailabilityQuery, BookSlotRequest, BulkCreateRequest, BulkSlotInput,
            MentorSearchQuery, UpdateSlotRequest,
        },
        slot::{Slot, SlotStatus},
    },
};
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use crate::test_utils::{slot_request, TestContext};

fn book_request(mentee_id: Uuid, booking_id: &str) -> BookSlotRequest {
    BookSlotRequest {
        mentee_id: Some(mentee_id.to_string()),
        booking_id: Some(booking_id.to_string()),
    }
}

fn bulk_input(date: &str, start: &str, end: &str) -> BulkSlotInput {
    BulkSlotInput {
        date: Some(date.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        ..BulkSlotInput::default()
    }
}

#[tokio::test]
async fn test_overlapping_slot_is_rejected_with_existing() {
    let ctx = TestContext::new().await;
    let first = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let err = ctx
        .service
        .create_slot(ctx.slot_request("2030-06-10", "09:30", "10:30"))
        .await
        .unwrap_err();

    match err {
        MeshError::Conflict { message, existing } => {
            assert_eq!(message, "Time slot overlaps with existing availability");
            assert_eq!(existing.map(|s| s.id), Some(first.slot.id));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ctx.store.slot_count().await, 1);
}

#[tokio::test]
async fn test_back_to_back_and_released_slots_do_not_block() {
    let ctx = TestContext::new().await;
    let first = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    ctx.create_slot("2030-06-10", "10:00", "11:00").await;

    // Withdrawing the first slot frees its range
    let withdraw = UpdateSlotRequest {
        status: Some("cancelled".to_string()),
        ..UpdateSlotRequest::default()
    };
    assert_ok!(ctx.service.update_slot(first.slot.id, withdraw).await);

    let replacement = ctx
        .service
        .create_slot(ctx.slot_request("2030-06-10", "08:30", "09:45"))
        .await;
    assert_ok!(replacement);
}

#[tokio::test]
async fn test_end_must_follow_start() {
    let ctx = TestContext::new().await;

    for (start, end) in [("10:00", "10:00"), ("10:00", "09:00")] {
        let err = ctx
            .service
            .create_slot(ctx.slot_request("2030-06-10", start, end))
            .await
            .unwrap_err();
        match err {
            MeshError::Validation { errors, .. } => {
                assert_eq!(errors, vec!["End time must be after start time"])
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(ctx.store.slot_count().await, 0);
}

#[tokio::test]
async fn test_create_requires_known_mentor() {
    let ctx = TestContext::new().await;

    let stranger = crate::test_utils::mentor_record("Ghost", &[], None);
    let err = ctx
        .service
        .create_slot(slot_request(&stranger, "2030-06-10", "09:00", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::NotFound(_)));

    let err = ctx
        .service
        .create_slot(slot_request(&ctx.mentee, "2030-06-10", "09:00", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::Validation { .. }));
}

#[tokio::test]
async fn test_is_booked_tracks_every_transition() {
    let ctx = TestContext::new().await;
    let created = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    assert!(!created.is_booked);
    assert_eq!(created.slot.status, SlotStatus::Available);

    let booked = ctx
        .service
        .book_slot(created.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();
    assert!(booked.availability.is_booked);

    let cancelled = ctx.service.cancel_slot(created.slot.id).await.unwrap();
    assert!(!cancelled.is_booked);

    ctx.service
        .book_slot(created.slot.id, book_request(ctx.mentee.id, "b2"))
        .await
        .unwrap();
    let completed = ctx.service.complete_slot(created.slot.id).await.unwrap();
    assert!(!completed.is_booked);
    assert_eq!(completed.slot.status, SlotStatus::Completed);
}

#[tokio::test]
async fn test_booking_requires_future_start() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-01", "09:00", "10:00").await;

    // Exactly at the start
    ctx.clock.set(Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap());
    let err = ctx
        .service
        .book_slot(slot.slot.id, book_request(ctx.mentee.id, "late"))
        .await
        .unwrap_err();
    match err {
        MeshError::Validation { message, .. } => {
            assert_eq!(message, "Cannot book a slot in the past")
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // One minute before
    ctx.clock.set(Utc.with_ymd_and_hms(2030, 6, 1, 8, 59, 0).unwrap());
    assert_ok!(
        ctx.service
            .book_slot(slot.slot.id, book_request(ctx.mentee.id, "on-time"))
            .await
    );
}

#[tokio::test]
async fn test_booking_requires_known_mentee() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let err = ctx
        .service
        .book_slot(slot.slot.id, book_request(Uuid::new_v4(), "b1"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::NotFound(_)));

    let err = ctx
        .service
        .book_slot(slot.slot.id, BookSlotRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::Validation { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_have_one_winner() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let mut mentees = Vec::new();
    for i in 0..8 {
        mentees.push(ctx.seed_mentee(&format!("Mentee {}", i)).await);
    }

    let mut handles = Vec::new();
    for mentee in mentees {
        let service = ctx.service.clone();
        let id = slot.slot.id;
        handles.push(tokio::spawn(async move {
            service
                .book_slot(id, book_request(mentee.id, &mentee.full_name))
                .await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(booking) => winners.push(booking),
            Err(MeshError::Conflict { .. }) => {}
            Err(other) => panic!("loser got a non-conflict error: {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    let stored = ctx.service.get_slot(slot.slot.id).await.unwrap();
    assert_eq!(stored.slot.booked_by, winners[0].availability.slot.booked_by);
}

#[tokio::test]
async fn test_cancel_restores_slot_and_rejects_second_cancel() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    ctx.service
        .book_slot(slot.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();

    let cancelled = ctx.service.cancel_slot(slot.slot.id).await.unwrap();
    assert_eq!(cancelled.slot.status, SlotStatus::Available);
    assert_eq!(cancelled.slot.booked_by, None);
    assert_eq!(cancelled.slot.booking_id, None);
    assert!(!cancelled.is_booked);

    let err = ctx.service.cancel_slot(slot.slot.id).await.unwrap_err();
    assert!(matches!(err, MeshError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_booked_slot_cannot_be_deleted_or_moved() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    ctx.service
        .book_slot(slot.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();

    let err = ctx.service.delete_slot(slot.slot.id).await.unwrap_err();
    assert!(matches!(err, MeshError::PreconditionFailed(_)));

    let move_it = UpdateSlotRequest {
        date: Some("2030-06-11".to_string()),
        ..UpdateSlotRequest::default()
    };
    let err = ctx.service.update_slot(slot.slot.id, move_it).await.unwrap_err();
    assert!(matches!(err, MeshError::PreconditionFailed(_)));

    // Notes stay editable
    let annotate = UpdateSlotRequest {
        notes: Some("Agenda: code review".to_string()),
        ..UpdateSlotRequest::default()
    };
    let updated = ctx.service.update_slot(slot.slot.id, annotate).await.unwrap();
    assert_eq!(updated.slot.notes, "Agenda: code review");
    assert!(updated.is_booked);
}

#[tokio::test]
async fn test_unbooked_slot_can_be_moved_and_deleted() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let move_it = UpdateSlotRequest {
        date: Some("2030-06-11".to_string()),
        start_time: Some("14:00".to_string()),
        end_time: Some("15:00".to_string()),
        ..UpdateSlotRequest::default()
    };
    let moved = ctx.service.update_slot(slot.slot.id, move_it).await.unwrap();
    assert_eq!(moved.slot.date, NaiveDate::from_ymd_opt(2030, 6, 11).unwrap());
    assert_eq!(moved.slot.start_time.to_string(), "14:00");
    assert_eq!(moved.slot.version, slot.slot.version + 1);

    assert_ok!(ctx.service.delete_slot(slot.slot.id).await);
    assert!(matches!(
        ctx.service.get_slot(slot.slot.id).await,
        Err(MeshError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_moving_onto_another_slot_conflicts() {
    let ctx = TestContext::new().await;
    let first = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let second = ctx.create_slot("2030-06-10", "11:00", "12:00").await;

    let onto_first = UpdateSlotRequest {
        start_time: Some("09:30".to_string()),
        ..UpdateSlotRequest::default()
    };
    match ctx.service.update_slot(second.slot.id, onto_first).await {
        Err(MeshError::Conflict { existing, .. }) => {
            assert_eq!(existing.map(|s| s.id), Some(first.slot.id))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_meeting_details_join_window() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let booking = ctx
        .service
        .book_slot(slot.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();
    let start = Utc.with_ymd_and_hms(2030, 6, 10, 9, 0, 0).unwrap();

    ctx.clock.set(start - Duration::minutes(9));
    let soon = ctx.service.meeting_details(slot.slot.id).await.unwrap();
    assert!(soon.can_join);
    assert_eq!(soon.time_until_meeting, 9);

    ctx.clock.set(start - Duration::minutes(11));
    let later = ctx.service.meeting_details(slot.slot.id).await.unwrap();
    assert!(!later.can_join);
    assert_eq!(later.time_until_meeting, 11);

    assert_eq!(later.meeting_link.as_deref(), Some(booking.meeting_link.as_str()));
    assert_eq!(later.mentor.map(|c| c.name), Some(ctx.mentor.full_name.clone()));
    assert_eq!(later.mentee.map(|c| c.email), Some(ctx.mentee.email.clone()));
    assert_eq!(later.schedule.start_time.to_string(), "09:00");
}

#[tokio::test]
async fn test_meeting_details_require_booking() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let err = ctx.service.meeting_details(slot.slot.id).await.unwrap_err();
    assert!(matches!(err, MeshError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_example_session_lifecycle() {
    let ctx = TestContext::new().await;
    let rival = ctx.seed_mentee("Yara Rival").await;

    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    assert_eq!(slot.slot.status, SlotStatus::Available);

    let booking = ctx
        .service
        .book_slot(slot.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();
    let booked = &booking.availability.slot;
    assert_eq!(booked.status, SlotStatus::Booked);
    assert_eq!(booked.booked_by, Some(ctx.mentee.id));
    assert_eq!(booked.booking_id.as_deref(), Some("b1"));
    assert_eq!(
        booking.meeting_link,
        format!(
            "https://meet.jit.si/mentormesh-{}-{}",
            ctx.mentor.id, slot.slot.id
        )
    );

    let err = ctx
        .service
        .book_slot(slot.slot.id, book_request(rival.id, "b2"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::Conflict { .. }));

    let completed = ctx.service.complete_slot(slot.slot.id).await.unwrap();
    assert_eq!(completed.slot.status, SlotStatus::Completed);

    let err = ctx.service.delete_slot(slot.slot.id).await.unwrap_err();
    match err {
        MeshError::PreconditionFailed(message) => {
            assert_eq!(message, "Cannot delete a completed session")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_requires_booking() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;

    let err = ctx.service.complete_slot(slot.slot.id).await.unwrap_err();
    assert!(matches!(err, MeshError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_bulk_create_is_all_or_nothing() {
    let ctx = TestContext::new().await;
    ctx.create_slot("2030-06-10", "13:00", "14:00").await;

    let clashing = BulkCreateRequest {
        mentor_id: Some(ctx.mentor.id.to_string()),
        slots: Some(vec![
            bulk_input("2030-06-10", "09:00", "10:00"),
            bulk_input("2030-06-10", "13:30", "14:30"),
        ]),
    };
    match ctx.service.bulk_create_slots(clashing).await {
        Err(MeshError::Conflict { message, existing }) => {
            assert_eq!(message, "Slot 2 overlaps with existing availability");
            assert!(existing.is_some());
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(ctx.store.slot_count().await, 1);

    let self_overlapping = BulkCreateRequest {
        mentor_id: Some(ctx.mentor.id.to_string()),
        slots: Some(vec![
            bulk_input("2030-06-11", "09:00", "10:00"),
            bulk_input("2030-06-11", "09:30", "10:30"),
        ]),
    };
    assert_err!(ctx.service.bulk_create_slots(self_overlapping).await);
    assert_eq!(ctx.store.slot_count().await, 1);

    let fine = BulkCreateRequest {
        mentor_id: Some(ctx.mentor.id.to_string()),
        slots: Some(vec![
            bulk_input("2030-06-11", "09:00", "10:00"),
            bulk_input("2030-06-11", "10:00", "11:00"),
        ]),
    };
    let created = ctx.service.bulk_create_slots(fine).await.unwrap();
    assert_eq!(created.count, 2);
    assert_eq!(ctx.store.slot_count().await, 3);
}

#[tokio::test]
async fn test_mentor_listing_filters_and_orders() {
    let ctx = TestContext::new().await;
    let late = ctx.create_slot("2030-06-12", "09:00", "10:00").await;
    let booked = ctx.create_slot("2030-06-10", "15:00", "16:00").await;
    let early = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let withdrawn = ctx.create_slot("2030-06-11", "09:00", "10:00").await;

    ctx.service
        .book_slot(booked.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();
    ctx.service
        .update_slot(
            withdrawn.slot.id,
            UpdateSlotRequest {
                status: Some("cancelled".to_string()),
                ..UpdateSlotRequest::default()
            },
        )
        .await
        .unwrap();

    let ids = |views: &[mentormesh_core::models::availability::SlotView]| {
        views.iter().map(|v| v.slot.id).collect::<Vec<_>>()
    };

    let default = ctx
        .service
        .list_mentor_availability(ctx.mentor.id, AvailabilityQuery::default())
        .await
        .unwrap();
    assert_eq!(
        ids(&default.availability),
        vec![early.slot.id, booked.slot.id, late.slot.id]
    );
    let booker = default.availability[1].booker.as_ref().map(|b| b.id);
    assert_eq!(booker, Some(ctx.mentee.id));

    let everything = ctx
        .service
        .list_mentor_availability(
            ctx.mentor.id,
            AvailabilityQuery {
                include_booked: Some("true".to_string()),
                ..AvailabilityQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(everything.count, 4);

    let cancelled_only = ctx
        .service
        .list_mentor_availability(
            ctx.mentor.id,
            AvailabilityQuery {
                status: Some("cancelled".to_string()),
                ..AvailabilityQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&cancelled_only.availability), vec![withdrawn.slot.id]);

    let ranged = ctx
        .service
        .list_mentor_availability(
            ctx.mentor.id,
            AvailabilityQuery {
                start_date: Some("2030-06-11".to_string()),
                end_date: Some("2030-06-12".to_string()),
                ..AvailabilityQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(&ranged.availability), vec![late.slot.id]);

    let bad = ctx
        .service
        .list_mentor_availability(
            ctx.mentor.id,
            AvailabilityQuery {
                status: Some("archived".to_string()),
                ..AvailabilityQuery::default()
            },
        )
        .await;
    assert!(matches!(bad, Err(MeshError::Validation { .. })));
}

#[tokio::test]
async fn test_date_listing_groups_by_mentor() {
    let ctx = TestContext::new().await;
    let go_mentor = ctx.seed_mentor("Gopher Grace", &["Go", "Kubernetes"], Some(4)).await;
    let day = NaiveDate::from_ymd_opt(2030, 6, 10).unwrap();

    ctx.create_slot("2030-06-10", "11:00", "12:00").await;
    ctx.service
        .create_slot(slot_request(&go_mentor, "2030-06-10", "08:00", "09:00"))
        .await
        .unwrap();
    ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let taken = ctx.create_slot("2030-06-10", "14:00", "15:00").await;
    ctx.create_slot("2030-06-11", "09:00", "10:00").await;
    ctx.service
        .book_slot(taken.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();

    let all = ctx.service.list_available_for_date(day, None).await.unwrap();
    assert_eq!(all.count, 2);
    assert_eq!(all.total_slots, 3);
    assert_eq!(all.mentors[0].mentor.id, go_mentor.id);
    assert_eq!(all.mentors[1].mentor.id, ctx.mentor.id);
    let starts: Vec<String> = all.mentors[1]
        .slots
        .iter()
        .map(|s| s.slot.start_time.to_string())
        .collect();
    assert_eq!(starts, vec!["09:00", "11:00"]);

    let rust_only = ctx
        .service
        .list_available_for_date(day, Some("RUST, haskell".to_string()))
        .await
        .unwrap();
    assert_eq!(rust_only.count, 1);
    assert_eq!(rust_only.mentors[0].mentor.id, ctx.mentor.id);
}

#[tokio::test]
async fn test_date_listing_skips_unknown_mentors() {
    let ctx = TestContext::new().await;
    let day = NaiveDate::from_ymd_opt(2030, 6, 10).unwrap();
    let orphan = Slot {
        mentor_id: Uuid::new_v4(),
        ..ctx.create_slot("2030-06-10", "09:00", "10:00").await.slot
    };
    ctx.store
        .seed_slot(Slot {
            id: Uuid::new_v4(),
            ..orphan
        })
        .await;

    let listing = ctx.service.list_available_for_date(day, None).await.unwrap();
    assert_eq!(listing.count, 1);
    assert_eq!(listing.total_slots, 1);
}

#[tokio::test]
async fn test_search_mentors_paginates() {
    let ctx = TestContext::new().await;
    ctx.seed_mentor("Bea Senior", &["Rust"], Some(15)).await;
    ctx.seed_mentor("Cal Junior", &["Rust", "Go"], Some(1)).await;
    ctx.seed_mentor("Dot Python", &["Python"], Some(6)).await;

    let first_page = ctx
        .service
        .search_mentors(MentorSearchQuery {
            skills: Some("rust".to_string()),
            limit: Some("2".to_string()),
            ..MentorSearchQuery::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = first_page
        .mentors
        .iter()
        .map(|m| m.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Bea Senior", "Ada Byte"]);
    assert_eq!(first_page.pagination.total_count, 3);
    assert_eq!(first_page.pagination.total_pages, 2);
    assert!(first_page.pagination.has_more);

    let second_page = ctx
        .service
        .search_mentors(MentorSearchQuery {
            skills: Some("rust".to_string()),
            limit: Some("2".to_string()),
            page: Some("2".to_string()),
            ..MentorSearchQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(second_page.mentors.len(), 1);
    assert_eq!(second_page.mentors[0].full_name, "Cal Junior");
    assert!(!second_page.pagination.has_more);
}

#[tokio::test]
async fn test_mentor_stats_count_future_availability() {
    let ctx = TestContext::new().await;
    let booked = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let done = ctx.create_slot("2030-06-10", "11:00", "12:00").await;
    ctx.create_slot("2030-06-12", "09:00", "10:00").await;

    ctx.service
        .book_slot(booked.slot.id, book_request(ctx.mentee.id, "b1"))
        .await
        .unwrap();
    ctx.service
        .book_slot(done.slot.id, book_request(ctx.mentee.id, "b2"))
        .await
        .unwrap();
    ctx.service.complete_slot(done.slot.id).await.unwrap();

    // An open slot left over from before today
    let stale = Slot {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2030, 5, 20).unwrap(),
        ..booked.slot.clone()
    };
    ctx.store
        .seed_slot(Slot {
            status: SlotStatus::Available,
            booked_by: None,
            ..stale
        })
        .await;

    let stats = ctx.service.mentor_stats(ctx.mentor.id).await.unwrap();
    assert_eq!(stats.stats.total_slots, 4);
    assert_eq!(stats.stats.booked_slots, 1);
    assert_eq!(stats.stats.available_slots, 1);
    assert_eq!(stats.stats.completed_slots, 1);
}

#[tokio::test]
async fn test_mentee_bookings() {
    let ctx = TestContext::new().await;
    let upcoming = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let finished = ctx.create_slot("2030-06-03", "09:00", "10:00").await;
    let soon = ctx.create_slot("2030-06-02", "09:00", "10:00").await;

    for slot in [&upcoming, &finished, &soon] {
        ctx.service
            .book_slot(slot.slot.id, book_request(ctx.mentee.id, "b"))
            .await
            .unwrap();
    }
    ctx.service.complete_slot(finished.slot.id).await.unwrap();

    // Two days on, the 2 June booking is in the past
    ctx.clock.set(ctx.clock.now() + Duration::days(2));

    let current = ctx
        .service
        .mentee_bookings(ctx.mentee.id, false)
        .await
        .unwrap();
    assert_eq!(current.count, 1);
    assert_eq!(current.bookings[0].slot.id, upcoming.slot.id);
    assert_eq!(
        current.bookings[0].mentor.as_ref().map(|m| m.id),
        Some(ctx.mentor.id)
    );

    let history = ctx.service.mentee_bookings(ctx.mentee.id, true).await.unwrap();
    let ids: Vec<Uuid> = history.bookings.iter().map(|b| b.slot.id).collect();
    assert_eq!(ids, vec![soon.slot.id, finished.slot.id, upcoming.slot.id]);
}

#[tokio::test]
async fn test_unknown_slot_is_not_found() {
    let ctx = TestContext::new().await;
    let id = Uuid::new_v4();

    assert!(matches!(ctx.service.get_slot(id).await, Err(MeshError::NotFound(_))));
    assert!(matches!(ctx.service.delete_slot(id).await, Err(MeshError::NotFound(_))));
    assert!(matches!(ctx.service.cancel_slot(id).await, Err(MeshError::NotFound(_))));
    assert!(matches!(
        ctx.service
            .book_slot(id, book_request(ctx.mentee.id, "b1"))
            .await,
        Err(MeshError::NotFound(_))
    ));
}
