use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::TestContext;

fn create_body(mentor_id: Uuid, date: &str, start: &str, end: &str) -> Value {
    json!({
        "mentorId": mentor_id,
        "date": date,
        "startTime": start,
        "endTime": end,
        "notes": "Pairing session"
    })
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok", "service": "mentormesh-api" }));
}

#[tokio::test]
async fn test_create_slot_envelope() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/availability")
        .json(&create_body(ctx.mentor.id, "2030-06-10", "09:00", "10:00"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Availability slot created successfully"));

    let slot = &body["data"]["availability"];
    assert_eq!(slot["mentorId"], json!(ctx.mentor.id));
    assert_eq!(slot["date"], json!("2030-06-10"));
    assert_eq!(slot["startTime"], json!("09:00"));
    assert_eq!(slot["status"], json!("available"));
    assert_eq!(slot["isBooked"], json!(false));
    assert_eq!(slot["timezone"], json!("UTC"));
    assert_eq!(slot["mentor"]["fullName"], json!("Ada Byte"));
}

#[tokio::test]
async fn test_create_slot_reports_every_violation() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/availability")
        .json(&json!({ "mentorId": ctx.mentor.id, "startTime": "11:00", "endTime": "10:00" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Validation failed"));
    assert_eq!(
        body["errors"],
        json!(["date is required", "End time must be after start time"])
    );
    assert_eq!(ctx.store.slot_count().await, 0);
}

#[tokio::test]
async fn test_overlap_returns_409_with_existing_slot() {
    let ctx = TestContext::new().await;
    let existing = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let server = ctx.server();

    let response = server
        .post("/api/availability")
        .json(&create_body(ctx.mentor.id, "2030-06-10", "09:30", "10:30"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        json!("Time slot overlaps with existing availability")
    );
    assert_eq!(body["existingSlot"]["id"], json!(existing.slot.id));
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/availability")
        .text("not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid request body"));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let missing = server
        .get(&format!("/api/availability/{}", Uuid::new_v4()))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["message"], json!("Availability slot not found"));

    let malformed = server.get("/api/availability/not-a-uuid").await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = malformed.json();
    assert_eq!(body["message"], json!("Invalid availability id"));
}

#[tokio::test]
async fn test_booking_round_trip() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let server = ctx.server();
    let path = format!("/api/availability/{}", slot.slot.id);

    let booked = server
        .post(&format!("{}/book", path))
        .json(&json!({ "menteeId": ctx.mentee.id, "bookingId": "session-42" }))
        .await;
    booked.assert_status_ok();
    let body: Value = booked.json();
    assert_eq!(body["message"], json!("Slot booked successfully"));
    assert_eq!(body["data"]["availability"]["status"], json!("booked"));
    assert_eq!(body["data"]["availability"]["bookedBy"], json!(ctx.mentee.id));
    let link = body["data"]["meetingLink"].clone();
    assert_eq!(
        link,
        json!(format!(
            "https://meet.jit.si/mentormesh-{}-{}",
            ctx.mentor.id, slot.slot.id
        ))
    );

    let fetched: Value = server.get(&path).await.json();
    assert_eq!(fetched["data"]["availability"]["mentor"]["id"], json!(ctx.mentor.id));
    assert_eq!(fetched["data"]["availability"]["booker"]["id"], json!(ctx.mentee.id));

    let meeting = server.get(&format!("{}/meeting", path)).await;
    meeting.assert_status_ok();
    let body: Value = meeting.json();
    assert_eq!(body["data"]["meetingLink"], link);
    assert_eq!(body["data"]["canJoin"], json!(false));
    assert_eq!(body["data"]["mentee"]["name"], json!("Max Learner"));

    let refused = server.delete(&path).await;
    refused.assert_status(StatusCode::BAD_REQUEST);

    let cancelled = server.post(&format!("{}/cancel", path)).await;
    cancelled.assert_status_ok();
    let body: Value = cancelled.json();
    assert_eq!(body["message"], json!("Booking cancelled successfully"));
    assert_eq!(body["data"]["availability"]["status"], json!("available"));
    assert_eq!(body["data"]["availability"]["bookedBy"], Value::Null);

    let deleted = server.delete(&path).await;
    deleted.assert_status_ok();
    deleted.assert_json(&json!({
        "success": true,
        "message": "Availability slot deleted successfully"
    }));

    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_slot_endpoint() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let server = ctx.server();

    let response = server
        .put(&format!("/api/availability/{}", slot.slot.id))
        .json(&json!({ "endTime": "10:30", "notes": "Bring questions" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], json!("Availability slot updated successfully"));
    assert_eq!(body["data"]["availability"]["endTime"], json!("10:30"));
    assert_eq!(body["data"]["availability"]["notes"], json!("Bring questions"));
}

#[tokio::test]
async fn test_bulk_create_endpoint() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/availability/bulk")
        .json(&json!({
            "mentorId": ctx.mentor.id,
            "slots": [
                { "date": "2030-06-10", "startTime": "09:00", "endTime": "10:00" },
                { "date": "2030-06-10", "startTime": "10:00", "endTime": "11:00" },
                { "date": "2030-06-11", "startTime": "09:00", "endTime": "10:00" }
            ]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], json!("3 availability slots created successfully"));
    assert_eq!(body["data"]["count"], json!(3));
    assert_eq!(ctx.store.slot_count().await, 3);
}

#[tokio::test]
async fn test_date_listing_endpoint() {
    let ctx = TestContext::new().await;
    ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let server = ctx.server();

    let response = server
        .get("/api/availability/date/2030-06-10")
        .add_query_param("skills", "rust")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["totalSlots"], json!(1));
    assert_eq!(body["data"]["mentors"][0]["mentor"]["fullName"], json!("Ada Byte"));

    let invalid = server.get("/api/availability/date/2030-02-30").await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mentor_listing_and_stats_endpoints() {
    let ctx = TestContext::new().await;
    ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    ctx.create_slot("2030-06-11", "09:00", "10:00").await;
    let server = ctx.server();
    let base = format!("/api/availability/mentor/{}", ctx.mentor.id);

    let listing = server
        .get(&base)
        .add_query_param("startDate", "2030-06-11")
        .await;
    listing.assert_status_ok();
    let body: Value = listing.json();
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["availability"][0]["date"], json!("2030-06-11"));

    let stats: Value = server.get(&format!("{}/stats", base)).await.json();
    assert_eq!(
        stats["data"],
        json!({
            "mentorId": ctx.mentor.id,
            "totalSlots": 2,
            "bookedSlots": 0,
            "availableSlots": 2,
            "completedSlots": 0
        })
    );
}

#[tokio::test]
async fn test_search_endpoint() {
    let ctx = TestContext::new().await;
    ctx.seed_mentor("Zed Gopher", &["Go"], Some(3)).await;
    let server = ctx.server();

    let response = server
        .get("/api/availability/mentors/search")
        .add_query_param("sortBy", "name")
        .add_query_param("limit", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["mentors"][0]["fullName"], json!("Ada Byte"));
    assert_eq!(
        body["data"]["pagination"],
        json!({
            "currentPage": 1,
            "totalPages": 2,
            "totalCount": 2,
            "limit": 1,
            "hasMore": true
        })
    );

    let invalid = server
        .get("/api/availability/mentors/search")
        .add_query_param("minExperience", "-2")
        .await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_and_mentee_bookings_endpoints() {
    let ctx = TestContext::new().await;
    let slot = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let server = ctx.server();
    let path = format!("/api/availability/{}", slot.slot.id);

    server
        .post(&format!("{}/complete", path))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post(&format!("{}/book", path))
        .json(&json!({ "menteeId": ctx.mentee.id }))
        .await
        .assert_status_ok();

    let bookings_path = format!("/api/availability/mentee/{}/bookings", ctx.mentee.id);
    let upcoming: Value = server.get(&bookings_path).await.json();
    assert_eq!(upcoming["data"]["count"], json!(1));
    assert_eq!(upcoming["data"]["bookings"][0]["mentor"]["id"], json!(ctx.mentor.id));

    let completed = server.post(&format!("{}/complete", path)).await;
    completed.assert_status_ok();
    let body: Value = completed.json();
    assert_eq!(body["message"], json!("Session marked as completed"));
    assert_eq!(body["data"]["availability"]["status"], json!("completed"));

    let upcoming: Value = server.get(&bookings_path).await.json();
    assert_eq!(upcoming["data"]["count"], json!(0));

    let history: Value = server
        .get(&bookings_path)
        .add_query_param("includePast", "true")
        .await
        .json();
    assert_eq!(history["data"]["count"], json!(1));
}

#[tokio::test]
async fn test_flags_other_than_true_are_off() {
    let ctx = TestContext::new().await;
    let open = ctx.create_slot("2030-06-10", "09:00", "10:00").await;
    let withdrawn = ctx.create_slot("2030-06-11", "09:00", "10:00").await;
    ctx.server()
        .put(&format!("/api/availability/{}", withdrawn.slot.id))
        .json(&json!({ "status": "cancelled" }))
        .await
        .assert_status_ok();
    let server = ctx.server();
    let listing_path = format!("/api/availability/mentor/{}", ctx.mentor.id);

    let loose = server
        .get(&listing_path)
        .add_query_param("includeBooked", "1")
        .await;
    loose.assert_status_ok();
    let body: Value = loose.json();
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["availability"][0]["id"], json!(open.slot.id));

    let strict: Value = server
        .get(&listing_path)
        .add_query_param("includeBooked", "true")
        .await
        .json();
    assert_eq!(strict["data"]["count"], json!(2));

    let bookings = server
        .get(&format!("/api/availability/mentee/{}/bookings", ctx.mentee.id))
        .add_query_param("includePast", "yes")
        .await;
    bookings.assert_status_ok();
    let body: Value = bookings.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["count"], json!(0));
}
