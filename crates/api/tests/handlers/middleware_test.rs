use std::sync::Arc;

use axum::{http::StatusCode, response::Response};
use axum_test::TestServer;
use chrono::{NaiveDate, TimeZone, Utc};
use mentormesh_api::{
    build_router,
    middleware::error_handling::{map_error, AppError},
    services::AvailabilityService,
    ApiState,
};
use mentormesh_core::{
    clock::FixedClock,
    errors::MeshError,
    models::slot::{Slot, SlotStatus},
};
use mentormesh_db::mock::{repositories::MockSlotRepo, InMemoryStore};
use mockall::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{start_of_tests, MEETING_BASE_URL};

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn stored_slot() -> Slot {
    Slot {
        id: Uuid::new_v4(),
        mentor_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
        start_time: "09:00".parse().unwrap(),
        end_time: "10:00".parse().unwrap(),
        status: SlotStatus::Available,
        booked_by: None,
        booking_id: None,
        meeting_link: None,
        timezone: "UTC".to_string(),
        notes: String::new(),
        version: 1,
        created_at: Utc.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap(),
    }
}

#[rstest]
#[case::not_found(MeshError::slot_not_found(), StatusCode::NOT_FOUND)]
#[case::validation(MeshError::validation("Bad input"), StatusCode::BAD_REQUEST)]
#[case::conflict(MeshError::conflict("Taken", None), StatusCode::CONFLICT)]
#[case::precondition(
    MeshError::PreconditionFailed("This slot is not booked".to_string()),
    StatusCode::BAD_REQUEST
)]
#[case::database(MeshError::Database(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case::internal(MeshError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_status_mapping(#[case] error: MeshError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_validation_body_lists_errors() {
    let response = map_error(MeshError::validation_errors(
        "Validation failed",
        vec![
            "Date is required".to_string(),
            "End time must be after start time".to_string(),
        ],
    ));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Validation failed",
            "errors": ["Date is required", "End time must be after start time"]
        })
    );
}

#[tokio::test]
async fn test_conflict_body_carries_existing_slot() {
    let existing = stored_slot();
    let response = map_error(MeshError::conflict(
        "Time slot overlaps with existing availability",
        Some(existing.clone()),
    ));
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["existingSlot"]["id"], json!(existing.id));
    assert_eq!(body["existingSlot"]["startTime"], json!("09:00"));
    assert_eq!(body["existingSlot"]["isBooked"], json!(false));
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_server_errors_hide_detail() {
    let response = map_error(MeshError::Database(eyre::eyre!(
        "password authentication failed for user mesh"
    )));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({ "success": false, "message": "Internal server error" })
    );
}

#[test]
fn test_report_converts_to_database_error() {
    let error: AppError = eyre::eyre!("relation does not exist").into();
    assert!(matches!(error.0, MeshError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test_log::test(tokio::test)]
async fn test_store_failure_reaches_client_as_500() {
    let id = Uuid::new_v4();
    let mut slots = MockSlotRepo::new();
    slots
        .expect_get_slot()
        .with(predicate::eq(id))
        .times(1)
        .returning(|_| Err(eyre::eyre!("connection reset by peer")));

    let service = AvailabilityService::new(
        Arc::new(slots),
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedClock::new(start_of_tests())),
        MEETING_BASE_URL,
    );
    let server = TestServer::new(build_router(ApiState::new(service))).unwrap();

    let response = server
        .get(&format!("/api/availability/{}", id))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], json!("Internal server error"));
    assert!(!response.text().contains("connection reset"));
}
