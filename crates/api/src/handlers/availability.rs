//! # Availability Handlers
//!
//! Thin HTTP adapters over [`AvailabilityService`](crate::services::AvailabilityService).
//! Each handler extracts the request, calls one service operation and wraps
//! the result in the `{ success, message, data }` envelope. Path ids, query
//! strings and JSON bodies are parsed here so malformed input is reported in
//! the same envelope as every other validation failure.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use mentormesh_core::{
    errors::MeshError,
    models::{
        availability::{
            AvailabilityQuery, BookSlotRequest, BookingData, BulkCreateData, BulkCreateRequest,
            CreateSlotRequest, DateAvailabilityData, DateQuery, MeetingDetails,
            MenteeBookingsData, MenteeBookingsQuery, MentorAvailabilityData, MentorSearchData,
            MentorSearchQuery, MentorStatsData, SlotData, UpdateSlotRequest,
        },
        envelope::ApiResponse,
    },
    time::parse_slot_date,
    validation::parse_flag,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

type Created<T> = (StatusCode, Json<ApiResponse<T>>);

fn path_id(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError(MeshError::validation(format!("Invalid {}", field))))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AppError(MeshError::validation_errors(
            "Invalid request body",
            vec![rejection.body_text()],
        ))
    })
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params.map(|Query(params)| params).map_err(|rejection| {
        AppError(MeshError::validation_errors(
            "Invalid query parameters",
            vec![rejection.body_text()],
        ))
    })
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CreateSlotRequest>, JsonRejection>,
) -> Result<Created<SlotData>, AppError> {
    let availability = state.service.create_slot(body(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Availability slot created successfully",
            SlotData { availability },
        )),
    ))
}

#[axum::debug_handler]
pub async fn bulk_create_slots(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> Result<Created<BulkCreateData>, AppError> {
    let data = state.service.bulk_create_slots(body(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("{} availability slots created successfully", data.count),
            data,
        )),
    ))
}

#[axum::debug_handler]
pub async fn list_mentor_availability(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
    params: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MentorAvailabilityData>>, AppError> {
    let mentor_id = path_id("mentor id", &mentor_id)?;
    let data = state
        .service
        .list_mentor_availability(mentor_id, query(params)?)
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}

#[axum::debug_handler]
pub async fn list_available_for_date(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<String>,
    params: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DateAvailabilityData>>, AppError> {
    let skills = query(params)?.skills;
    let date = parse_slot_date(&date).ok_or_else(|| {
        AppError(MeshError::validation(
            "date must be a valid calendar date (YYYY-MM-DD)",
        ))
    })?;
    let data = state
        .service
        .list_available_for_date(date, skills)
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}

#[axum::debug_handler]
pub async fn search_mentors(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<MentorSearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MentorSearchData>>, AppError> {
    let data = state.service.search_mentors(query(params)?).await?;
    Ok(Json(ApiResponse::ok(data)))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SlotData>>, AppError> {
    let availability = state.service.get_slot(path_id("availability id", &id)?).await?;
    Ok(Json(ApiResponse::ok(SlotData { availability })))
}

#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSlotRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SlotData>>, AppError> {
    let id = path_id("availability id", &id)?;
    let availability = state.service.update_slot(id, body(payload)?).await?;

    Ok(Json(ApiResponse::with_message(
        "Availability slot updated successfully",
        SlotData { availability },
    )))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .service
        .delete_slot(path_id("availability id", &id)?)
        .await?;

    Ok(Json(ApiResponse::message_only(
        "Availability slot deleted successfully",
    )))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    payload: Result<Json<BookSlotRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BookingData>>, AppError> {
    let id = path_id("availability id", &id)?;
    let data = state.service.book_slot(id, body(payload)?).await?;

    Ok(Json(ApiResponse::with_message("Slot booked successfully", data)))
}

#[axum::debug_handler]
pub async fn cancel_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SlotData>>, AppError> {
    let availability = state
        .service
        .cancel_slot(path_id("availability id", &id)?)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Booking cancelled successfully",
        SlotData { availability },
    )))
}

#[axum::debug_handler]
pub async fn complete_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SlotData>>, AppError> {
    let availability = state
        .service
        .complete_slot(path_id("availability id", &id)?)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Session marked as completed",
        SlotData { availability },
    )))
}

#[axum::debug_handler]
pub async fn meeting_details(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MeetingDetails>>, AppError> {
    let details = state
        .service
        .meeting_details(path_id("availability id", &id)?)
        .await?;

    Ok(Json(ApiResponse::ok(details)))
}

#[axum::debug_handler]
pub async fn mentor_stats(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
) -> Result<Json<ApiResponse<MentorStatsData>>, AppError> {
    let stats = state
        .service
        .mentor_stats(path_id("mentor id", &mentor_id)?)
        .await?;

    Ok(Json(ApiResponse::ok(stats)))
}

#[axum::debug_handler]
pub async fn mentee_bookings(
    State(state): State<Arc<ApiState>>,
    Path(mentee_id): Path<String>,
    params: Result<Query<MenteeBookingsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MenteeBookingsData>>, AppError> {
    let mentee_id = path_id("mentee id", &mentee_id)?;
    let include_past = parse_flag(query(params)?.include_past.as_deref());
    let data = state
        .service
        .mentee_bookings(mentee_id, include_past)
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}
