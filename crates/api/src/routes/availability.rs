use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers::availability, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/availability", post(availability::create_slot))
        .route("/api/availability/bulk", post(availability::bulk_create_slots))
        .route(
            "/api/availability/mentor/:mentor_id",
            get(availability::list_mentor_availability),
        )
        .route(
            "/api/availability/mentor/:mentor_id/stats",
            get(availability::mentor_stats),
        )
        .route(
            "/api/availability/date/:date",
            get(availability::list_available_for_date),
        )
        .route(
            "/api/availability/mentors/search",
            get(availability::search_mentors),
        )
        .route(
            "/api/availability/mentee/:mentee_id/bookings",
            get(availability::mentee_bookings),
        )
        .route(
            "/api/availability/:id",
            get(availability::get_slot)
                .put(availability::update_slot)
                .delete(availability::delete_slot),
        )
        .route("/api/availability/:id/book", post(availability::book_slot))
        .route("/api/availability/:id/cancel", post(availability::cancel_slot))
        .route(
            "/api/availability/:id/complete",
            post(availability::complete_slot),
        )
        .route(
            "/api/availability/:id/meeting",
            get(availability::meeting_details),
        )
}
