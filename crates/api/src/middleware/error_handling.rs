//! # Error Handling Middleware
//!
//! Maps [`MeshError`] to HTTP status codes and the failure envelope
//! `{ success: false, message, errors?, existingSlot? }`.
//!
//! Store and internal failures are logged with full detail and answered with
//! a generic message; every other category is returned to the caller as-is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mentormesh_core::{
    errors::MeshError,
    models::{availability::SlotView, envelope::ErrorBody},
};

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use mentormesh_api::middleware::error_handling::AppError;
/// use mentormesh_core::errors::MeshError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(MeshError::slot_not_found().into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub MeshError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MeshError::NotFound(_) => StatusCode::NOT_FOUND,
            MeshError::Validation { .. } => StatusCode::BAD_REQUEST,
            MeshError::Conflict { .. } => StatusCode::CONFLICT,
            MeshError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            MeshError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MeshError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let mut body = ErrorBody::new(self.0.public_message());
        match self.0 {
            MeshError::Validation { errors, .. } => body.errors = errors,
            MeshError::Conflict { existing, .. } => {
                body.existing_slot = existing.map(|slot| SlotView::from(*slot));
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl From<MeshError> for AppError {
    fn from(err: MeshError) -> Self {
        AppError(err)
    }
}

/// Store failures reaching a handler directly count as database errors
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MeshError::Database(err))
    }
}

/// Maps a MeshError to an HTTP response
pub fn map_error(err: MeshError) -> Response {
    AppError(err).into_response()
}
