//! # MentorMesh API
//!
//! HTTP server for mentor availability and session booking.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint table, one router per feature merged at startup
//! - **Handlers**: request extraction and response envelopes
//! - **Services**: availability and booking operations over the stores
//! - **Middleware**: error-to-HTTP mapping
//! - **Config**: environment configuration
//!
//! Persistence sits behind the `SlotRepository` and `UserDirectory` traits
//! from `mentormesh-db`, so the same router runs over Postgres in production
//! and over the in-memory store in tests.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method, StatusCode},
    BoxError, Json, Router,
};
use eyre::Result;
use mentormesh_core::{clock::SystemClock, models::envelope::ErrorBody};
use mentormesh_db::{DbPool, PgSlotRepository, PgUserDirectory};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use services::AvailabilityService;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub service: AvailabilityService,
}

impl ApiState {
    pub fn new(service: AvailabilityService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// All API routes with `state` attached, without transport layers
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::availability::routes())
        .with_state(state)
}

async fn handle_layer_error(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody::new("Request timed out")),
        )
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Internal server error")),
        )
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Starts the API server over Postgres-backed stores
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let service = AvailabilityService::new(
        Arc::new(PgSlotRepository::new(db_pool.clone())),
        Arc::new(PgUserDirectory::new(db_pool)),
        Arc::new(SystemClock),
        config.meeting_base_url.clone(),
    );
    let app = build_router(ApiState::new(service));

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(handle_layer_error))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
