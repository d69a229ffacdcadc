//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AllowedOrigins;

use super::dto::{ErrorResponse, HealthResponse, StationsResponse};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/api/v1/stations", get(stations))
        .route("/api/v1/health", get(health))
        .fallback(not_found)
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for read-only GET access from the configured origins.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
}

/// All stations as a GeoJSON feature collection.
async fn stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let snapshot = state.get_stations();
    Json(StationsResponse::from_snapshot(&snapshot))
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health())
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("no route for {}", uri.path()),
        }),
    )
}
