use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::bearer_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(galileo_routes(state.clone()))
        .merge(ublox_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn galileo_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/galileo/request", post(protected::satellite_info_post))
        .route(
            "/api/v1/galileo/request/:satellite_id/:timestamp",
            get(protected::raw_data_get),
        )
        .route("/api/v1/galileo/request/galileo", post(protected::galileo_info_post))
        .route(
            "/api/v1/galileo/request/galileo/:satellite_id/:timestamp",
            get(protected::galileo_data_get),
        )
        .route_layer(from_fn_with_state(state, bearer_auth_middleware))
}

fn ublox_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/galileo/ublox/request", post(protected::satellite_info_post))
        .route(
            "/api/v1/galileo/ublox/request/:satellite_id/:timestamp",
            get(protected::raw_data_get),
        )
        .route_layer(from_fn_with_state(state, bearer_auth_middleware))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
