use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Galileo API (Rust)",
        "version": env!("CARGO_PKG_VERSION"),
        "nation": state.telemetry.nation(),
        "description": "Raw and Galileo navigation data of satellites by timestamp",
        "endpoints": {
            "raw_data": "/api/v1/galileo/request/:satellite_id/:timestamp (protected)",
            "satellite_info": "POST /api/v1/galileo/request (protected)",
            "galileo_data": "/api/v1/galileo/request/galileo/:satellite_id/:timestamp (protected)",
            "galileo_info": "POST /api/v1/galileo/request/galileo (protected)",
            "ublox": "/api/v1/galileo/ublox/request[/:satellite_id/:timestamp] (protected)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - data store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    let now = chrono::Utc::now();

    match state.telemetry.health().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        })),
        Err(e) => ApiResponse::with_status(
            json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
    }
}
