use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Json,
};

use crate::database::{PayloadKind, RawData, Satellite};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

type SatellitePath = Result<Path<(u32, i64)>, PathRejection>;
type SatelliteBody = Result<Json<Satellite>, JsonRejection>;

/// GET /api/v1/galileo/request/:satellite_id/:timestamp
/// (also /api/v1/galileo/ublox/request/:satellite_id/:timestamp)
///
/// Raw data of a satellite at one timestamp in ms.
pub async fn raw_data_get(
    State(state): State<AppState>,
    path: SatellitePath,
) -> ApiResult<RawData> {
    single(&state, PayloadKind::Ublox, path).await
}

/// POST /api/v1/galileo/request (also /api/v1/galileo/ublox/request)
///
/// Raw data of a satellite for a list of timestamps, returned in request order.
pub async fn satellite_info_post(
    State(state): State<AppState>,
    body: SatelliteBody,
) -> ApiResult<Satellite> {
    batch(&state, PayloadKind::Ublox, body).await
}

/// GET /api/v1/galileo/request/galileo/:satellite_id/:timestamp
pub async fn galileo_data_get(
    State(state): State<AppState>,
    path: SatellitePath,
) -> ApiResult<RawData> {
    single(&state, PayloadKind::Galileo, path).await
}

/// POST /api/v1/galileo/request/galileo
pub async fn galileo_info_post(
    State(state): State<AppState>,
    body: SatelliteBody,
) -> ApiResult<Satellite> {
    batch(&state, PayloadKind::Galileo, body).await
}

async fn single(state: &AppState, kind: PayloadKind, path: SatellitePath) -> ApiResult<RawData> {
    let Path((satellite_id, timestamp)) = path?;
    require_satellite_id(satellite_id)?;

    let data = state
        .telemetry
        .resolve_one(kind, satellite_id, timestamp)
        .await?;
    Ok(ApiResponse::success(data))
}

async fn batch(state: &AppState, kind: PayloadKind, body: SatelliteBody) -> ApiResult<Satellite> {
    let Json(satellite) = body?;
    require_satellite_id(satellite.satellite_id)?;

    let satellite = state.telemetry.resolve_all(kind, satellite).await?;
    Ok(ApiResponse::success(satellite))
}

fn require_satellite_id(satellite_id: u32) -> Result<(), ApiError> {
    if satellite_id == 0 {
        return Err(ApiError::bad_request("satellite_id must be a positive integer"));
    }
    Ok(())
}
