use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{
    dto::{
        CreateFuelLogRequest, FuelLogResponse, FuelStatsResponse, StatsQuery,
        UpdateFuelLogRequest,
    },
    services::{apply_update, new_log, stats_window, summarize, NOT_FOUND},
};
use crate::{
    auth::AuthUser,
    errors::{parse_id, ApiError},
    extractors::{JsonBody, QueryParams},
    state::AppState,
    vehicles::services::{self as vehicles, require_owned},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fuel/vehicle/:vehicle_id",
            get(list_logs).post(create_log),
        )
        .route("/fuel/vehicle/:vehicle_id/stats", get(fuel_stats))
        .route(
            "/fuel/:fuel_log_id",
            get(get_log).put(update_log).delete(delete_log),
        )
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Vec<FuelLogResponse>>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let logs = state.store.list_fuel_logs(user_id, vehicle_id).await?;
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
    JsonBody(payload): JsonBody<CreateFuelLogRequest>,
) -> Result<Json<FuelLogResponse>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let log = new_log(user_id, vehicle_id, payload)?;
    state.store.insert_fuel_log(&log).await?;

    info!(%user_id, %vehicle_id, fuel_log_id = %log.id, "fuel log created");
    Ok(Json(log.into()))
}

#[instrument(skip(state))]
pub async fn fuel_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
    QueryParams(query): QueryParams<StatsQuery>,
) -> Result<Json<FuelStatsResponse>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    let window = stats_window(query.days)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let logs = state.store.list_fuel_logs(user_id, vehicle_id).await?;
    Ok(Json(summarize(logs, OffsetDateTime::now_utc() - window)))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(fuel_log_id): Path<String>,
) -> Result<Json<FuelLogResponse>, ApiError> {
    let id = parse_id(&fuel_log_id, NOT_FOUND)?;
    let log = state
        .store
        .find_fuel_log(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(log.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(fuel_log_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateFuelLogRequest>,
) -> Result<Json<FuelLogResponse>, ApiError> {
    let id = parse_id(&fuel_log_id, NOT_FOUND)?;
    let mut log = state
        .store
        .find_fuel_log(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    apply_update(&mut log, payload)?;

    if !state.store.update_fuel_log(&log).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, fuel_log_id = %id, "fuel log updated");
    Ok(Json(log.into()))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(fuel_log_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&fuel_log_id, NOT_FOUND)?;
    if !state.store.delete_fuel_log(user_id, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, fuel_log_id = %id, "fuel log deleted");
    Ok(StatusCode::NO_CONTENT)
}
