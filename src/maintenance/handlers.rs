use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateMaintenanceRequest, MaintenanceResponse, UpdateMaintenanceRequest},
    services::{apply_update, new_record, NOT_FOUND},
};
use crate::{
    auth::AuthUser,
    errors::{parse_id, ApiError},
    extractors::JsonBody,
    state::AppState,
    vehicles::services::{self as vehicles, require_owned},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/maintenance/vehicle/:vehicle_id",
            get(list_records).post(create_record),
        )
        .route(
            "/maintenance/:maintenance_id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Vec<MaintenanceResponse>>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let records = state.store.list_maintenance(user_id, vehicle_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
    JsonBody(payload): JsonBody<CreateMaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let record = new_record(user_id, vehicle_id, payload)?;
    state.store.insert_maintenance(&record).await?;

    info!(%user_id, %vehicle_id, maintenance_id = %record.id, "maintenance record created");
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(maintenance_id): Path<String>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let id = parse_id(&maintenance_id, NOT_FOUND)?;
    let record = state
        .store
        .find_maintenance(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(record.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(maintenance_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateMaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let id = parse_id(&maintenance_id, NOT_FOUND)?;
    let mut record = state
        .store
        .find_maintenance(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    apply_update(&mut record, payload)?;

    if !state.store.update_maintenance(&record).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, maintenance_id = %id, "maintenance record updated");
    Ok(Json(record.into()))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(maintenance_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&maintenance_id, NOT_FOUND)?;
    if !state.store.delete_maintenance(user_id, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, maintenance_id = %id, "maintenance record deleted");
    Ok(StatusCode::NO_CONTENT)
}
