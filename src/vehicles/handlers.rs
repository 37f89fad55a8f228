use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse},
    services::{apply_update, new_vehicle, require_owned, NOT_FOUND},
};
use crate::{
    auth::AuthUser,
    errors::{parse_id, ApiError},
    extractors::JsonBody,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/:vehicle_id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

#[instrument(skip(state))]
pub async fn list_vehicles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let vehicles = state.store.list_vehicles(user_id).await?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<CreateVehicleRequest>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle = new_vehicle(user_id, payload)?;
    state.store.insert_vehicle(&vehicle).await?;

    info!(%user_id, vehicle_id = %vehicle.id, "vehicle created");
    Ok(Json(vehicle.into()))
}

#[instrument(skip(state))]
pub async fn get_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let id = parse_id(&vehicle_id, NOT_FOUND)?;
    let vehicle = require_owned(&state, user_id, id).await?;
    Ok(Json(vehicle.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let id = parse_id(&vehicle_id, NOT_FOUND)?;
    let mut vehicle = require_owned(&state, user_id, id).await?;
    apply_update(&mut vehicle, payload)?;

    if !state.store.update_vehicle(&vehicle).await? {
        // deleted between the read and the write
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, vehicle_id = %id, "vehicle updated");
    Ok(Json(vehicle.into()))
}

#[instrument(skip(state))]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&vehicle_id, NOT_FOUND)?;
    if !state.store.delete_vehicle(user_id, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, vehicle_id = %id, "vehicle deleted");
    Ok(StatusCode::NO_CONTENT)
}
