use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateReminderRequest, ReminderResponse, UpdateReminderRequest},
    services::{apply_update, new_reminder, NOT_FOUND},
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
            "/reminders/vehicle/:vehicle_id",
            get(list_reminders).post(create_reminder),
        )
        .route(
            "/reminders/:reminder_id",
            get(get_reminder).put(update_reminder).delete(delete_reminder),
        )
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Vec<ReminderResponse>>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let reminders = state.store.list_reminders(user_id, vehicle_id).await?;
    Ok(Json(reminders.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<String>,
    JsonBody(payload): JsonBody<CreateReminderRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let vehicle_id = parse_id(&vehicle_id, vehicles::NOT_FOUND)?;
    require_owned(&state, user_id, vehicle_id).await?;

    let reminder = new_reminder(user_id, vehicle_id, payload)?;
    state.store.insert_reminder(&reminder).await?;

    info!(%user_id, %vehicle_id, reminder_id = %reminder.id, "reminder created");
    Ok(Json(reminder.into()))
}

#[instrument(skip(state))]
pub async fn get_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<String>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let id = parse_id(&reminder_id, NOT_FOUND)?;
    let reminder = state
        .store
        .find_reminder(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(reminder.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateReminderRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let id = parse_id(&reminder_id, NOT_FOUND)?;
    let mut reminder = state
        .store
        .find_reminder(user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    apply_update(&mut reminder, payload)?;

    if !state.store.update_reminder(&reminder).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, reminder_id = %id, "reminder updated");
    Ok(Json(reminder.into()))
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&reminder_id, NOT_FOUND)?;
    if !state.store.delete_reminder(user_id, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(%user_id, reminder_id = %id, "reminder deleted");
    Ok(StatusCode::NO_CONTENT)
}
