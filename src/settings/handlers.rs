use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AccountResponse, SettingsResponse, UpdatePreferencesRequest},
    services::apply_update,
};
use crate::{
    auth::{dto::MessageResponse, handlers::load_user, AuthUser},
    errors::ApiError,
    extractors::JsonBody,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings/account", get(get_account).delete(delete_account))
        .route(
            "/settings/preferences",
            get(get_preferences).put(update_preferences),
        )
}

#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

/// Removes the user together with every vehicle and vehicle record they own.
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_user(user_id).await? {
        warn!(%user_id, "delete for unknown account");
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(%user_id, "account deleted");
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SettingsResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    let prefs = state
        .store
        .find_preferences(user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(SettingsResponse::new(user, prefs)))
}

#[instrument(skip(state, payload))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<UpdatePreferencesRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    let mut prefs = state
        .store
        .find_preferences(user_id)
        .await?
        .unwrap_or_default();
    apply_update(&mut prefs, payload)?;
    state.store.save_preferences(user_id, &prefs).await?;

    info!(%user_id, "preferences updated");
    Ok(Json(SettingsResponse::new(user, prefs)))
}
