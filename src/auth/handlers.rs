use axum::{
    extract::{FromRef, State},
    routing::{get, post, put},
    Json, Router,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, MessageResponse,
            ResetPasswordRequest, SignupRequest, TokenResponse, UserResponse,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{self, hash_password, verify_password},
        repo_types::User,
        services::{generate_reset_token, is_valid_email, normalize_email},
    },
    errors::ApiError,
    extractors::JsonBody,
    state::AppState,
};

const FORGOT_PASSWORD_REPLY: &str =
    "If an account exists with that email, a password reset link will be sent";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/change-password", put(change_password))
}

fn password_too_short() -> ApiError {
    ApiError::BadRequest(format!(
        "Password must be at least {} characters",
        password::MIN_PASSWORD_LEN
    ))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if !password::is_acceptable(&payload.password) {
        warn!("password too short");
        return Err(password_too_short());
    }

    // Ensure email is not taken
    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::BadRequest("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let full_name = payload.full_name.unwrap_or_default().trim().to_string();
    let user = User::new(email, full_name, hash);
    // a concurrent signup can still race us here; the store reports it as a duplicate
    state.store.insert_user(&user).await?;

    let access_token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(TokenResponse::bearer(access_token, user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());

    let user = match state.store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(invalid());
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).unwrap_or_else(|e| {
        warn!(error = %e, user_id = %user.id, "stored password hash unreadable");
        false
    });
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login to inactive account");
        return Err(ApiError::Forbidden("Account is disabled".into()));
    }

    let access_token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token, user.into())))
}

pub(crate) async fn load_user(state: &AppState, user_id: uuid::Uuid) -> Result<User, ApiError> {
    state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "token for unknown user");
            ApiError::NotFound("User not found".into())
        })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut user = load_user(&state, user_id).await?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user_id, "change password with wrong current password");
        return Err(ApiError::Unauthorized("Current password is incorrect".into()));
    }
    if !password::is_acceptable(&payload.new_password) {
        return Err(password_too_short());
    }

    user.password_hash = hash_password(&payload.new_password)?;
    user.updated_at = OffsetDateTime::now_utc();
    state.store.update_user(&user).await?;

    info!(user_id = %user_id, "password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    // Same answer whether or not the account exists.
    let Some(mut user) = state.store.find_user_by_email(&email).await? else {
        debug!(email = %email, "password reset for unknown email");
        return Ok(Json(MessageResponse::new(FORGOT_PASSWORD_REPLY)));
    };

    let token = generate_reset_token();
    let now = OffsetDateTime::now_utc();
    user.reset_token = Some(token.clone());
    user.reset_token_expires_at = Some(now + Duration::minutes(state.config.reset_ttl_minutes));
    user.updated_at = now;
    state.store.update_user(&user).await?;

    info!(user_id = %user.id, "password reset token issued");
    if state.config.debug {
        debug!(user_id = %user.id, reset_token = %token, "password reset token");
    }

    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_REPLY)))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !password::is_acceptable(&payload.new_password) {
        return Err(password_too_short());
    }

    let token = payload.token.trim();
    let found = if token.is_empty() {
        None
    } else {
        state.store.find_user_by_reset_token(token).await?
    };
    let Some(mut user) = found else {
        warn!("reset with unknown token");
        return Err(ApiError::BadRequest("Invalid or expired reset token".into()));
    };

    let now = OffsetDateTime::now_utc();
    if user.reset_token_expires_at.map_or(true, |exp| exp < now) {
        warn!(user_id = %user.id, "reset with expired token");
        return Err(ApiError::BadRequest(
            "Reset token has expired. Please request a new one.".into(),
        ));
    }

    user.password_hash = hash_password(&payload.new_password)?;
    user.reset_token = None;
    user.reset_token_expires_at = None;
    user.updated_at = now;
    state.store.update_user(&user).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse::new(
        "Password reset successfully. You can now login with your new password.",
    )))
}
