//! Authentication Handlers
//!
//! The hidden admin entry: repeated logo clicks reveal the login form,
//! credentials are checked against the injected admin account, and a JWT
//! carries the session.

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::MAX_PASSWORD_LEN;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Serialize)]
pub struct LogoClickResponse {
    /// Whether the login form should now be shown
    pub reveal_login: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

fn lock_gate(state: &ServerState) -> AppResult<std::sync::MutexGuard<'_, crate::auth::LogoGate>> {
    state
        .logo_gate
        .lock()
        .map_err(|_| AppError::internal("Logo gate lock poisoned"))
}

/// Count a logo click; the fifth one reveals the login form
pub async fn logo_click(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<LogoClickResponse>>> {
    let reveal_login = lock_gate(&state)?.click();
    Ok(ok(LogoClickResponse { reveal_login }))
}

/// Login form dismissed without logging in; click progress starts over
pub async fn dismiss(State(state): State<ServerState>) -> AppResult<Json<AppResponse<()>>> {
    lock_gate(&state)?.reset();
    Ok(ok(()))
}

/// Login handler
///
/// Verifies the admin credentials and returns a JWT token. The failure
/// message never reveals which part of the credentials mismatched.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::invalid_credentials());
    }

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    if !state.admin.verify(&req.username, &req.password) {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&req.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    lock_gate(&state)?.reset();
    tracing::info!(username = %req.username, "Admin logged in");

    Ok(ok(LoginResponse {
        token,
        username: req.username,
    }))
}

/// Logout handler
///
/// Drops every edit draft and resets the click counter so a later session
/// starts clean.
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AppResponse<()>>> {
    state.edit.reset_all().await;
    lock_gate(&state)?.reset();

    tracing::info!(username = %user.username, "Admin logged out");
    Ok(ok(()))
}
