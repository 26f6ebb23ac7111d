use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::app::AppState;
use crate::server::auth::Session;
use crate::server::error::ApiError;
use crate::server::middleware::{Operator, SESSION_COOKIE};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    ok: bool,
    token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    ok: bool,
}

/// Check the operator credentials and open a session.
///
/// The token is returned in the body (for `Authorization: Bearer`) and as an
/// HttpOnly cookie (for the bundled UI).
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(login) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if !state.admin.matches(login.username.trim(), &login.password) {
        warn!(username = %login.username, "Rejected login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .sessions
        .create_session(Session {
            username: login.username.trim().to_string(),
            created_at: Utc::now(),
        })
        .await;
    info!(username = %login.username.trim(), "Operator logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        state.sessions.ttl().num_seconds()
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { ok: true, token }),
    )
        .into_response())
}

/// Close the caller's session, if any, and clear the cookie.
pub async fn logout_handler(
    Extension(state): Extension<AppState>,
    operator: Option<Extension<Operator>>,
) -> Response {
    if let Some(Extension(operator)) = operator {
        state.sessions.delete_session(&operator.token).await;
        info!(username = %operator.username, "Operator logged out");
    }

    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");
    ([(header::SET_COOKIE, cookie)], Json(LogoutResponse { ok: true })).into_response()
}
