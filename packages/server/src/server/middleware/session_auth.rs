use crate::server::auth::SessionStore;
use crate::server::error::ApiError;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Logged-in operator, stored in request extensions
#[derive(Clone, Debug)]
pub struct Operator {
    pub username: String,
    pub token: String,
}

/// Middleware to extract session and populate the operator
///
/// Looks for the token in the Authorization header first, then the session
/// cookie. Does NOT block requests - `require_operator` does that on the
/// routes that need it.
pub async fn session_auth_middleware(
    sessions: Arc<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        match sessions.get_session(&token).await {
            Some(session) => {
                request.extensions_mut().insert(Operator {
                    username: session.username,
                    token,
                });
            }
            None => debug!("Unknown or expired session token"),
        }
    }

    next.run(request).await
}

/// Reject the request unless `session_auth_middleware` found an operator
pub async fn require_operator(request: Request, next: Next) -> Response {
    if request.extensions().get::<Operator>().is_none() {
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}

/// Extract session token from the Authorization header or the session cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        // Handle both "Bearer <token>" and raw token
        let token = auth.strip_prefix("Bearer ").unwrap_or(auth).trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
