//! HTTP error responses.
//!
//! Every failure is answered with `{"ok": false, "message": ...}`; provider
//! failures also carry what the provider said.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::domains::scraping::ScrapeError;

#[derive(Debug)]
pub enum ApiError {
    /// No valid session on a protected route
    Unauthorized,
    /// Wrong username or password at login
    InvalidCredentials,
    /// Body could not be read as the expected JSON
    BadRequest(String),
    /// No such API route
    NotFound(String),
    Scrape(ScrapeError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    ok: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_body: Option<Value>,
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        Self::Scrape(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut provider_status = None;
        let mut provider_body = None;

        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Login required".to_string()),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(path) => (StatusCode::NOT_FOUND, format!("No route for {path}")),
            Self::Scrape(err) => {
                let message = err.to_string();
                let status = match err {
                    ScrapeError::Validation(_) => StatusCode::BAD_REQUEST,
                    ScrapeError::RemoteCallFailed { status, body } => {
                        provider_status = Some(Value::from(status));
                        // Keep JSON bodies structured so the UI can show them.
                        provider_body =
                            Some(serde_json::from_str(&body).unwrap_or(Value::String(body)));
                        StatusCode::BAD_GATEWAY
                    }
                    ScrapeError::RemoteJobFailed { status, payload } => {
                        provider_status = Some(Value::String(status));
                        provider_body = Some(payload);
                        StatusCode::BAD_GATEWAY
                    }
                    ScrapeError::Transport(_) | ScrapeError::Decode(_) => StatusCode::BAD_GATEWAY,
                    ScrapeError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    ScrapeError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, message)
            }
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %message, "Request failed");
        }

        let body = ErrorBody {
            ok: false,
            message,
            provider_status,
            provider_body,
        };
        (status, Json(body)).into_response()
    }
}
