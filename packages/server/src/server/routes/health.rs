use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    persistence: PersistenceHealth,
    last_result_cached: bool,
}

#[derive(Serialize)]
pub struct PersistenceHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// The snapshot store is optional, so a missing or failing store reports
/// `degraded` but still answers 200: scrapes keep working from memory.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let persistence = match &state.deps.snapshot_store {
        None => PersistenceHealth {
            status: "disabled".to_string(),
            error: None,
        },
        Some(store) => {
            match tokio::time::timeout(std::time::Duration::from_secs(5), store.ping()).await {
                Ok(Ok(())) => PersistenceHealth {
                    status: "ok".to_string(),
                    error: None,
                },
                Ok(Err(e)) => PersistenceHealth {
                    status: "error".to_string(),
                    error: Some(format!("{e:#}")),
                },
                Err(_) => PersistenceHealth {
                    status: "error".to_string(),
                    error: Some("Ping timeout (>5s)".to_string()),
                },
            }
        }
    };

    let overall_status = if persistence.status == "error" {
        "degraded"
    } else {
        "healthy"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: overall_status.to_string(),
            persistence,
            last_result_cached: !state.deps.last_result.is_empty().await,
        }),
    )
}
