use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::scraping::{
    latest_snapshot, records_to_csv, run_scrape, CsvLayout, NormalizedRecord, ScrapeInput,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    ok: bool,
    snapshot_id: Uuid,
    created_at: DateTime<Utc>,
    raw_count: usize,
    normalized: Vec<NormalizedRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    normalized: Vec<NormalizedRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// Include the commenter profile columns
    #[serde(default)]
    pub extended: bool,
}

/// Run a scrape and return its normalized records.
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<ScrapeInput>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let snapshot = run_scrape(input, &state.deps).await?;

    Ok(Json(ScrapeResponse {
        ok: true,
        snapshot_id: snapshot.id,
        created_at: snapshot.created_at,
        raw_count: snapshot.raw_items.len(),
        normalized: snapshot.records,
    }))
}

/// Most recent result, or an empty list if nothing has run yet.
pub async fn latest_handler(Extension(state): Extension<AppState>) -> Json<LatestResponse> {
    let response = match latest_snapshot(&state.deps).await {
        Some(snapshot) => LatestResponse {
            ok: true,
            created_at: Some(snapshot.created_at),
            target_url: Some(snapshot.request.target_url),
            normalized: snapshot.records,
        },
        None => LatestResponse {
            ok: true,
            created_at: None,
            target_url: None,
            normalized: Vec::new(),
        },
    };

    Json(response)
}

/// Download the most recent result as `export.csv`.
pub async fn export_csv_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let layout = if params.extended {
        CsvLayout::Extended
    } else {
        CsvLayout::Basic
    };

    let records = latest_snapshot(&state.deps)
        .await
        .map(|snapshot| snapshot.records)
        .unwrap_or_default();

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=export.csv"),
        ],
        records_to_csv(&records, layout),
    )
        .into_response())
}
