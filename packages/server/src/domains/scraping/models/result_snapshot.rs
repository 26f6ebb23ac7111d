//! Result Snapshot - one completed scrape, stored append-only.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NormalizedRecord, RequestSummary};

pub type ResultSnapshotId = Uuid;

/// Outcome of one completed job. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSnapshot {
    pub id: ResultSnapshotId,
    pub created_at: DateTime<Utc>,
    pub request: RequestSummary,
    pub raw_items: Vec<Value>,
    pub records: Vec<NormalizedRecord>,
}

#[derive(sqlx::FromRow)]
struct ResultSnapshotRow {
    id: ResultSnapshotId,
    created_at: DateTime<Utc>,
    request: Json<RequestSummary>,
    raw_items: Json<Vec<Value>>,
    records: Json<Vec<NormalizedRecord>>,
}

impl From<ResultSnapshotRow> for ResultSnapshot {
    fn from(row: ResultSnapshotRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            request: row.request.0,
            raw_items: row.raw_items.0,
            records: row.records.0,
        }
    }
}

impl ResultSnapshot {
    pub fn new(request: RequestSummary, raw_items: Vec<Value>, records: Vec<NormalizedRecord>) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            request,
            raw_items,
            records,
        }
    }

    /// Insert a snapshot. There is no update path.
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO result_snapshots (id, created_at, request, raw_items, records)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(self.id)
        .bind(self.created_at)
        .bind(Json(&self.request))
        .bind(Json(&self.raw_items))
        .bind(Json(&self.records))
        .execute(pool)
        .await
        .context("Failed to insert result snapshot")?;

        tracing::info!(
            snapshot_id = %self.id,
            records = self.records.len(),
            "Stored result snapshot"
        );
        Ok(())
    }

    /// Most recent snapshot by creation time, if any.
    pub async fn find_latest(pool: &PgPool) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, ResultSnapshotRow>(
            "SELECT id, created_at, request, raw_items, records
             FROM result_snapshots
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .fetch_optional(pool)
        .await
        .context("Failed to load latest result snapshot")?;

        Ok(row.map(Into::into))
    }
}
