//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the HTTP handlers.
//! All external services use trait abstractions to enable testing.

use anyhow::{Context, Result};
use apify_client::{ApifyClient, CommentsScraperInput, RunData, RunSnapshot};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::scraping::{
    DriverOptions, JobDriver, LastResultCache, RequestDefaults, ResultSnapshot,
};
use crate::kernel::{BaseScrapeProvider, BaseSnapshotStore};

// =============================================================================
// ApifyClient Adapter (implements BaseScrapeProvider trait)
// =============================================================================

/// Wrapper around ApifyClient that implements BaseScrapeProvider trait
pub struct ApifyAdapter(pub ApifyClient);

impl ApifyAdapter {
    pub fn new(base_url: &str) -> Self {
        // The token is supplied per call; the client only carries the pool.
        Self(ApifyClient::new(String::new()).with_base_url(base_url))
    }
}

#[async_trait]
impl BaseScrapeProvider for ApifyAdapter {
    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<RunData> {
        self.0.with_token(token).start_run(actor_id, input).await
    }

    async fn run_sync(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<Value> {
        self.0.with_token(token).run_sync(actor_id, input).await
    }

    async fn get_run(&self, token: &str, run_id: &str) -> apify_client::Result<RunSnapshot> {
        self.0.with_token(token).get_run(run_id).await
    }

    async fn get_dataset_items(
        &self,
        token: &str,
        dataset_id: &str,
    ) -> apify_client::Result<Vec<Value>> {
        self.0.with_token(token).get_dataset_items(dataset_id).await
    }
}

// =============================================================================
// Postgres Snapshot Store (implements BaseSnapshotStore trait)
// =============================================================================

pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSnapshotStore for PostgresSnapshotStore {
    async fn insert(&self, snapshot: &ResultSnapshot) -> Result<()> {
        snapshot.insert(&self.pool).await
    }

    async fn latest(&self) -> Result<Option<ResultSnapshot>> {
        ResultSnapshot::find_latest(&self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub driver: Arc<JobDriver>,
    /// `None` when no database is configured or it could not be reached
    pub snapshot_store: Option<Arc<dyn BaseSnapshotStore>>,
    pub last_result: Arc<LastResultCache>,
    pub request_defaults: RequestDefaults,
}

impl ServerDeps {
    pub fn new(
        provider: Arc<dyn BaseScrapeProvider>,
        driver_options: DriverOptions,
        snapshot_store: Option<Arc<dyn BaseSnapshotStore>>,
        request_defaults: RequestDefaults,
    ) -> Self {
        Self {
            driver: Arc::new(JobDriver::new(provider, driver_options)),
            snapshot_store,
            last_result: Arc::new(LastResultCache::new()),
            request_defaults,
        }
    }
}
