// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Polling, shape detection fallbacks and normalization live in the scraping domain.
//
// Naming convention: Base* for trait names (e.g., BaseScrapeProvider)

use anyhow::Result;
use apify_client::{CommentsScraperInput, RunData, RunSnapshot};
use async_trait::async_trait;
use serde_json::Value;

use crate::domains::scraping::ResultSnapshot;

// =============================================================================
// Scrape Provider Trait (Infrastructure - remote actor runs)
// =============================================================================

/// Remote scraping provider. Every call takes the credential to use, since
/// operators may supply their own token per request.
#[async_trait]
pub trait BaseScrapeProvider: Send + Sync {
    /// Submit a run. Returns as soon as the provider has accepted it.
    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<RunData>;

    /// Run and wait in one call; the raw body is returned for shape detection.
    async fn run_sync(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<Value>;

    /// Current status of a run, with the payload it came in.
    async fn get_run(&self, token: &str, run_id: &str) -> apify_client::Result<RunSnapshot>;

    async fn get_dataset_items(
        &self,
        token: &str,
        dataset_id: &str,
    ) -> apify_client::Result<Vec<Value>>;
}

// =============================================================================
// Snapshot Store Trait (Infrastructure - append-only persistence)
// =============================================================================

#[async_trait]
pub trait BaseSnapshotStore: Send + Sync {
    async fn insert(&self, snapshot: &ResultSnapshot) -> Result<()>;

    /// Most recent snapshot by `created_at`
    async fn latest(&self) -> Result<Option<ResultSnapshot>>;

    /// Cheap liveness probe for the health endpoint
    async fn ping(&self) -> Result<()>;
}
