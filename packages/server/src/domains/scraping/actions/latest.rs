//! Resolve the most recent result across the store and the in-memory cache.

use tracing::warn;

use crate::domains::scraping::{ResultSnapshot, ScrapeError};
use crate::kernel::ServerDeps;

/// Newest snapshot available, or `None` if nothing has been scraped yet.
///
/// The store is preferred, but when it is unreachable, or the cache holds
/// something newer (a write that failed to persist), the cache wins.
pub async fn latest_snapshot(deps: &ServerDeps) -> Option<ResultSnapshot> {
    let cached = deps.last_result.get().await;

    let stored = match &deps.snapshot_store {
        Some(store) => match store.latest().await {
            Ok(stored) => stored,
            Err(e) => {
                let err = ScrapeError::PersistenceUnavailable(format!("{e:#}"));
                warn!(error = %err, "Falling back to in-memory result");
                None
            }
        },
        None => None,
    };

    match (stored, cached) {
        (Some(stored), Some(cached)) if cached.created_at > stored.created_at => Some(cached),
        (Some(stored), _) => Some(stored),
        (None, cached) => cached,
    }
}
