//! In-process copy of the most recent result.
//!
//! Always written after a successful scrape, so reads keep working when the
//! snapshot store is missing or down.

use tokio::sync::RwLock;

use super::ResultSnapshot;

#[derive(Default)]
pub struct LastResultCache {
    inner: RwLock<Option<ResultSnapshot>>,
}

impl LastResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached result, unless the cache already holds a newer one.
    pub async fn store(&self, snapshot: ResultSnapshot) {
        let mut slot = self.inner.write().await;
        let is_newer = slot
            .as_ref()
            .map_or(true, |current| snapshot.created_at >= current.created_at);
        if is_newer {
            *slot = Some(snapshot);
        }
    }

    pub async fn get(&self) -> Option<ResultSnapshot> {
        self.inner.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_none()
    }
}
