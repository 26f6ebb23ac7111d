// Test doubles for the kernel traits
//
// Scripted provider and in-memory stores that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use apify_client::{ApifyError, CommentsScraperInput, RunData, RunSnapshot};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{BaseScrapeProvider, BaseSnapshotStore};
use crate::domains::scraping::ResultSnapshot;

// =============================================================================
// Mock Scrape Provider
// =============================================================================

/// One recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    StartRun {
        token: String,
        actor_id: String,
        input: CommentsScraperInput,
    },
    RunSync {
        token: String,
        actor_id: String,
        input: CommentsScraperInput,
    },
    GetRun {
        run_id: String,
    },
    GetDatasetItems {
        dataset_id: String,
    },
}

pub struct MockScrapeProvider {
    run_id: String,
    dataset_id: String,
    /// Statuses handed out by `get_run`, in order. The last one repeats.
    statuses: Mutex<VecDeque<String>>,
    dataset_items: Mutex<Vec<Value>>,
    sync_response: Mutex<Value>,
    api_error: Mutex<Option<(u16, String)>>,
    poll_error: Mutex<Option<(u16, String)>>,
    dataset_error: Mutex<Option<(u16, String)>>,
    /// `get_run` calls past this many never answer
    stall_after: Mutex<Option<usize>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockScrapeProvider {
    pub fn new() -> Self {
        Self {
            run_id: "run-1".to_string(),
            dataset_id: "dataset-1".to_string(),
            statuses: Mutex::new(VecDeque::new()),
            dataset_items: Mutex::new(Vec::new()),
            sync_response: Mutex::new(json!([])),
            api_error: Mutex::new(None),
            poll_error: Mutex::new(None),
            dataset_error: Mutex::new(None),
            stall_after: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the statuses `get_run` reports
    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Items served from the run's dataset
    pub fn with_dataset_items(self, items: Vec<Value>) -> Self {
        *self.dataset_items.lock().unwrap() = items;
        self
    }

    /// Body returned by `run_sync`
    pub fn with_sync_response(self, body: Value) -> Self {
        *self.sync_response.lock().unwrap() = body;
        self
    }

    /// Make `start_run` and `run_sync` fail with an HTTP error
    pub fn with_api_error(self, status: u16, body: &str) -> Self {
        *self.api_error.lock().unwrap() = Some((status, body.to_string()));
        self
    }

    /// Make `get_run` fail with an HTTP error
    pub fn with_poll_error(self, status: u16, body: &str) -> Self {
        *self.poll_error.lock().unwrap() = Some((status, body.to_string()));
        self
    }

    /// Make `get_dataset_items` fail with an HTTP error
    pub fn with_dataset_error(self, status: u16, body: &str) -> Self {
        *self.dataset_error.lock().unwrap() = Some((status, body.to_string()));
        self
    }

    /// Answer the first `answered` status calls, then hang forever
    pub fn with_stalled_polls_after(self, answered: usize) -> Self {
        *self.stall_after.lock().unwrap() = Some(answered);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Get all recorded calls, oldest first
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::GetRun { .. }))
    }

    pub fn dataset_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::GetDatasetItems { .. }))
    }

    /// Whether anything at all reached the provider
    pub fn was_called(&self) -> bool {
        !self.calls.lock().unwrap().is_empty()
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(*c)).count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_error(slot: &Mutex<Option<(u16, String)>>) -> Option<ApifyError> {
        slot.lock()
            .unwrap()
            .clone()
            .map(|(status, message)| ApifyError::Api { status, message })
    }

    fn next_status(&self) -> String {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap_or_default()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| "SUCCEEDED".to_string())
        }
    }
}

impl Default for MockScrapeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseScrapeProvider for MockScrapeProvider {
    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<RunData> {
        self.record(ProviderCall::StartRun {
            token: token.to_string(),
            actor_id: actor_id.to_string(),
            input: input.clone(),
        });

        if let Some(err) = Self::scripted_error(&self.api_error) {
            return Err(err);
        }

        Ok(RunData {
            id: self.run_id.clone(),
            status: "READY".to_string(),
            default_dataset_id: None,
            started_at: None,
            finished_at: None,
        })
    }

    async fn run_sync(
        &self,
        token: &str,
        actor_id: &str,
        input: &CommentsScraperInput,
    ) -> apify_client::Result<Value> {
        self.record(ProviderCall::RunSync {
            token: token.to_string(),
            actor_id: actor_id.to_string(),
            input: input.clone(),
        });

        if let Some(err) = Self::scripted_error(&self.api_error) {
            return Err(err);
        }

        Ok(self.sync_response.lock().unwrap().clone())
    }

    async fn get_run(&self, _token: &str, run_id: &str) -> apify_client::Result<RunSnapshot> {
        self.record(ProviderCall::GetRun {
            run_id: run_id.to_string(),
        });

        let stall_after = *self.stall_after.lock().unwrap();
        if stall_after.is_some_and(|answered| self.status_calls() > answered) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = Self::scripted_error(&self.poll_error) {
            return Err(err);
        }

        let status = self.next_status();
        let dataset_id = (status == "SUCCEEDED").then(|| self.dataset_id.clone());
        let payload = json!({
            "data": {
                "id": run_id,
                "status": status,
                "defaultDatasetId": dataset_id,
            }
        });

        Ok(RunSnapshot {
            run: RunData {
                id: run_id.to_string(),
                status,
                default_dataset_id: dataset_id,
                started_at: None,
                finished_at: None,
            },
            payload,
        })
    }

    async fn get_dataset_items(
        &self,
        _token: &str,
        dataset_id: &str,
    ) -> apify_client::Result<Vec<Value>> {
        self.record(ProviderCall::GetDatasetItems {
            dataset_id: dataset_id.to_string(),
        });

        if let Some(err) = Self::scripted_error(&self.dataset_error) {
            return Err(err);
        }
        Ok(self.dataset_items.lock().unwrap().clone())
    }
}

// =============================================================================
// In-memory Snapshot Stores
// =============================================================================

/// Snapshot store backed by a Vec
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<Vec<ResultSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseSnapshotStore for MemorySnapshotStore {
    async fn insert(&self, snapshot: &ResultSnapshot) -> Result<()> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<ResultSnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Snapshot store whose every call fails, as if the database went away
#[derive(Default)]
pub struct FailingSnapshotStore;

#[async_trait]
impl BaseSnapshotStore for FailingSnapshotStore {
    async fn insert(&self, _snapshot: &ResultSnapshot) -> Result<()> {
        Err(anyhow!("connection refused"))
    }

    async fn latest(&self) -> Result<Option<ResultSnapshot>> {
        Err(anyhow!("connection refused"))
    }

    async fn ping(&self) -> Result<()> {
        Err(anyhow!("connection refused"))
    }
}
