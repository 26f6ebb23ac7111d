//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor runs,
//! synchronous runs, reading run status, and fetching dataset results.
//! Polling policy lives with the caller; this crate only speaks HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::{ApifyClient, CommentsScraperInput};
//!
//! let client = ApifyClient::new("your-api-token".into());
//! let input = CommentsScraperInput::new("https://facebook.com/post/1", 50, false, "RANKED_UNFILTERED");
//!
//! let run = client.start_run("apify~facebook-comments-scraper", &input).await?;
//! let snapshot = client.get_run(&run.id).await?;
//! println!("{}", snapshot.run.status);
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    detect_output, CommentsScraperInput, RunData, RunOutput, RunSnapshot, RunStatus, StartUrl,
};

use serde::Serialize;
use serde_json::Value;
use types::ApiResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

#[derive(Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (trailing slash is ignored).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Same connection pool and base URL, different credential.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            token: token.to_string(),
            base_url: self.base_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let body = Self::checked_json(resp).await?;
        let api_resp: ApiResponse<RunData> =
            serde_json::from_value(body).map_err(|e| ApifyError::Parse(e.to_string()))?;
        Ok(api_resp.data)
    }

    /// Run an actor and wait for its dataset items in a single call.
    ///
    /// The body is returned untouched; use [`detect_output`] to locate the items.
    pub async fn run_sync<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<Value> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items",
            self.base_url, actor_id
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        Self::checked_json(resp).await
    }

    /// Read the current state of a run. Does not wait.
    pub async fn get_run(&self, run_id: &str) -> Result<RunSnapshot> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let payload = Self::checked_json(resp).await?;
        let api_resp: ApiResponse<RunData> = serde_json::from_value(payload.clone())
            .map_err(|e| ApifyError::Parse(e.to_string()))?;

        Ok(RunSnapshot {
            run: api_resp.data,
            payload,
        })
    }

    /// Fetch dataset items from a completed run.
    ///
    /// The body normally is the item array itself; enveloped bodies are
    /// unwrapped with [`detect_output`] and anything else yields no items.
    pub async fn get_dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/datasets/{}/items?format=json&clean=true",
            self.base_url, dataset_id
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body = Self::checked_json(resp).await?;
        let items = dataset_items(dataset_id, body);
        tracing::debug!(dataset_id, count = items.len(), "Fetched dataset items");
        Ok(items)
    }

    /// Turn a non-2xx response into `ApifyError::Api` carrying the raw body,
    /// otherwise parse the body as JSON.
    async fn checked_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Apify returned an error status");
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApifyError::Parse(e.to_string()))
    }
}

fn dataset_items(dataset_id: &str, body: Value) -> Vec<Value> {
    match detect_output(body) {
        RunOutput::Items(items) => items,
        RunOutput::Dataset(_) | RunOutput::Empty => {
            tracing::warn!(dataset_id, "Dataset body held no item array");
            Vec::new()
        }
    }
}
