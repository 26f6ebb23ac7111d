use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single-element entry of the actor's `startUrls` list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StartUrl {
    pub url: String,
}

/// Input for the Facebook comments scraper actor.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentsScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "includeNestedComments")]
    pub include_nested_comments: bool,
    #[serde(rename = "viewOption")]
    pub view_option: String,
}

impl CommentsScraperInput {
    pub fn new(url: &str, results_limit: u32, include_nested: bool, view_option: &str) -> Self {
        Self {
            start_urls: vec![StartUrl {
                url: url.to_string(),
            }],
            results_limit,
            include_nested_comments: include_nested,
            view_option: view_option.to_string(),
        }
    }
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    /// Only meaningful once the run has SUCCEEDED.
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: Option<String>,
    #[serde(rename = "startedAt", default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    pub fn run_status(&self) -> RunStatus {
        RunStatus::parse(&self.status)
    }
}

/// A run status read together with the raw response it came from.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub run: RunData,
    pub payload: Value,
}

/// Lifecycle status of an actor run.
///
/// Apify reports a few transitional states besides RUNNING (`READY`,
/// `TIMING-OUT`, `ABORTING`); those keep the run in the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    Unknown(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "TIMING-OUT" => Self::TimingOut,
            "TIMED-OUT" => Self::TimedOut,
            "ABORTING" => Self::Aborting,
            "ABORTED" => Self::Aborted,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Whether polling should stop. Unknown statuses are terminal so a
    /// misbehaving provider cannot keep us looping on garbage.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Ready | Self::Running | Self::TimingOut | Self::Aborting
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimingOut => "TIMING-OUT",
            Self::TimedOut => "TIMED-OUT",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the items of a finished run live, as detected from a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutput {
    /// Items were inlined in the response.
    Items(Vec<Value>),
    /// Items must be fetched from this dataset.
    Dataset(String),
    /// Nothing usable in the response.
    Empty,
}

/// Envelope fields checked for an inline item array, in order.
const ITEM_ENVELOPES: [&str; 4] = ["items", "output", "result", "data"];

/// Detect the item collection in a provider response.
///
/// Tries a top-level array, then the `items`, `output`, `result` and `data`
/// envelopes, then a dataset handle. The first match wins; a body matching
/// none of these is `RunOutput::Empty`.
pub fn detect_output(body: Value) -> RunOutput {
    let mut body = match body {
        Value::Array(items) => return RunOutput::Items(items),
        Value::Object(map) => map,
        _ => return RunOutput::Empty,
    };

    for key in ITEM_ENVELOPES {
        if matches!(body.get(key), Some(Value::Array(_))) {
            if let Some(Value::Array(items)) = body.remove(key) {
                return RunOutput::Items(items);
            }
        }
    }

    match dataset_handle(&body) {
        Some(dataset_id) => RunOutput::Dataset(dataset_id),
        None => RunOutput::Empty,
    }
}

/// Find a dataset id either at the top level or inside the `data` envelope.
fn dataset_handle(body: &serde_json::Map<String, Value>) -> Option<String> {
    let candidates = [
        body.get("defaultDatasetId"),
        body.get("datasetId"),
        body.get("data").and_then(|d| d.get("defaultDatasetId")),
        body.get("data").and_then(|d| d.get("datasetId")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}
