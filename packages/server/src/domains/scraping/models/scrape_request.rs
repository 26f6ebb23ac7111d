//! Scrape request as submitted by the operator, and its validated form.

use apify_client::CommentsScraperInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::domains::scraping::ScrapeError;

pub const DEFAULT_RESULT_LIMIT: u32 = 50;
pub const MAX_RESULT_LIMIT: u32 = 5000;
pub const DEFAULT_VIEW_MODE: &str = "RANKED_UNFILTERED";

/// Raw request body for `POST /api/scrape`.
///
/// Accepts both the current field names and the ones older UI builds sent
/// (`facebookUrl`, `resultsLimit`, `commentsCount`, `apifyToken`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeInput {
    #[serde(default, alias = "facebookUrl")]
    pub target_url: Option<String>,
    /// Kept loose: the UI sends numbers, form posts send strings.
    #[serde(default, alias = "resultsLimit", alias = "commentsCount")]
    pub result_limit: Option<Value>,
    #[serde(default, alias = "apifyToken")]
    pub credential_token: Option<String>,
    #[serde(default, alias = "includeNestedComments")]
    pub include_nested: Option<bool>,
    #[serde(default, alias = "viewOption")]
    pub view_mode: Option<String>,
}

/// Process-wide values a request falls back to.
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    pub credential_token: String,
}

/// A request that passed validation. Only [`ScrapeInput::validate`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    target_url: String,
    result_limit: u32,
    credential_token: String,
    include_nested: bool,
    view_mode: String,
}

/// The parts of a request worth keeping with its results. Carries no credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub target_url: String,
    pub result_limit: u32,
    pub include_nested: bool,
    pub view_mode: String,
}

impl ScrapeInput {
    pub fn validate(self, defaults: &RequestDefaults) -> Result<ScrapeRequest, ScrapeError> {
        let target_url = validate_url(self.target_url.as_deref().unwrap_or(""))?;
        let result_limit = parse_limit(self.result_limit.as_ref())?;

        let credential_token = match self.credential_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => defaults.credential_token.trim().to_string(),
        };
        if credential_token.is_empty() {
            return Err(ScrapeError::Validation(
                "no provider token supplied and no default token configured".to_string(),
            ));
        }

        let view_mode = self
            .view_mode
            .map(|mode| mode.trim().to_string())
            .filter(|mode| !mode.is_empty())
            .unwrap_or_else(|| DEFAULT_VIEW_MODE.to_string());

        Ok(ScrapeRequest {
            target_url,
            result_limit,
            credential_token,
            include_nested: self.include_nested.unwrap_or(false),
            view_mode,
        })
    }
}

impl ScrapeRequest {
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn result_limit(&self) -> u32 {
        self.result_limit
    }

    pub fn credential_token(&self) -> &str {
        &self.credential_token
    }

    pub fn include_nested(&self) -> bool {
        self.include_nested
    }

    pub fn view_mode(&self) -> &str {
        &self.view_mode
    }

    /// Actor input: the target wrapped as a single-element start list.
    pub fn to_actor_input(&self) -> CommentsScraperInput {
        CommentsScraperInput::new(
            &self.target_url,
            self.result_limit,
            self.include_nested,
            &self.view_mode,
        )
    }

    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            target_url: self.target_url.clone(),
            result_limit: self.result_limit,
            include_nested: self.include_nested,
            view_mode: self.view_mode.clone(),
        }
    }
}

fn validate_url(raw: &str) -> Result<String, ScrapeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScrapeError::Validation("targetUrl is required".to_string()));
    }

    let parsed = Url::parse(raw)
        .map_err(|e| ScrapeError::Validation(format!("targetUrl is not a valid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::Validation(
            "targetUrl must use http or https".to_string(),
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::Validation("targetUrl must have a host".to_string()));
    }

    Ok(raw.to_string())
}

/// Absent or non-numeric limits fall back to the default; numeric limits
/// outside `1..=MAX_RESULT_LIMIT` are rejected.
fn parse_limit(raw: Option<&Value>) -> Result<u32, ScrapeError> {
    let number = match raw {
        None | Some(Value::Null) => return Ok(DEFAULT_RESULT_LIMIT),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    let Some(number) = number.filter(|n| n.is_finite()) else {
        return Ok(DEFAULT_RESULT_LIMIT);
    };

    if number.fract() != 0.0 || number < 1.0 || number > f64::from(MAX_RESULT_LIMIT) {
        return Err(ScrapeError::Validation(format!(
            "resultLimit must be a whole number between 1 and {MAX_RESULT_LIMIT}, got {number}"
        )));
    }

    Ok(number as u32)
}
