//! Job Driver: runs one scrape on the provider and returns its raw items.
//!
//! Holds no state between invocations. Nothing here retries; transport and
//! HTTP failures go straight back to the caller.

use apify_client::{detect_output, CommentsScraperInput, RunOutput, RunSnapshot, RunStatus};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{ScrapeError, ScrapeRequest};
use crate::kernel::BaseScrapeProvider;

/// How the provider is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One blocking call returns the finished result set.
    Sync,
    /// Submit, poll the run on a fixed interval, then fetch its dataset.
    Async,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!("unknown run mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub actor_id: String,
    pub mode: RunMode,
    pub poll_interval: Duration,
    /// `None` polls for as long as the provider says RUNNING.
    pub poll_deadline: Option<Duration>,
}

pub struct JobDriver {
    provider: Arc<dyn BaseScrapeProvider>,
    options: DriverOptions,
}

impl JobDriver {
    pub fn new(provider: Arc<dyn BaseScrapeProvider>, options: DriverOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Run the job described by `request` to completion.
    pub async fn run(&self, request: &ScrapeRequest) -> Result<Vec<Value>, ScrapeError> {
        let input = request.to_actor_input();
        let token = request.credential_token();

        info!(
            target_url = %request.target_url(),
            limit = request.result_limit(),
            mode = ?self.options.mode,
            "Starting remote scrape"
        );

        let items = match self.options.mode {
            RunMode::Sync => self.run_sync(token, &input).await?,
            RunMode::Async => self.run_async(token, &input).await?,
        };

        info!(count = items.len(), "Remote scrape returned items");
        Ok(items)
    }

    async fn run_sync(
        &self,
        token: &str,
        input: &CommentsScraperInput,
    ) -> Result<Vec<Value>, ScrapeError> {
        let body = self
            .provider
            .run_sync(token, &self.options.actor_id, input)
            .await?;

        self.resolve_output(token, detect_output(body)).await
    }

    async fn run_async(
        &self,
        token: &str,
        input: &CommentsScraperInput,
    ) -> Result<Vec<Value>, ScrapeError> {
        let run = self
            .provider
            .start_run(token, &self.options.actor_id, input)
            .await?;
        info!(run_id = %run.id, "Provider run started, polling for completion");

        let finished = self.wait_for_run(token, &run.id).await?;

        match finished.run.default_dataset_id.as_deref() {
            Some(dataset_id) if !dataset_id.is_empty() => {
                info!(run_id = %finished.run.id, dataset_id, "Run succeeded, fetching dataset");
                Ok(self.provider.get_dataset_items(token, dataset_id).await?)
            }
            _ => {
                // No dataset reference on the run itself; look at the payload.
                self.resolve_output(token, detect_output(finished.payload))
                    .await
            }
        }
    }

    /// Poll the run every `poll_interval` until it reaches a terminal status.
    ///
    /// Only SUCCEEDED returns `Ok`. Any other terminal status is reported
    /// with the payload it arrived in. The deadline bounds the whole wait,
    /// including a status call that never answers.
    async fn wait_for_run(&self, token: &str, run_id: &str) -> Result<RunSnapshot, ScrapeError> {
        let Some(deadline) = self.options.poll_deadline else {
            return self.poll_until_terminal(token, run_id).await;
        };

        match tokio::time::timeout(deadline, self.poll_until_terminal(token, run_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(run_id, waited = ?deadline, "Gave up waiting for remote run");
                Err(ScrapeError::PollTimeout {
                    run_id: run_id.to_string(),
                    waited: deadline,
                })
            }
        }
    }

    async fn poll_until_terminal(
        &self,
        token: &str,
        run_id: &str,
    ) -> Result<RunSnapshot, ScrapeError> {
        loop {
            let snapshot = self.provider.get_run(token, run_id).await?;
            let status = snapshot.run.run_status();

            match status {
                RunStatus::Succeeded => return Ok(snapshot),
                status if status.is_terminal() => {
                    warn!(run_id, status = %status, "Remote run did not succeed");
                    return Err(ScrapeError::RemoteJobFailed {
                        status: status.to_string(),
                        payload: snapshot.payload,
                    });
                }
                status => {
                    debug!(run_id, status = %status, "Run still in progress");
                    tokio::time::sleep(self.options.poll_interval).await;
                }
            }
        }
    }

    async fn resolve_output(
        &self,
        token: &str,
        output: RunOutput,
    ) -> Result<Vec<Value>, ScrapeError> {
        match output {
            RunOutput::Items(items) => Ok(items),
            RunOutput::Dataset(dataset_id) => {
                debug!(dataset_id = %dataset_id, "Response referenced a dataset, fetching it");
                Ok(self.provider.get_dataset_items(token, &dataset_id).await?)
            }
            RunOutput::Empty => {
                warn!("Provider response had no recognisable items");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::scraping::{RequestDefaults, ScrapeInput};
    use crate::kernel::test_dependencies::{MockScrapeProvider, ProviderCall};
    use serde_json::json;
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(4);

    fn request() -> ScrapeRequest {
        ScrapeInput {
            target_url: Some("https://fb.example/post/1".to_string()),
            result_limit: Some(json!(10)),
            ..Default::default()
        }
        .validate(&RequestDefaults {
            credential_token: "tok".to_string(),
        })
        .unwrap()
    }

    fn driver(provider: Arc<MockScrapeProvider>, mode: RunMode, deadline: Option<Duration>) -> JobDriver {
        JobDriver::new(
            provider,
            DriverOptions {
                actor_id: "actor".to_string(),
                mode,
                poll_interval: INTERVAL,
                poll_deadline: deadline,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_succeeded_then_fetches_dataset() {
        let provider = Arc::new(
            MockScrapeProvider::new()
                .with_statuses(&["RUNNING", "RUNNING", "SUCCEEDED"])
                .with_dataset_items(vec![json!({"text": "hello"})]),
        );
        let driver = driver(provider.clone(), RunMode::Async, None);

        let started = Instant::now();
        let items = driver.run(&request()).await.unwrap();

        assert_eq!(items, vec![json!({"text": "hello"})]);
        assert_eq!(provider.status_calls(), 3);
        assert_eq!(started.elapsed(), INTERVAL * 2);
        assert_eq!(
            provider.calls().last(),
            Some(&ProviderCall::GetDatasetItems {
                dataset_id: provider.dataset_id().to_string()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_run_short_circuits() {
        let provider = Arc::new(MockScrapeProvider::new().with_statuses(&["RUNNING", "FAILED"]));
        let driver = driver(provider.clone(), RunMode::Async, None);

        let err = driver.run(&request()).await.unwrap_err();

        match err {
            ScrapeError::RemoteJobFailed { status, payload } => {
                assert_eq!(status, "FAILED");
                assert_eq!(payload["data"]["status"], "FAILED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.dataset_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_and_aborted_are_failures() {
        for terminal in ["TIMED-OUT", "ABORTED"] {
            let provider = Arc::new(MockScrapeProvider::new().with_statuses(&[terminal]));
            let err = driver(provider.clone(), RunMode::Async, None)
                .run(&request())
                .await
                .unwrap_err();

            assert!(matches!(err, ScrapeError::RemoteJobFailed { ref status, .. } if status == terminal));
            assert_eq!(provider.dataset_calls(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_turns_endless_running_into_poll_timeout() {
        let provider = Arc::new(MockScrapeProvider::new().with_statuses(&["RUNNING"]));
        let driver = driver(provider.clone(), RunMode::Async, Some(Duration::from_secs(10)));

        let err = driver.run(&request()).await.unwrap_err();

        assert!(matches!(err, ScrapeError::PollTimeout { ref run_id, .. } if run_id == "run-1"));
        // Checked at t=0, 4 and 8 seconds; the deadline cuts the next sleep short.
        assert_eq!(provider.status_calls(), 3);
        assert_eq!(provider.dataset_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_covers_a_status_call_that_never_answers() {
        let provider = Arc::new(
            MockScrapeProvider::new()
                .with_statuses(&["RUNNING"])
                .with_stalled_polls_after(1),
        );
        let driver = driver(provider.clone(), RunMode::Async, Some(Duration::from_secs(10)));

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(Duration::from_secs(3600), driver.run(&request())).await;

        let err = outcome.expect("driver gave up at its own deadline").unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::PollTimeout { waited, .. } if waited == Duration::from_secs(10)
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(provider.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn status_http_error_fails_without_retry() {
        let provider = Arc::new(
            MockScrapeProvider::new()
                .with_statuses(&["RUNNING"])
                .with_poll_error(500, "internal"),
        );
        let err = driver(provider.clone(), RunMode::Async, None)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::RemoteCallFailed { status: 500, ref body } if body == "internal"
        ));
        assert_eq!(provider.status_calls(), 1);
        assert_eq!(provider.dataset_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dataset_http_error_fails_without_retry() {
        let provider = Arc::new(
            MockScrapeProvider::new()
                .with_statuses(&["SUCCEEDED"])
                .with_dataset_error(404, "dataset not found"),
        );
        let err = driver(provider.clone(), RunMode::Async, None)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::RemoteCallFailed { status: 404, .. }));
        assert_eq!(provider.status_calls(), 1);
        assert_eq!(provider.dataset_calls(), 1);
    }

    #[tokio::test]
    async fn submit_failure_is_remote_call_failed() {
        let provider = Arc::new(MockScrapeProvider::new().with_api_error(401, "bad token"));
        let err = driver(provider.clone(), RunMode::Async, None)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::RemoteCallFailed { status: 401, ref body } if body == "bad token"
        ));
        assert_eq!(provider.status_calls(), 0);
    }

    #[tokio::test]
    async fn submit_sends_request_parameters() {
        let provider = Arc::new(MockScrapeProvider::new());
        driver(provider.clone(), RunMode::Async, None)
            .run(&request())
            .await
            .unwrap();

        match &provider.calls()[0] {
            ProviderCall::StartRun { token, actor_id, input } => {
                assert_eq!(token, "tok");
                assert_eq!(actor_id, "actor");
                assert_eq!(input.start_urls[0].url, "https://fb.example/post/1");
                assert_eq!(input.results_limit, 10);
            }
            other => panic!("unexpected first call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sync_mode_reads_inline_items() {
        let provider = Arc::new(
            MockScrapeProvider::new().with_sync_response(json!({"items": [{"text": "a"}]})),
        );
        let items = driver(provider.clone(), RunMode::Sync, None)
            .run(&request())
            .await
            .unwrap();

        assert_eq!(items, vec![json!({"text": "a"})]);
        assert_eq!(provider.status_calls(), 0);
        assert_eq!(provider.dataset_calls(), 0);
    }

    #[tokio::test]
    async fn sync_mode_follows_dataset_handle() {
        let provider = Arc::new(
            MockScrapeProvider::new()
                .with_sync_response(json!({"data": {"defaultDatasetId": "ds-42"}}))
                .with_dataset_items(vec![json!({"text": "from dataset"})]),
        );
        let items = driver(provider.clone(), RunMode::Sync, None)
            .run(&request())
            .await
            .unwrap();

        assert_eq!(items, vec![json!({"text": "from dataset"})]);
        assert_eq!(
            provider.calls().last(),
            Some(&ProviderCall::GetDatasetItems {
                dataset_id: "ds-42".to_string()
            })
        );
    }

    #[tokio::test]
    async fn sync_mode_unrecognised_body_is_empty_not_error() {
        let provider = Arc::new(MockScrapeProvider::new().with_sync_response(json!({"message": "ok"})));
        let items = driver(provider, RunMode::Sync, None)
            .run(&request())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn run_mode_parses() {
        assert_eq!("sync".parse::<RunMode>().unwrap(), RunMode::Sync);
        assert_eq!(" ASYNC ".parse::<RunMode>().unwrap(), RunMode::Async);
        assert!("later".parse::<RunMode>().is_err());
    }
}
