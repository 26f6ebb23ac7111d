//! Run a scrape end to end: validate, drive the provider, normalize, record.

use tracing::{info, warn};

use crate::domains::scraping::{normalize_items, ResultSnapshot, ScrapeError, ScrapeInput};
use crate::kernel::ServerDeps;

/// Execute one scrape for the operator.
///
/// The result always lands in the last-result cache. Persisting it is best
/// effort: a missing or failing store is logged and otherwise ignored.
pub async fn run_scrape(input: ScrapeInput, deps: &ServerDeps) -> Result<ResultSnapshot, ScrapeError> {
    let request = input.validate(&deps.request_defaults)?;

    let raw_items = deps.driver.run(&request).await?;
    let raw_count = raw_items.len();

    let (raw_items, records) = normalize_items(
        raw_items,
        request.result_limit() as usize,
        request.target_url(),
    );
    let snapshot = ResultSnapshot::new(request.summary(), raw_items, records);

    info!(
        snapshot_id = %snapshot.id,
        raw_count,
        kept = snapshot.records.len(),
        "Scrape normalized"
    );

    deps.last_result.store(snapshot.clone()).await;

    match &deps.snapshot_store {
        Some(store) => {
            if let Err(e) = store.insert(&snapshot).await {
                let err = ScrapeError::PersistenceUnavailable(format!("{e:#}"));
                warn!(error = %err, "Keeping result in memory only");
            }
        }
        None => warn!("No snapshot store configured, keeping result in memory only"),
    }

    Ok(snapshot)
}
