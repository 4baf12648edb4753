//! Batch pipeline: URL list → fetch → assemble → sink.
//!
//! Pages are independent. Each one is fetched and assembled on its own task,
//! bounded by a semaphore; a failed page is recorded and the batch moves on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use url::Url;

use qaharvest_shared::{AppConfig, DEFAULT_TOPIC, HarvestError, PageRecord, Result};
use qaharvest_source::PageSource;
use qaharvest_storage::RecordSink;

use crate::assembler::{AssembledPage, FragmentError, PageLayout, assemble_page};

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Topic label stamped on every record.
    pub topic: String,
    /// Maximum pages in flight at once.
    pub concurrency: usize,
    /// Pause before each fetch, per task.
    pub rate_limit_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            concurrency: 4,
            rate_limit_ms: 0,
        }
    }
}

impl From<&AppConfig> for BatchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            topic: config.defaults.topic.clone(),
            concurrency: config.defaults.concurrency as usize,
            rate_limit_ms: config.fetch.rate_limit_ms,
        }
    }
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Assembled records, in input order.
    pub records: Vec<PageRecord>,
    /// `(url, error message)` for every page that produced no record.
    pub failures: Vec<(String, String)>,
    /// Tags and answers left out across all pages.
    pub fragments_skipped: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// A page has been queued for fetching.
    fn page_started(&self, url: &str, current: usize, total: usize);
    /// A page produced a record.
    fn page_done(&self, url: &str, record: &PageRecord);
    /// A page was dropped.
    fn page_failed(&self, url: &str, error: &str);
    /// Part of a page was dropped.
    fn fragment_skipped(&self, url: &str, fragment: &FragmentError);
    /// The batch finished.
    fn done(&self, result: &BatchResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn page_started(&self, _url: &str, _current: usize, _total: usize) {}
    fn page_done(&self, _url: &str, _record: &PageRecord) {}
    fn page_failed(&self, _url: &str, _error: &str) {}
    fn fragment_skipped(&self, _url: &str, _fragment: &FragmentError) {}
    fn done(&self, _result: &BatchResult) {}
}

/// Fetch and assemble every URL.
///
/// Never fails as a whole: page-level errors end up in
/// [`BatchResult::failures`].
#[instrument(skip_all, fields(pages = urls.len(), source = source.name()))]
pub async fn run_batch<S>(
    urls: &[Url],
    source: Arc<S>,
    layout: Arc<PageLayout>,
    config: &BatchConfig,
    progress: &dyn ProgressReporter,
) -> BatchResult
where
    S: PageSource + 'static,
{
    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let total = urls.len();

    info!(
        total,
        concurrency = config.concurrency,
        rate_limit_ms = config.rate_limit_ms,
        "starting batch"
    );

    let mut handles = Vec::with_capacity(total);
    for (i, url) in urls.iter().enumerate() {
        progress.page_started(url.as_str(), i + 1, total);

        let url = url.clone();
        let source = source.clone();
        let layout = layout.clone();
        let sem = semaphore.clone();
        let topic = config.topic.clone();
        let rate_limit = config.rate_limit_ms;

        handles.push(tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return Err(HarvestError::validation("batch semaphore closed"));
            };

            if rate_limit > 0 {
                tokio::time::sleep(Duration::from_millis(rate_limit)).await;
            }

            let page = source.fetch(&url).await?;
            // The parsed document is not Send; it lives and dies inside this call.
            assemble_page(&page.url, &page.html, &layout, &topic)
        }));
    }

    let mut result = BatchResult::default();
    for (url, handle) in urls.iter().zip(handles) {
        let outcome = handle
            .await
            .map_err(|e| HarvestError::validation(format!("page task failed: {e}")))
            .and_then(|r| r);

        match outcome {
            Ok(AssembledPage { record, skipped }) => {
                for fragment in &skipped {
                    progress.fragment_skipped(url.as_str(), fragment);
                }
                result.fragments_skipped += skipped.len();
                progress.page_done(url.as_str(), &record);
                result.records.push(record);
            }
            Err(e) => {
                if e.is_page_level() {
                    warn!(%url, error = %e, "page failed, continuing");
                } else {
                    error!(%url, error = %e, "page failed, continuing");
                }
                let message = e.to_string();
                progress.page_failed(url.as_str(), &message);
                result.failures.push((url.to_string(), message));
            }
        }
    }

    result.elapsed = start.elapsed();
    info!(
        records = result.records.len(),
        failures = result.failures.len(),
        fragments_skipped = result.fragments_skipped,
        duration_ms = result.elapsed.as_millis(),
        "batch completed"
    );

    progress.done(&result);
    result
}

/// Run a batch and hand all records to `sink` in one write.
pub async fn harvest<S, K>(
    urls: &[Url],
    source: Arc<S>,
    layout: Arc<PageLayout>,
    config: &BatchConfig,
    sink: &mut K,
    progress: &dyn ProgressReporter,
) -> Result<BatchResult>
where
    S: PageSource + 'static,
    K: RecordSink + ?Sized,
{
    let result = run_batch(urls, source, layout, config, progress).await;
    sink.write_batch(&result.records)?;
    Ok(result)
}
