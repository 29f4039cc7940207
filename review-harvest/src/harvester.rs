//! Harvester: resolve → discover → deduplicate, with errors absorbed.

use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::HarvestConfig;
use crate::discovery::DiscoveryDriver;
use crate::errors::HarvestResult;
use crate::models::{CanonicalUrl, HarvestReport, ReviewRecord};
use crate::pagination::PagePlanner;
use crate::protocols::{Fetcher, HarvestObserver, LoggingHarvestObserver};
use crate::resolve::resolve;
use crate::selectors::CompiledSelectors;

/// Harvests reviews for arbitrary inputs with one configuration.
pub struct Harvester {
    config: HarvestConfig,
    selectors: CompiledSelectors,
    fetcher: Arc<dyn Fetcher>,
    observer: Arc<dyn HarvestObserver>,
}

impl std::fmt::Debug for Harvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Harvester {
    /// Validates the config and compiles its selectors.
    pub fn new(config: HarvestConfig, fetcher: Arc<dyn Fetcher>) -> HarvestResult<Self> {
        config.validate()?;
        let selectors = config.selectors.compile()?;
        Ok(Self {
            config,
            selectors,
            fetcher,
            observer: Arc::new(LoggingHarvestObserver),
        })
    }

    /// Creates a harvester backed by [`crate::HttpFetcher`].
    #[cfg(feature = "http")]
    pub fn with_http(config: HarvestConfig) -> HarvestResult<Self> {
        let fetcher = crate::fetch::HttpFetcher::new(config.fetch.clone())?;
        Self::new(config, Arc::new(fetcher))
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn HarvestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Resolves raw input against the configured site.
    #[must_use]
    pub fn resolve(&self, input: &str) -> CanonicalUrl {
        resolve(input, &self.config.site)
    }

    /// Harvests reviews for `input`.
    ///
    /// Never fails: an empty report means the listing was not found or
    /// stayed empty for every attempt.
    pub async fn harvest(&self, input: &str) -> HarvestReport {
        let mut report = HarvestReport::new(input);
        let span = tracing::info_span!("harvest", run_id = %report.run_id, input = %input);

        async {
            let started = Instant::now();
            let url = self.resolve(input);
            tracing::info!(url = %url, "Resolved input");

            let planner = PagePlanner::new(
                self.fetcher.as_ref(),
                &self.selectors,
                self.observer.as_ref(),
                &self.config.site.pagination_param,
            )
            .with_max_concurrent(self.config.max_concurrent);

            let driver = DiscoveryDriver::new(
                self.fetcher.as_ref(),
                &self.selectors,
                self.observer.as_ref(),
                &self.config.retry,
                planner,
                self.config.site.page_size,
            )
            .with_max_pages(self.config.site.max_pages);

            let outcome = driver.discover(&url).await;
            report.records = outcome.records;
            report.stats = outcome.stats;
            report.stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            report.canonical_url = Some(url);

            tracing::info!(
                records = report.records.len(),
                attempts = report.stats.attempts,
                pages = report.stats.pages_requested,
                failed = report.stats.pages_failed,
                elapsed_ms = report.stats.elapsed_ms,
                "Harvest finished"
            );
        }
        .instrument(span)
        .await;

        report
    }

    /// Harvests and returns only the deduplicated records.
    pub async fn harvest_reviews(&self, input: &str) -> Vec<ReviewRecord> {
        self.harvest(input).await.records
    }
}

/// Builds an HTTP harvester from `config` and runs it.
///
/// Fails only on setup errors (invalid config, selectors, or HTTP client).
#[cfg(feature = "http")]
pub async fn try_harvest(config: HarvestConfig, input: &str) -> HarvestResult<HarvestReport> {
    let harvester = Harvester::with_http(config)?;
    Ok(harvester.harvest(input).await)
}

/// Harvests reviews for `input` with the default configuration.
///
/// Never fails; setup errors are logged and yield an empty collection.
#[cfg(feature = "http")]
pub async fn harvest_reviews(input: &str) -> Vec<ReviewRecord> {
    harvest_reviews_with(HarvestConfig::default(), input).await
}

/// Like [`harvest_reviews`] with an explicit configuration.
#[cfg(feature = "http")]
pub async fn harvest_reviews_with(config: HarvestConfig, input: &str) -> Vec<ReviewRecord> {
    match try_harvest(config, input).await {
        Ok(report) => report.records,
        Err(e) => {
            tracing::error!(error = %e, input = %input, "Harvest setup failed");
            Vec::new()
        }
    }
}
