//! Discovery: count probe, paginated fan-out and the bounded retry loop.
//!
//! The site sometimes serves a well-formed page with none of the expected
//! review markup. An attempt that accumulates zero records is therefore
//! retried after a fixed delay until the attempt budget runs out, at which
//! point discovery returns an empty result. A listing with genuinely zero
//! reviews looks the same and also exhausts the budget.

use scraper::Html;

use crate::dedupe::dedupe;
use crate::extract::extract_review_count;
use crate::config::DEFAULT_MAX_PAGES;
use crate::models::{CanonicalUrl, HarvestStats, ReviewRecord};
use crate::pagination::{page_count, plan_offsets, Accumulator, PagePlanner};
use crate::protocols::{Fetcher, HarvestObserver};
use crate::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::selectors::CompiledSelectors;

/// Records and counters produced by [`DiscoveryDriver::discover`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Deduplicated records; empty when every attempt came back empty.
    pub records: Vec<ReviewRecord>,
    /// Attempt and page counters.
    pub stats: HarvestStats,
}

fn parse_count(markup: &str, selectors: &CompiledSelectors) -> Option<u64> {
    let document = Html::parse_document(markup);
    extract_review_count(&document, selectors)
}

/// Runs discovery attempts against one canonical URL.
pub struct DiscoveryDriver<'a> {
    fetcher: &'a dyn Fetcher,
    selectors: &'a CompiledSelectors,
    observer: &'a dyn HarvestObserver,
    retry: &'a RetryPolicy,
    planner: PagePlanner<'a>,
    page_size: u64,
    max_pages: u64,
}

impl<'a> DiscoveryDriver<'a> {
    /// Creates a driver; pages are fetched through `planner`.
    #[must_use]
    pub fn new(
        fetcher: &'a dyn Fetcher,
        selectors: &'a CompiledSelectors,
        observer: &'a dyn HarvestObserver,
        retry: &'a RetryPolicy,
        planner: PagePlanner<'a>,
        page_size: u64,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            observer,
            retry,
            planner,
            page_size,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Caps the pages fetched per attempt.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches the unpaginated page and reads the total review count.
    ///
    /// A failed fetch is reported and treated like an unreadable count.
    /// Returns the count and whether the fetch succeeded.
    pub async fn probe_count(&self, url: &CanonicalUrl) -> (Option<u64>, bool) {
        match self.fetcher.fetch(url.as_str()).await {
            Ok(page) => (parse_count(&page.text, self.selectors), true),
            Err(e) => {
                self.observer.on_page_error(url.as_str(), 0, &e);
                (None, false)
            }
        }
    }

    /// Runs attempts until one accumulates records or the budget is spent.
    pub async fn discover(&self, url: &CanonicalUrl) -> DiscoveryOutcome {
        let mut state = RetryState::new();
        let mut stats = HarvestStats::default();

        loop {
            stats.attempts += 1;

            let (count, probe_ok) = self.probe_count(url).await;
            stats.record_page(probe_ok);
            stats.review_count = count;
            match count {
                None => {
                    tracing::debug!(url = %url, "Review count unavailable, fetching first page only");
                }
                Some(total) if page_count(total, self.page_size) > self.max_pages => {
                    tracing::warn!(
                        url = %url,
                        review_count = total,
                        max_pages = self.max_pages,
                        "Review count exceeds page cap, truncating"
                    );
                }
                Some(_) => {}
            }

            let offsets = plan_offsets(count, self.page_size, self.max_pages);
            let accumulator = Accumulator::new();
            let tally = self.planner.plan(url, offsets, &accumulator).await;
            stats.pages_requested += tally.requested;
            stats.pages_failed += tally.failed;

            self.observer
                .on_attempt_complete(stats.attempts, count, accumulator.len());

            if !accumulator.is_empty() {
                let raw = accumulator.into_records();
                stats.raw_records = raw.len();
                let records = dedupe(raw);
                stats.unique_records = records.len();
                return DiscoveryOutcome { records, stats };
            }

            let (delay, decision) = state.record_empty(self.retry);
            tokio::time::sleep(delay).await;

            match decision {
                RetryDecision::Retry => {
                    tracing::debug!(
                        attempt = state.attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        url = %url,
                        "No reviews found, retrying"
                    );
                }
                RetryDecision::GiveUp => {
                    tracing::warn!(
                        attempts = state.attempt,
                        url = %url,
                        "No reviews found after exhausting attempts"
                    );
                    return DiscoveryOutcome {
                        records: Vec::new(),
                        stats,
                    };
                }
            }
        }
    }
}
