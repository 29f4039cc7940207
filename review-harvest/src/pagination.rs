//! Pagination planning and concurrent page fetching.
//!
//! One discovery attempt fans out a page fetch per offset on the calling
//! task and waits for all of them. Each fetch appends its records to the
//! attempt's [`Accumulator`]. A failed page contributes nothing and does not
//! disturb its siblings.

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use scraper::Html;
use std::time::Instant;

use crate::errors::HarvestError;
use crate::extract::extract_records;
use crate::models::{CanonicalUrl, ReviewRecord};
use crate::protocols::{Fetcher, HarvestObserver};
use crate::selectors::CompiledSelectors;

/// Append-only record collection shared by the page fetches of one attempt.
///
/// Each page's records are appended under a single lock, so batches from
/// different pages never interleave.
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Mutex<Vec<ReviewRecord>>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one page's records.
    pub fn append(&self, batch: Vec<ReviewRecord>) {
        if batch.is_empty() {
            return;
        }
        self.records.lock().extend(batch);
    }

    /// Number of records accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Consumes the accumulator, returning records in append order.
    #[must_use]
    pub fn into_records(self) -> Vec<ReviewRecord> {
        self.records.into_inner()
    }
}

/// Number of pages covering `count` reviews: offsets `0, page_size, ...`
/// while below `count + page_size`, so a partial last page is included.
#[must_use]
pub fn page_count(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1)).saturating_add(1)
}

/// Offsets to fetch for a listing with `count` reviews, at most `max_pages`.
///
/// Offsets are produced lazily. An unknown count fetches only page 0.
pub fn plan_offsets(
    count: Option<u64>,
    page_size: u64,
    max_pages: u64,
) -> impl Iterator<Item = u64> + Clone {
    let pages = count.map_or(1, |c| page_count(c, page_size)).min(max_pages.max(1));
    (0..pages).map_while(move |page| page.checked_mul(page_size))
}

/// URL for the page at `offset`.
///
/// Offset 0 is the base URL itself. Otherwise the offset parameter is
/// appended with `&` when the base already has a query string, `?` if not.
/// A `#fragment` stays at the end.
#[must_use]
pub fn page_url(base: &CanonicalUrl, offset: u64, param: &str) -> String {
    if offset == 0 {
        return base.as_str().to_string();
    }
    let (head, fragment) = base.split_fragment();
    let sep = if base.has_query() { '&' } else { '?' };
    format!("{head}{sep}{param}={offset}{fragment}")
}

/// Parses markup and extracts its records.
///
/// Kept synchronous so the parsed document never lives across an await.
pub(crate) fn parse_records(markup: &str, selectors: &CompiledSelectors) -> Vec<ReviewRecord> {
    let document = Html::parse_document(markup);
    extract_records(&document, selectors)
}

/// Request counters for one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTally {
    /// Pages requested.
    pub requested: usize,
    /// Pages whose fetch failed.
    pub failed: usize,
}

/// Fetches listing pages into an [`Accumulator`].
pub struct PagePlanner<'a> {
    fetcher: &'a dyn Fetcher,
    selectors: &'a CompiledSelectors,
    observer: &'a dyn HarvestObserver,
    pagination_param: &'a str,
    max_concurrent: Option<usize>,
}

impl<'a> PagePlanner<'a> {
    /// Creates a planner.
    #[must_use]
    pub fn new(
        fetcher: &'a dyn Fetcher,
        selectors: &'a CompiledSelectors,
        observer: &'a dyn HarvestObserver,
        pagination_param: &'a str,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            observer,
            pagination_param,
            max_concurrent: None,
        }
    }

    /// Bounds the number of fetches in flight.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: Option<usize>) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Fetches one page and appends its records.
    ///
    /// Returns the number of records appended.
    pub async fn fetch_page(
        &self,
        base: &CanonicalUrl,
        offset: u64,
        accumulator: &Accumulator,
    ) -> Result<usize, HarvestError> {
        let url = page_url(base, offset, self.pagination_param);
        self.observer.on_page_start(&url, offset);
        let started = Instant::now();

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                self.observer.on_page_error(&url, offset, &e);
                return Err(e);
            }
        };

        let records = parse_records(&page.text, self.selectors);
        let count = records.len();
        accumulator.append(records);

        self.observer.on_page_complete(
            &url,
            offset,
            count,
            started.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(count)
    }

    /// Fetches every offset concurrently and waits for all of them.
    ///
    /// `offsets` is consumed lazily; at most `max_concurrent` fetches are
    /// in flight, or every offset at once when unbounded.
    pub async fn plan<I>(
        &self,
        base: &CanonicalUrl,
        offsets: I,
        accumulator: &Accumulator,
    ) -> PageTally
    where
        I: IntoIterator<Item = u64>,
    {
        let offsets = offsets.into_iter();
        let limit = self
            .max_concurrent
            .or_else(|| offsets.size_hint().1)
            .unwrap_or(1)
            .max(1);

        let outcomes: Vec<Result<usize, HarvestError>> = stream::iter(offsets)
            .map(|offset| self.fetch_page(base, offset, accumulator))
            .buffer_unordered(limit)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            tracing::debug!(failed, total = outcomes.len(), url = %base, "Some pages failed");
        }

        PageTally {
            requested: outcomes.len(),
            failed,
        }
    }
}
