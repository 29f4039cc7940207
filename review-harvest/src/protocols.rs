//! Protocol traits for harvester collaborators.
//!
//! The HTTP transport sits behind [`Fetcher`] so discovery can run against
//! `reqwest` in production and an in-memory double in tests. Observability
//! hooks go through [`HarvestObserver`].

use async_trait::async_trait;

use crate::errors::HarvestError;

/// Result of a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub text: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// Creates a 200 result for `url` with the given body.
    #[must_use]
    pub fn ok(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            text: text.into(),
            final_url: url.into(),
            duration_ms: 0.0,
        }
    }

    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Protocol for HTTP fetching.
///
/// Implementations report non-2xx responses as [`HarvestError::HttpStatus`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL and returns its body.
    async fn fetch(&self, url: &str) -> Result<FetchResult, HarvestError>;
}

/// Observability callbacks for a harvest.
pub trait HarvestObserver: Send + Sync {
    /// Called before a page request is issued.
    fn on_page_start(&self, url: &str, offset: u64);

    /// Called when a page was fetched and extracted.
    fn on_page_complete(&self, url: &str, offset: u64, records: usize, duration_ms: f64);

    /// Called when a page request failed.
    fn on_page_error(&self, url: &str, offset: u64, error: &HarvestError);

    /// Called at the end of each discovery attempt.
    fn on_attempt_complete(&self, attempt: usize, review_count: Option<u64>, records: usize);
}

/// No-op implementation of [`HarvestObserver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHarvestObserver;

impl HarvestObserver for NoOpHarvestObserver {
    fn on_page_start(&self, _url: &str, _offset: u64) {}
    fn on_page_complete(&self, _url: &str, _offset: u64, _records: usize, _duration_ms: f64) {}
    fn on_page_error(&self, _url: &str, _offset: u64, _error: &HarvestError) {}
    fn on_attempt_complete(&self, _attempt: usize, _review_count: Option<u64>, _records: usize) {}
}

/// Observer that reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHarvestObserver;

impl HarvestObserver for LoggingHarvestObserver {
    fn on_page_start(&self, url: &str, offset: u64) {
        tracing::debug!(url = %url, offset, "Fetching page");
    }

    fn on_page_complete(&self, url: &str, offset: u64, records: usize, duration_ms: f64) {
        tracing::debug!(url = %url, offset, records, duration_ms, "Page extracted");
    }

    fn on_page_error(&self, url: &str, offset: u64, error: &HarvestError) {
        tracing::warn!(url = %url, offset, error = %error, "Page fetch failed");
    }

    fn on_attempt_complete(&self, attempt: usize, review_count: Option<u64>, records: usize) {
        tracing::info!(attempt, review_count = ?review_count, records, "Discovery attempt finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_result_is_success() {
        let success = FetchResult::ok("https://example.com", "<html></html>");
        assert!(success.is_success());

        let not_found = FetchResult {
            status_code: 404,
            ..success.clone()
        };
        assert!(!not_found.is_success());

        let redirect = FetchResult {
            status_code: 301,
            ..success
        };
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_observers_do_not_panic() {
        let err = HarvestError::transport("https://example.com", "reset");
        for observer in [&NoOpHarvestObserver as &dyn HarvestObserver, &LoggingHarvestObserver] {
            observer.on_page_start("https://example.com", 0);
            observer.on_page_complete("https://example.com", 0, 10, 12.5);
            observer.on_page_error("https://example.com", 10, &err);
            observer.on_attempt_complete(1, Some(23), 0);
        }
    }
}
