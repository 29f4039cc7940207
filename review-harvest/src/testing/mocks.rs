//! In-memory fetcher for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::HarvestError;
use crate::protocols::{FetchResult, Fetcher};

/// A fetcher that serves canned bodies keyed by exact URL.
///
/// Unknown URLs and URLs registered with [`StaticFetcher::with_failure`]
/// fail with a transport error. A URL registered with a sequence serves the
/// bodies in order and then keeps repeating the last one.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, VecDeque<String>>>,
    failures: HashSet<String>,
    transient: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for every request to `url`.
    #[must_use]
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_sequence(url, vec![body.into()])
    }

    /// Serves `bodies` in order for `url`, repeating the last.
    #[must_use]
    pub fn with_sequence(self, url: impl Into<String>, bodies: Vec<String>) -> Self {
        self.pages.lock().insert(url.into(), bodies.into());
        self
    }

    /// Makes every request to `url` fail.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failures.insert(url.into());
        self
    }

    /// Makes the next `times` requests to `url` fail before serving normally.
    #[must_use]
    pub fn with_transient_failures(self, url: impl Into<String>, times: usize) -> Self {
        self.transient.lock().insert(url.into(), times);
        self
    }

    /// Returns the number of fetches made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns every requested URL in call order.
    #[must_use]
    pub fn recorded_urls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Returns how often `url` was requested.
    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|u| *u == url).count()
    }

    fn take_transient(&self, url: &str) -> bool {
        match self.transient.lock().get_mut(url) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn next_body(&self, url: &str) -> Option<String> {
        let mut pages = self.pages.lock();
        let bodies = pages.get_mut(url)?;
        if bodies.len() > 1 {
            bodies.pop_front()
        } else {
            bodies.front().cloned()
        }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, HarvestError> {
        self.calls.lock().push(url.to_string());

        if self.failures.contains(url) || self.take_transient(url) {
            return Err(HarvestError::transport(url, "simulated failure"));
        }

        self.next_body(url)
            .map(|body| FetchResult::ok(url, body))
            .ok_or_else(|| HarvestError::transport(url, "no canned response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_and_records() {
        let fetcher = StaticFetcher::new()
            .with_page("https://a.test/", "hello")
            .with_failure("https://a.test/down");

        let page = fetcher.fetch("https://a.test/").await.unwrap();
        assert_eq!(page.text, "hello");
        assert!(fetcher.fetch("https://a.test/down").await.is_err());
        assert!(fetcher.fetch("https://a.test/missing").await.is_err());

        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(fetcher.calls_to("https://a.test/"), 1);
    }

    #[tokio::test]
    async fn test_sequence_repeats_last() {
        let fetcher = StaticFetcher::new()
            .with_sequence("u", vec!["one".to_string(), "two".to_string()]);

        assert_eq!(fetcher.fetch("u").await.unwrap().text, "one");
        assert_eq!(fetcher.fetch("u").await.unwrap().text, "two");
        assert_eq!(fetcher.fetch("u").await.unwrap().text, "two");
    }

    #[tokio::test]
    async fn test_transient_failures_then_success() {
        let fetcher = StaticFetcher::new()
            .with_page("u", "ok")
            .with_transient_failures("u", 2);

        assert!(fetcher.fetch("u").await.is_err());
        assert!(fetcher.fetch("u").await.is_err());
        assert_eq!(fetcher.fetch("u").await.unwrap().text, "ok");
    }
}
