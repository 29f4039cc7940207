//! Data models for harvested reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reviewer name used by the site for unrendered template rows.
pub const SENTINEL_NAME: &str = "Username";

/// A single review scraped from a listing page.
///
/// Records are identified by `name`; see [`crate::dedupe`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Reviewer display name.
    pub name: String,
    /// Reviewer location.
    #[serde(default)]
    pub location: String,
    /// Human-readable rating label, e.g. "5 star rating".
    #[serde(default)]
    pub rating: String,
    /// Review body.
    #[serde(default)]
    pub text: String,
    /// Review date as displayed, when the markup carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ReviewRecord {
    /// Creates a record with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the rating label.
    #[must_use]
    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    /// Sets the review text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the date.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Whether the record names a real reviewer.
    ///
    /// Empty names and the [`SENTINEL_NAME`] placeholder are rejected.
    #[must_use]
    pub fn has_reviewer(&self) -> bool {
        !self.name.is_empty() && self.name != SENTINEL_NAME
    }
}

/// A resolved, fully-qualified listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Wraps an already-resolved URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the URL already carries a query string.
    ///
    /// A `?` inside the `#fragment` does not count.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.split_fragment().0.contains('?')
    }

    /// Splits the URL into the part sent to the server and its fragment,
    /// `#` included.
    #[must_use]
    pub fn split_fragment(&self) -> (&str, &str) {
        self.0.find('#').map_or((self.0.as_str(), ""), |idx| self.0.split_at(idx))
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Counters for one harvest invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestStats {
    /// Discovery attempts started.
    pub attempts: usize,
    /// Page requests issued, including the count probe of each attempt.
    pub pages_requested: usize,
    /// Page requests that failed.
    pub pages_failed: usize,
    /// Records accumulated by the final attempt, before deduplication.
    pub raw_records: usize,
    /// Records returned after deduplication.
    pub unique_records: usize,
    /// Review count read from the summary on the final attempt.
    pub review_count: Option<u64>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

impl HarvestStats {
    /// Records a page request outcome.
    pub fn record_page(&mut self, ok: bool) {
        self.pages_requested += 1;
        if !ok {
            self.pages_failed += 1;
        }
    }

    /// Share of requests that failed, in percent.
    #[must_use]
    pub fn failure_percent(&self) -> f64 {
        if self.pages_requested == 0 {
            0.0
        } else {
            (self.pages_failed as f64 / self.pages_requested as f64) * 100.0
        }
    }
}

/// Full result of a harvest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    /// Identifier for log correlation.
    pub run_id: Uuid,
    /// The raw input as given.
    pub input: String,
    /// The resolved URL, when resolution ran.
    pub canonical_url: Option<CanonicalUrl>,
    /// Deduplicated records; empty means "not found or persistently empty".
    pub records: Vec<ReviewRecord>,
    /// Counters.
    pub stats: HarvestStats,
    /// When the harvest started.
    pub started_at: DateTime<Utc>,
}

impl HarvestReport {
    /// Creates an empty report for `input`.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            input: input.into(),
            canonical_url: None,
            records: Vec::new(),
            stats: HarvestStats::default(),
            started_at: Utc::now(),
        }
    }

    /// Whether any reviews were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_builder() {
        let record = ReviewRecord::new("Alice")
            .with_location("Austin, TX")
            .with_rating("5 star rating")
            .with_text("Great tacos")
            .with_date("3/14/2024");

        assert_eq!(record.name, "Alice");
        assert_eq!(record.location, "Austin, TX");
        assert_eq!(record.date.as_deref(), Some("3/14/2024"));
    }

    #[test]
    fn test_has_reviewer() {
        assert!(ReviewRecord::new("Alice").has_reviewer());
        assert!(!ReviewRecord::new("").has_reviewer());
        assert!(!ReviewRecord::new(SENTINEL_NAME).has_reviewer());
    }

    #[test]
    fn test_record_serialization_skips_missing_date() {
        let json = serde_json::to_value(ReviewRecord::new("Bob")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Bob", "location": "", "rating": "", "text": ""})
        );

        let dated = serde_json::to_value(ReviewRecord::new("Bob").with_date("1/1/2024")).unwrap();
        assert_eq!(dated["date"], "1/1/2024");
    }

    #[test]
    fn test_canonical_url_query_detection() {
        assert!(!CanonicalUrl::new("https://example.com/biz/a").has_query());
        assert!(CanonicalUrl::new("https://example.com/search?find_desc=x").has_query());
        assert_eq!(CanonicalUrl::new("https://a.test/").to_string(), "https://a.test/");
    }

    #[test]
    fn test_canonical_url_fragment_ignored_for_query() {
        let url = CanonicalUrl::new("https://example.com/biz/a#top?x=1");
        assert!(!url.has_query());
        assert_eq!(url.split_fragment(), ("https://example.com/biz/a", "#top?x=1"));
    }

    #[test]
    fn test_stats_failure_percent() {
        let mut stats = HarvestStats::default();
        assert_eq!(stats.failure_percent(), 0.0);

        stats.record_page(true);
        stats.record_page(true);
        stats.record_page(false);
        stats.record_page(true);
        assert_eq!(stats.pages_requested, 4);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.failure_percent(), 25.0);
    }

    #[test]
    fn test_report_new_is_empty() {
        let report = HarvestReport::new("best tacos");
        assert!(report.is_empty());
        assert_eq!(report.input, "best tacos");
        assert!(report.canonical_url.is_none());
    }
}
