//! Configuration types for harvesting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::{HarvestError, HarvestResult};
use crate::retry::RetryPolicy;
use crate::selectors::SelectorTable;

/// Placeholder substituted with the encoded search term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Default cap on listing pages fetched per discovery attempt.
pub const DEFAULT_MAX_PAGES: u64 = 1000;

/// Describes the target listing site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Inputs starting with this prefix are already canonical.
    #[serde(default = "default_listing_prefix")]
    pub listing_prefix: String,
    /// Search endpoint with a `{query}` placeholder.
    #[serde(default = "default_search_template")]
    pub search_url_template: String,
    /// Query parameter carrying the pagination offset.
    #[serde(default = "default_pagination_param")]
    pub pagination_param: String,
    /// Reviews per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Upper bound on pages fetched per attempt, whatever the count claims.
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

fn default_listing_prefix() -> String {
    "https://www.yelp.com/".to_string()
}

fn default_search_template() -> String {
    "https://www.yelp.com/search?find_desc={query}".to_string()
}

fn default_pagination_param() -> String {
    "start".to_string()
}

fn default_page_size() -> u64 {
    10
}

fn default_max_pages() -> u64 {
    DEFAULT_MAX_PAGES
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_prefix: default_listing_prefix(),
            search_url_template: default_search_template(),
            pagination_param: default_pagination_param(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

impl SiteConfig {
    /// Builds a site config rooted at `base`, e.g. `https://example.com`.
    ///
    /// The listing prefix becomes `base/` and the search template
    /// `base/search?find_desc={query}`.
    #[must_use]
    pub fn for_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            listing_prefix: format!("{base}/"),
            search_url_template: format!("{base}/search?find_desc={QUERY_PLACEHOLDER}"),
            ..Self::default()
        }
    }
}

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    concat!("review-harvest/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

/// Top-level harvester configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Target site.
    #[serde(default)]
    pub site: SiteConfig,
    /// Listing selectors.
    #[serde(default)]
    pub selectors: SelectorTable,
    /// Discovery retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// HTTP settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Upper bound on page fetches in flight; `None` fetches every page at once.
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

impl HarvestConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> HarvestResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> HarvestResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Sets the site.
    #[must_use]
    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    /// Sets the selector table.
    #[must_use]
    pub fn with_selectors(mut self, selectors: SelectorTable) -> Self {
        self.selectors = selectors;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Bounds the number of page fetches in flight.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Checks values that would make a harvest meaningless.
    pub fn validate(&self) -> HarvestResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(HarvestError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.site.page_size == 0 {
            return Err(HarvestError::Config("site.page_size must be at least 1".into()));
        }
        if self.site.max_pages == 0 {
            return Err(HarvestError::Config("site.max_pages must be at least 1".into()));
        }
        if self.max_concurrent == Some(0) {
            return Err(HarvestError::Config("max_concurrent must be at least 1".into()));
        }
        if !self.site.search_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(HarvestError::Config(format!(
                "site.search_url_template must contain {QUERY_PLACEHOLDER}"
            )));
        }
        if !(self.fetch.timeout_seconds.is_finite() && self.fetch.timeout_seconds > 0.0) {
            return Err(HarvestError::Config("fetch.timeout_seconds must be positive".into()));
        }
        if let Some((field, _)) = self.selectors.entries().iter().find(|(_, s)| s.trim().is_empty()) {
            return Err(HarvestError::Config(format!("selectors.{field} is empty")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_site_config_defaults() {
        let site = SiteConfig::default();
        assert_eq!(site.listing_prefix, "https://www.yelp.com/");
        assert!(site.search_url_template.ends_with("find_desc={query}"));
        assert_eq!(site.pagination_param, "start");
        assert_eq!(site.page_size, 10);
        assert_eq!(site.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_site_for_base_url() {
        let site = SiteConfig::for_base_url("https://example.com/");
        assert_eq!(site.listing_prefix, "https://example.com/");
        assert_eq!(
            site.search_url_template,
            "https://example.com/search?find_desc={query}"
        );
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(5.0)
            .with_user_agent("custom-agent")
            .with_header("Accept-Language", "en-US");

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.headers.get("Accept-Language"), Some(&"en-US".to_string()));
    }

    #[test]
    fn test_from_json_partial() {
        let config = HarvestConfig::from_json_str(
            r#"{"retry": {"max_attempts": 3, "base_delay_ms": 10}, "max_concurrent": 4}"#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 10);
        assert_eq!(config.max_concurrent, Some(4));
        assert_eq!(config.site, SiteConfig::default());
    }

    #[test]
    fn test_defaults_round_trip() {
        let config = HarvestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(HarvestConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_attempts = HarvestConfig::new().with_retry(RetryPolicy::new().with_max_attempts(0));
        assert!(matches!(zero_attempts.validate(), Err(HarvestError::Config(_))));

        let zero_concurrency = HarvestConfig::new().with_max_concurrent(0);
        assert!(zero_concurrency.validate().is_err());

        let mut no_placeholder = HarvestConfig::new();
        no_placeholder.site.search_url_template = "https://example.com/search".to_string();
        assert!(no_placeholder.validate().is_err());

        let mut no_pages = HarvestConfig::new();
        no_pages.site.max_pages = 0;
        let err = no_pages.validate().unwrap_err();
        assert!(err.to_string().contains("site.max_pages"));

        let mut empty_selector = HarvestConfig::new();
        empty_selector.selectors.date = "  ".to_string();
        let err = empty_selector.validate().unwrap_err();
        assert!(err.to_string().contains("selectors.date"));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            HarvestConfig::from_json_str("{not json"),
            Err(HarvestError::Serialization(_))
        ));
    }
}
