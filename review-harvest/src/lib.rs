//! # review-harvest
//!
//! Harvests structured review records from a paginated review-listing site.
//!
//! Given a listing URL or free-text search terms, the harvester:
//!
//! - **Resolves** the input into a canonical listing URL
//! - **Discovers** the total review count from the first page
//! - **Fans out** concurrent page fetches across the pagination range
//! - **Extracts** records through a configurable selector table
//! - **Retries** attempts that come back empty, within a fixed budget
//! - **Deduplicates** by reviewer name, keeping the first record seen
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use review_harvest::harvest_reviews;
//!
//! let reviews = harvest_reviews("best tacos austin").await;
//! for review in &reviews {
//!     println!("{} ({}): {}", review.name, review.rating, review.text);
//! }
//! ```
//!
//! An empty result means the listing was not found or stayed empty for
//! every attempt; the two cases are indistinguishable.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod dedupe;
pub mod discovery;
pub mod errors;
pub mod extract;
#[cfg(feature = "http")]
pub mod fetch;
pub mod harvester;
pub mod models;
pub mod pagination;
pub mod protocols;
pub mod resolve;
pub mod retry;
pub mod selectors;
pub mod testing;

pub use config::{FetchConfig, HarvestConfig, SiteConfig};
pub use dedupe::dedupe;
pub use errors::{HarvestError, HarvestResult};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use harvester::Harvester;
#[cfg(feature = "http")]
pub use harvester::{harvest_reviews, harvest_reviews_with, try_harvest};
pub use models::{CanonicalUrl, HarvestReport, HarvestStats, ReviewRecord};
pub use protocols::{
    FetchResult, Fetcher, HarvestObserver, LoggingHarvestObserver, NoOpHarvestObserver,
};
pub use resolve::resolve;
pub use retry::{BackoffStrategy, JitterStrategy, RetryPolicy};
pub use selectors::SelectorTable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{FetchConfig, HarvestConfig, SiteConfig};
    pub use crate::errors::{HarvestError, HarvestResult};
    pub use crate::harvester::Harvester;
    pub use crate::models::{CanonicalUrl, HarvestReport, HarvestStats, ReviewRecord};
    pub use crate::protocols::{Fetcher, HarvestObserver};
    pub use crate::retry::RetryPolicy;
    pub use crate::selectors::SelectorTable;
}
