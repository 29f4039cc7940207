//! Testing utilities for harvester code.
//!
//! This module provides:
//! - An in-memory [`Fetcher`](crate::Fetcher) serving canned pages
//! - Listing page fixtures matching the default selector table
//! - Assertions over harvested records

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_names, assert_no_placeholders, assert_unique_names};
pub use fixtures::{listing_page, ReviewBlock};
pub use mocks::StaticFetcher;
