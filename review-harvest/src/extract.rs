//! Record extraction from parsed listing pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::models::ReviewRecord;
use crate::selectors::{CompiledSelectors, RATING_LABEL_ATTR};

// Literal pattern; compiling it cannot fail.
#[allow(clippy::unwrap_used)]
static REVIEW_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([\d,]+)\sreviews\)").unwrap());

/// Concatenated, trimmed text of every `selector` match under `scope`.
fn joined_text(scope: &ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn rating_label(block: &ElementRef<'_>, selectors: &CompiledSelectors) -> String {
    block
        .select(&selectors.rating)
        .flat_map(|wrapper| wrapper.select(&selectors.rating_label))
        .next()
        .and_then(|el| el.value().attr(RATING_LABEL_ATTR))
        .map(|label| label.trim().to_string())
        .unwrap_or_default()
}

fn extract_block(block: &ElementRef<'_>, selectors: &CompiledSelectors) -> ReviewRecord {
    let date = joined_text(block, &selectors.date);
    ReviewRecord {
        name: joined_text(block, &selectors.name),
        location: joined_text(block, &selectors.location),
        rating: rating_label(block, selectors),
        text: joined_text(block, &selectors.text),
        date: (!date.is_empty()).then_some(date),
    }
}

/// Extracts every review on the page, in document order.
///
/// Blocks without a real reviewer name (empty or the sentinel) are skipped.
/// Missing fields inside a block become empty strings.
#[must_use]
pub fn extract_records(document: &Html, selectors: &CompiledSelectors) -> Vec<ReviewRecord> {
    document
        .select(&selectors.review_block)
        .map(|block| extract_block(&block, selectors))
        .filter(ReviewRecord::has_reviewer)
        .collect()
}

/// Parses a summary like `"(1,234 reviews)"` into its count.
#[must_use]
pub fn parse_review_count(summary: &str) -> Option<u64> {
    let caps = REVIEW_COUNT_PATTERN.captures(summary.trim_start())?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Reads the total review count from the page summary element.
///
/// Returns `None` when the element is missing or its text doesn't match.
#[must_use]
pub fn extract_review_count(document: &Html, selectors: &CompiledSelectors) -> Option<u64> {
    let summary: String = document
        .select(&selectors.review_count)
        .flat_map(|el| el.text())
        .collect();
    parse_review_count(&summary)
}
