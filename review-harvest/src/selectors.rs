//! CSS selectors for review listing pages.
//!
//! Every structural assumption about the listing markup lives in
//! [`SelectorTable`]. When the site changes its class names, update the
//! defaults here (or override them in the JSON config) and nothing else.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::errors::{HarvestError, HarvestResult};

/// Attribute on the rating element holding the human-readable label.
pub const RATING_LABEL_ATTR: &str = "aria-label";

/// Mapping from logical field name to selector string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    /// Container for a single review.
    #[serde(default = "default_review_block")]
    pub review_block: String,
    /// Reviewer name, relative to the review block.
    #[serde(default = "default_name")]
    pub name: String,
    /// Reviewer location, relative to the review block.
    #[serde(default = "default_location")]
    pub location: String,
    /// Star rating wrapper, relative to the review block.
    #[serde(default = "default_rating")]
    pub rating: String,
    /// Element inside the rating wrapper carrying the label attribute.
    #[serde(default = "default_rating_label")]
    pub rating_label: String,
    /// Review body text, relative to the review block.
    #[serde(default = "default_text")]
    pub text: String,
    /// Review date, relative to the review block.
    #[serde(default = "default_date")]
    pub date: String,
    /// Summary element holding "(N reviews)", relative to the document.
    #[serde(default = "default_review_count")]
    pub review_count: String,
}

fn default_review_block() -> String {
    ".margin-b5__09f24__pTvws.border-color--default__09f24__NPAKY".to_string()
}

fn default_name() -> String {
    r#"span.fs-block.css-ux5mu6[data-font-weight="bold"]"#.to_string()
}

fn default_location() -> String {
    "span.css-qgunke".to_string()
}

fn default_rating() -> String {
    "span.display--inline__09f24__c6N_k.border-color--default__09f24__NPAKY".to_string()
}

fn default_rating_label() -> String {
    "div".to_string()
}

fn default_text() -> String {
    "span.raw__09f24__T4Ezm".to_string()
}

fn default_date() -> String {
    "span.css-chan6m".to_string()
}

fn default_review_count() -> String {
    "a.css-19v1rkv".to_string()
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            review_block: default_review_block(),
            name: default_name(),
            location: default_location(),
            rating: default_rating(),
            rating_label: default_rating_label(),
            text: default_text(),
            date: default_date(),
            review_count: default_review_count(),
        }
    }
}

impl SelectorTable {
    /// Creates a table with the default listing selectors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(field, selector)` pairs in a stable order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("review_block", self.review_block.as_str()),
            ("name", self.name.as_str()),
            ("location", self.location.as_str()),
            ("rating", self.rating.as_str()),
            ("rating_label", self.rating_label.as_str()),
            ("text", self.text.as_str()),
            ("date", self.date.as_str()),
            ("review_count", self.review_count.as_str()),
        ]
    }

    /// Compiles every entry, failing on the first invalid selector.
    pub fn compile(&self) -> HarvestResult<CompiledSelectors> {
        Ok(CompiledSelectors {
            review_block: parse("review_block", &self.review_block)?,
            name: parse("name", &self.name)?,
            location: parse("location", &self.location)?,
            rating: parse("rating", &self.rating)?,
            rating_label: parse("rating_label", &self.rating_label)?,
            text: parse("text", &self.text)?,
            date: parse("date", &self.date)?,
            review_count: parse("review_count", &self.review_count)?,
        })
    }
}

fn parse(field: &str, selector: &str) -> HarvestResult<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        field: field.to_string(),
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Compiled form of a [`SelectorTable`].
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    /// Review container.
    pub review_block: Selector,
    /// Reviewer name.
    pub name: Selector,
    /// Reviewer location.
    pub location: Selector,
    /// Rating wrapper.
    pub rating: Selector,
    /// Rating label carrier.
    pub rating_label: Selector,
    /// Review text.
    pub text: Selector,
    /// Review date.
    pub date: Selector,
    /// Review count summary.
    pub review_count: Selector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_compiles() {
        assert!(SelectorTable::default().compile().is_ok());
    }

    #[test]
    fn test_entries_cover_every_field() {
        let table = SelectorTable::default();
        let fields: Vec<&str> = table.entries().iter().map(|(f, _)| *f).collect();
        assert_eq!(fields.len(), 8);
        assert!(fields.contains(&"review_count"));
    }

    #[test]
    fn test_invalid_selector_names_field() {
        let table = SelectorTable {
            location: "span[".to_string(),
            ..Default::default()
        };

        match table.compile() {
            Err(HarvestError::Selector { field, selector, .. }) => {
                assert_eq!(field, "location");
                assert_eq!(selector, "span[");
            }
            other => panic!("expected selector error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_override_from_json() {
        let table: SelectorTable =
            serde_json::from_str(r#"{"text": "p.review-body"}"#).unwrap();
        assert_eq!(table.text, "p.review-body");
        assert_eq!(table.location, default_location());
    }
}
