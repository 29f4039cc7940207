//! HTML fixtures shaped like the listing markup the default selectors expect.

use std::fmt::Write;

/// Builder for one review block.
#[derive(Debug, Clone, Default)]
pub struct ReviewBlock {
    name: String,
    location: Option<String>,
    rating: Option<String>,
    text: Option<String>,
    date: Option<String>,
}

impl ReviewBlock {
    /// Creates a block for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the rating label.
    #[must_use]
    pub fn rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    /// Sets the review text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the date.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Renders the block as listing markup.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from(
            r#"<div class="margin-b5__09f24__pTvws border-color--default__09f24__NPAKY">"#,
        );
        let _ = write!(
            html,
            r#"<div class="user-passport"><span class="fs-block css-ux5mu6" data-font-weight="bold"><a href="/user">{}</a></span>"#,
            self.name
        );
        if let Some(location) = &self.location {
            let _ = write!(html, r#"<span class="css-qgunke">{location}</span>"#);
        }
        html.push_str("</div>");
        if let Some(rating) = &self.rating {
            let _ = write!(
                html,
                r#"<span class="display--inline__09f24__c6N_k border-color--default__09f24__NPAKY"><div class="stars" aria-label="{rating}" role="img"></div></span>"#
            );
        }
        if let Some(date) = &self.date {
            let _ = write!(html, r#"<span class="css-chan6m">{date}</span>"#);
        }
        if let Some(text) = &self.text {
            let _ = write!(
                html,
                r#"<p class="comment"><span class="raw__09f24__T4Ezm" lang="en">{text}</span></p>"#
            );
        }
        html.push_str("</div>");
        html
    }
}

/// Renders a full listing page.
///
/// `review_count` adds the "(N reviews)" summary link, formatted with
/// thousands separators the way the site shows it.
#[must_use]
pub fn listing_page(review_count: Option<u64>, blocks: &[ReviewBlock]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Listing</title></head><body>");
    if let Some(count) = review_count {
        let _ = write!(
            html,
            r##"<div class="summary"><a class="css-19v1rkv" href="#reviews">({} reviews)</a></div>"##,
            with_thousands(count)
        );
    }
    html.push_str(r#"<section aria-label="Recommended Reviews"><ul>"#);
    for block in blocks {
        let _ = write!(html, "<li>{}</li>", block.render());
    }
    html.push_str("</ul></section></body></html>");
    html
}

fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
