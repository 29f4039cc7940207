//! Input resolution: turns a listing URL or free-text search into the
//! canonical URL that discovery paginates from.

use crate::config::{SiteConfig, QUERY_PLACEHOLDER};
use crate::models::CanonicalUrl;

/// Drops everything from the last `?` onwards.
#[must_use]
pub fn strip_query_fragment(raw: &str) -> &str {
    raw.rfind('?').map_or(raw, |idx| &raw[..idx])
}

/// Drops a `#fragment`, which browsers never send to the server.
#[must_use]
pub fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(head, _)| head)
}

/// Percent-encodes a search term the way `encodeURIComponent` does.
///
/// `urlencoding` also escapes `! ' ( ) *`; those are restored so the
/// request matches what a browser sends.
#[must_use]
pub fn encode_component(term: &str) -> String {
    const UNESCAPED: [(&str, &str); 5] =
        [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")];

    UNESCAPED
        .iter()
        .fold(urlencoding::encode(term).into_owned(), |acc, &(escaped, raw)| {
            acc.replace(escaped, raw)
        })
}

/// Resolves raw input into a canonical listing URL.
///
/// Inputs already under the site's listing prefix are used verbatim, minus
/// any query string or `#fragment`. Anything else is treated as a search
/// term and percent-encoded into the search template.
#[must_use]
pub fn resolve(raw: &str, site: &SiteConfig) -> CanonicalUrl {
    let input = strip_query_fragment(raw);

    if input.starts_with(&site.listing_prefix) {
        return CanonicalUrl::new(strip_fragment(input));
    }

    let encoded = encode_component(input);
    CanonicalUrl::new(site.search_url_template.replace(QUERY_PLACEHOLDER, &encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site() -> SiteConfig {
        SiteConfig::for_base_url("https://example.com")
    }

    #[test]
    fn test_strip_query_fragment() {
        assert_eq!(strip_query_fragment("a?b"), "a");
        assert_eq!(strip_query_fragment("a?b?c"), "a?b");
        assert_eq!(strip_query_fragment("plain"), "plain");
        assert_eq!(strip_query_fragment("?only"), "");
    }

    #[test]
    fn test_listing_url_stripped() {
        let url = resolve("https://example.com/listing/biz-1?ref=homepage", &site());
        assert_eq!(url.as_str(), "https://example.com/listing/biz-1");
    }

    #[test]
    fn test_listing_url_fragment_dropped() {
        let url = resolve("https://example.com/biz/taqueria#reviews", &site());
        assert_eq!(url.as_str(), "https://example.com/biz/taqueria");

        let url = resolve("https://example.com/biz/taqueria#top?x=1", &site());
        assert_eq!(url.as_str(), "https://example.com/biz/taqueria");
    }

    #[test]
    fn test_search_term_keeps_hash() {
        let url = resolve("c# meetup", &site());
        assert_eq!(url.as_str(), "https://example.com/search?find_desc=c%23%20meetup");
    }

    #[test]
    fn test_search_term_apostrophe_unescaped() {
        let url = resolve("Joe's pizza (downtown)!", &site());
        assert_eq!(
            url.as_str(),
            "https://example.com/search?find_desc=Joe's%20pizza%20(downtown)!"
        );
        assert_eq!(encode_component("a*b"), "a*b");
    }

    #[test]
    fn test_canonical_input_unchanged() {
        let url = resolve("https://example.com/biz/taqueria-austin", &site());
        assert_eq!(url.as_str(), "https://example.com/biz/taqueria-austin");
    }

    #[test]
    fn test_search_term_encoded() {
        let url = resolve("best tacos", &site());
        assert_eq!(url.as_str(), "https://example.com/search?find_desc=best%20tacos");
    }

    #[test]
    fn test_search_term_encoded_once() {
        let url = resolve("50% off & more", &site());
        assert_eq!(
            url.as_str(),
            "https://example.com/search?find_desc=50%25%20off%20%26%20more"
        );
    }

    #[test]
    fn test_search_term_fragment_stripped_before_encoding() {
        let url = resolve("pizza?utm=1", &site());
        assert_eq!(url.as_str(), "https://example.com/search?find_desc=pizza");
    }

    #[test]
    fn test_foreign_url_treated_as_search() {
        let url = resolve("https://other.test/biz", &site());
        assert_eq!(
            url.as_str(),
            "https://example.com/search?find_desc=https%3A%2F%2Fother.test%2Fbiz"
        );
    }

    #[test]
    fn test_default_site_template() {
        let url = resolve("coffee", &SiteConfig::default());
        assert_eq!(url.as_str(), "https://www.yelp.com/search?find_desc=coffee");
    }
}
