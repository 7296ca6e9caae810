//! Per-retailer search string resolution.

use fitfinder_core::AttributeQuery;

/// Generic attribute shared by every retailer.
pub const SEARCH_STRING_KEY: &str = "search_string";

/// Term used when the attribute record carries nothing usable.
pub const FALLBACK_QUERY: &str = "clothing";

/// Number of leading tokens kept by [`SearchQuery::simplified`].
const SIMPLIFIED_TOKENS: usize = 2;

/// A resolved, non-empty search string for one retailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Wraps `raw` after trimming. Blank input becomes [`FALLBACK_QUERY`].
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(FALLBACK_QUERY.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// The first two whitespace tokens, or `None` for a single-token query.
    #[must_use]
    pub fn simplified(&self) -> Option<Self> {
        if self.token_count() <= 1 {
            return None;
        }
        let head: Vec<&str> = self.0.split_whitespace().take(SIMPLIFIED_TOKENS).collect();
        Some(Self(head.join(" ")))
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the search string for a retailer whose preferred attribute keys
/// are `retailer_keys`, most preferred first.
///
/// First non-empty wins: a retailer-specific key, the generic
/// `search_string`, `"{color} {clothing_type}"`, then `"clothing"`.
#[must_use]
pub fn resolve(query: &AttributeQuery, retailer_keys: &[String]) -> SearchQuery {
    if let Some(specific) = retailer_keys.iter().find_map(|key| query.attribute(key)) {
        return SearchQuery::new(specific);
    }
    if let Some(generic) = query.attribute(SEARCH_STRING_KEY) {
        return SearchQuery::new(generic);
    }
    let composed = format!(
        "{} {}",
        query.color().unwrap_or_default(),
        query.clothing_type.trim()
    );
    SearchQuery::new(&composed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zara_keys() -> Vec<String> {
        vec!["zara_search_string".to_string()]
    }

    #[test]
    fn blank_retailer_key_falls_back_to_color_and_type() {
        let query = AttributeQuery::new("skirt")
            .with_attribute("color", "black")
            .with_attribute("zara_search_string", "");
        assert_eq!(resolve(&query, &zara_keys()).as_str(), "black skirt");
    }

    #[test]
    fn retailer_key_wins() {
        let query = AttributeQuery::new("skirt")
            .with_attribute("search_string", "black skirt")
            .with_attribute("zara_search_string", "  pleated midi skirt ");
        assert_eq!(resolve(&query, &zara_keys()).as_str(), "pleated midi skirt");
    }

    #[test]
    fn keys_are_tried_in_order() {
        let query = AttributeQuery::new("dress")
            .with_attribute("hm_search_string", "linen dress")
            .with_attribute("hm_search_string_2", "summer dress");
        let keys = vec!["hm_search_string_2".to_string(), "hm_search_string".to_string()];
        assert_eq!(resolve(&query, &keys).as_str(), "summer dress");
    }

    #[test]
    fn other_retailers_keys_are_ignored() {
        let query = AttributeQuery::new("skirt").with_attribute("hm_search_string", "h&m skirt");
        assert_eq!(resolve(&query, &zara_keys()).as_str(), "skirt");
    }

    #[test]
    fn generic_search_string_beats_composition() {
        let query = AttributeQuery::new("skirt")
            .with_attribute("color", "black")
            .with_attribute("search_string", "leather mini skirt");
        assert_eq!(resolve(&query, &zara_keys()).as_str(), "leather mini skirt");
    }

    #[test]
    fn color_only_is_trimmed() {
        let query = AttributeQuery::new("  ").with_attribute("color", "red");
        assert_eq!(resolve(&query, &zara_keys()).as_str(), "red");
    }

    #[test]
    fn empty_query_uses_fallback() {
        assert_eq!(resolve(&AttributeQuery::default(), &[]).as_str(), "clothing");
    }

    #[test]
    fn simplified_keeps_two_tokens() {
        let query = SearchQuery::new("black  pleated midi skirt");
        assert_eq!(query.token_count(), 4);
        assert_eq!(query.simplified(), Some(SearchQuery::new("black pleated")));
        assert_eq!(
            SearchQuery::new("black skirt").simplified(),
            Some(SearchQuery::new("black skirt"))
        );
    }

    #[test]
    fn single_token_has_no_simplification() {
        assert_eq!(SearchQuery::new("skirt").simplified(), None);
    }
}
