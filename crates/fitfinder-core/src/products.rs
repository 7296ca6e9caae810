use serde::{Deserialize, Serialize};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const PRICE_NOT_AVAILABLE: &str = "Price not available";
pub const STANDARD: &str = "Standard";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
    Unknown,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "Available"),
            Availability::Unavailable => write!(f, "Unavailable"),
            Availability::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Best-effort descriptive attributes pulled out of a retailer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    /// Capitalized color name, or `"Unknown"`.
    pub color: String,
    /// Comma-joined material names, or empty.
    pub material: String,
    pub style: String,
    /// One of the length terms (`Mini`, `Midi`, ...) or `"Standard"`.
    pub length: String,
}

impl Default for ProductAttributes {
    fn default() -> Self {
        Self {
            color: UNKNOWN.to_string(),
            material: String::new(),
            style: String::new(),
            length: STANDARD.to_string(),
        }
    }
}

/// A retailer product normalized into one shape regardless of which
/// retrieval channel produced it.
///
/// Every field is always populated; missing data is represented by the
/// documented defaults rather than `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Retailer display label, forced by the adapter.
    pub brand: String,
    pub category: String,
    pub size: String,
    pub availability: Availability,
    /// Formatted price including the currency symbol, e.g. `"€35.90"`.
    pub price: String,
    /// Absolute URL or empty.
    pub image_url: String,
    /// Absolute URL or empty.
    pub product_url: String,
    pub attributes: ProductAttributes,
    /// Set by the aggregator after collection.
    #[serde(default)]
    pub retailer: String,
}

/// Merged output of one aggregate search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Longest of the per-retailer resolved queries. Display only.
    pub query: String,
    pub items: Vec<Product>,
}

/// JSON envelope returned to callers of the scrape endpoint and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Product>>,
}

impl ScrapeResponse {
    /// An empty item list is still a success.
    #[must_use]
    pub fn success(result: AggregateResult) -> Self {
        Self {
            status: true,
            message: None,
            query: Some(result.query),
            items: Some(result.items),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: Some(message.into()),
            query: None,
            items: None,
        }
    }

    #[must_use]
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: Some(message.into()),
            query: None,
            items: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            name: "Black Pleated Midi Skirt".to_string(),
            brand: "Zara".to_string(),
            category: "Women".to_string(),
            size: STANDARD.to_string(),
            availability: Availability::Available,
            price: "€35.90".to_string(),
            image_url: String::new(),
            product_url: String::new(),
            attributes: ProductAttributes::default(),
            retailer: String::new(),
        }
    }

    #[test]
    fn attribute_defaults() {
        let attrs = ProductAttributes::default();
        assert_eq!(attrs.color, "Unknown");
        assert_eq!(attrs.material, "");
        assert_eq!(attrs.length, "Standard");
    }

    #[test]
    fn success_response_with_no_items_is_still_success() {
        let response = ScrapeResponse::success(AggregateResult {
            query: "black skirt".to_string(),
            items: Vec::new(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["query"], "black skirt");
        assert_eq!(json["items"], serde_json::json!([]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn failure_response_omits_items() {
        let json = serde_json::to_value(ScrapeResponse::failure("No clothing attributes provided"))
            .unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["message"], "No clothing attributes provided");
        assert!(json.get("items").is_none());
        assert!(json.get("query").is_none());
    }

    #[test]
    fn product_serializes_availability_as_word() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(json["availability"], "Available");
        assert_eq!(json["attributes"]["color"], "Unknown");
    }

    #[test]
    fn product_deserializes_without_retailer() {
        let mut json = serde_json::to_value(sample_product()).unwrap();
        json.as_object_mut().unwrap().remove("retailer");
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.retailer, "");
    }
}
