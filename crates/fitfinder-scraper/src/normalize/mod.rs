//! Normalization from retailer-native records to [`fitfinder_core::Product`].
//!
//! Every field is resolved by an ordered list of pure rules over the raw JSON
//! value; the first rule that yields a value wins and a documented default
//! covers the rest. Nothing here can fail.

mod links;
mod media;
mod price;
mod size;
mod vocab;

use fitfinder_core::products::{PRICE_NOT_AVAILABLE, STANDARD, UNKNOWN, UNKNOWN_PRODUCT};
use fitfinder_core::{Availability, Product, ProductAttributes, RetailerProfile};
use serde_json::Value;

pub use price::format_price;
pub use vocab::{match_color, match_length, match_materials};

/// Literal availability sentinel meaning "in stock".
const IN_STOCK: &str = "in_stock";

pub(crate) const NAME_KEYS: &[&str] = &["name", "title", "productName", "product_name"];

/// One raw candidate plus the context its rules may consult.
pub(crate) struct RawRecord<'a> {
    value: &'a Value,
    pub(crate) profile: &'a RetailerProfile,
    pub(crate) search_term: &'a str,
}

/// A single extraction rule: returns `Some` on a hit.
pub(crate) type Rule<T> = fn(&RawRecord<'_>) -> Option<T>;

impl<'a> RawRecord<'a> {
    pub(crate) fn new(
        value: &'a Value,
        profile: &'a RetailerProfile,
        search_term: &'a str,
    ) -> Self {
        Self {
            value: unwrap_content(value),
            profile,
            search_term,
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.value.get(key).filter(|v| !v.is_null())
    }

    /// JSON-pointer lookup, e.g. `"/detail/colors/0/name"`.
    pub(crate) fn at(&self, pointer: &str) -> Option<&'a Value> {
        self.value.pointer(pointer).filter(|v| !v.is_null())
    }

    /// Trimmed non-blank string under `key`.
    pub(crate) fn text(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(non_blank)
    }

    /// First non-blank string among `keys`.
    pub(crate) fn first_text(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub(crate) fn name(&self) -> Option<&'a str> {
        self.first_text(NAME_KEYS)
    }
}

/// Records wrapped as `{"content": {...}}` are unwrapped one level.
fn unwrap_content(value: &Value) -> &Value {
    match value.get("content") {
        Some(inner @ Value::Object(_)) => inner,
        _ => value,
    }
}

pub(crate) fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Upper-cases the first character and lower-cases the rest.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub(crate) fn first_hit<T>(record: &RawRecord<'_>, rules: &[Rule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(record))
}

/// Normalizes one raw retailer record into a [`Product`].
///
/// `search_term` is the query that produced the record; it only feeds color
/// inference when the record carries no color of its own. `brand` is always
/// the profile's label. Calling this twice on the same input yields equal
/// products.
#[must_use]
pub fn normalize(raw: &Value, search_term: &str, profile: &RetailerProfile) -> Product {
    if !unwrap_content(raw).is_object() {
        return unusable_record(search_term, profile);
    }

    let record = RawRecord::new(raw, profile, search_term);

    Product {
        name: record.name().unwrap_or(UNKNOWN_PRODUCT).to_string(),
        brand: profile.label.clone(),
        category: category(&record).unwrap_or_else(|| profile.default_category.clone()),
        size: size::resolve(&record).unwrap_or_else(|| STANDARD.to_string()),
        availability: availability(&record),
        price: price::resolve(&record),
        image_url: media::resolve(&record).unwrap_or_default(),
        product_url: links::resolve(&record).unwrap_or_default(),
        attributes: ProductAttributes {
            color: vocab::color(&record),
            material: vocab::material(&record).unwrap_or_default(),
            style: record.text("style").unwrap_or_default().to_string(),
            length: vocab::length(&record).unwrap_or_else(|| STANDARD.to_string()),
        },
        retailer: String::new(),
    }
}

/// Product for a record that is not an object at all.
fn unusable_record(search_term: &str, profile: &RetailerProfile) -> Product {
    Product {
        name: UNKNOWN_PRODUCT.to_string(),
        brand: profile.label.clone(),
        category: profile.default_category.clone(),
        size: STANDARD.to_string(),
        availability: Availability::Unknown,
        price: PRICE_NOT_AVAILABLE.to_string(),
        image_url: String::new(),
        product_url: String::new(),
        attributes: ProductAttributes {
            color: match_color(search_term).unwrap_or_else(|| UNKNOWN.to_string()),
            ..ProductAttributes::default()
        },
        retailer: String::new(),
    }
}

fn category(record: &RawRecord<'_>) -> Option<String> {
    record
        .text("sectionName")
        .map(capitalize)
        .or_else(|| record.text("category").map(str::to_string))
}

/// Absent field means available; anything but the in-stock sentinel means
/// unavailable. schema.org `InStock` URLs count as the sentinel.
fn availability(record: &RawRecord<'_>) -> Availability {
    match record.get("availability") {
        None | Some(Value::Bool(true)) => Availability::Available,
        Some(Value::String(s)) if is_in_stock(s) => Availability::Available,
        Some(_) => Availability::Unavailable,
    }
}

fn is_in_stock(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    let tail = lowered.rsplit('/').next().unwrap_or_default();
    lowered == IN_STOCK || tail == "instock"
}

#[cfg(test)]
#[path = "../normalize_test.rs"]
mod tests;
