//! Price resolution and formatting.
//!
//! Bare numbers above 100 are read as cents (`3590` becomes `35.90`). This
//! misreads whole-unit prices above 100 (a 150.00 item becomes 1.50); the
//! heuristic matches how the retailers' search APIs actually report prices.

use fitfinder_core::products::PRICE_NOT_AVAILABLE;
use serde_json::Value;

use super::{first_hit, RawRecord, Rule};

const PRICE_KEYS: &[&str] = &[
    "price",
    "regularPrice",
    "salePrice",
    "productPrice",
    "product_price",
    "currentPrice",
    "current_price",
];

const PRICE_SUBKEYS: &[&str] = &["value", "amount", "text", "current"];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£'];

const CENTS_THRESHOLD: f64 = 100.0;

const RULES: &[Rule<String>] = &[direct_price, offer_price, variant_price];

pub(super) fn resolve(record: &RawRecord<'_>) -> String {
    first_hit(record, RULES).unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string())
}

/// Formats `amount` with two decimals behind `symbol`, e.g. `"€35.90"`.
#[must_use]
pub fn format_price(symbol: &str, amount: f64) -> String {
    format!("{symbol}{amount:.2}")
}

fn direct_price(record: &RawRecord<'_>) -> Option<String> {
    let symbol = record.profile.currency_symbol.as_str();
    PRICE_KEYS
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(|value| match value {
            Value::Object(map) => PRICE_SUBKEYS
                .iter()
                .filter_map(|sub| map.get(*sub))
                .find_map(|inner| scalar_price(inner, symbol, false)),
            other => scalar_price(other, symbol, true),
        })
}

/// schema.org `offers.price`, single offer or the first of a list.
fn offer_price(record: &RawRecord<'_>) -> Option<String> {
    let symbol = record.profile.currency_symbol.as_str();
    record
        .at("/offers/price")
        .or_else(|| record.at("/offers/0/price"))
        .and_then(|value| scalar_price(value, symbol, false))
}

/// Price nested on the first color variant.
fn variant_price(record: &RawRecord<'_>) -> Option<String> {
    let symbol = record.profile.currency_symbol.as_str();
    record
        .at("/detail/colors/0/price")
        .filter(|value| value.is_number())
        .and_then(|value| scalar_price(value, symbol, true))
}

fn scalar_price(value: &Value, symbol: &str, cents_heuristic: bool) -> Option<String> {
    match value {
        Value::Number(number) => {
            let amount = number.as_f64().filter(|a| a.is_finite() && *a >= 0.0)?;
            let units = if cents_heuristic && amount > CENTS_THRESHOLD {
                amount / 100.0
            } else {
                amount
            };
            Some(format_price(symbol, units))
        }
        Value::String(text) => text_price(text, symbol),
        _ => None,
    }
}

/// Strips a price string to digits and the decimal point and re-formats it.
///
/// A string with no digits passes through only if it carries a currency
/// symbol. A string that keeps digits but still does not parse passes
/// through unchanged.
fn text_price(raw: &str, symbol: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = decimal_digits(trimmed);
    if cleaned.is_empty() {
        return trimmed
            .contains(CURRENCY_SYMBOLS)
            .then(|| trimmed.to_string());
    }

    match cleaned.parse::<f64>() {
        Ok(amount) => Some(format_price(symbol, amount)),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Keeps ASCII digits and `.`; a lone comma followed by exactly two digits
/// in a string without a dot is read as the decimal separator (`"35,90 €"`).
fn decimal_digits(raw: &str) -> String {
    let decimal_comma = !raw.contains('.')
        && raw.matches(',').count() == 1
        && raw
            .rsplit(',')
            .next()
            .is_some_and(|tail| tail.chars().take_while(char::is_ascii_digit).count() == 2);

    raw.chars()
        .filter_map(|c| match c {
            '0'..='9' | '.' => Some(c),
            ',' if decimal_comma => Some('.'),
            _ => None,
        })
        .collect()
}
