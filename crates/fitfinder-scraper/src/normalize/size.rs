use std::sync::LazyLock;

use regex::Regex;

use super::{first_hit, non_blank, RawRecord, Rule};

/// `size: M`, `Sz 32`.
static LABELLED_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:size|sz)[:\s]+(XXXL|XXL|XL|XS|S|M|L|\d+)\b").expect("valid regex")
});

/// `US 8`, `EU38`.
static REGIONAL_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:US|EU)[:\s]*(\d+)\b").expect("valid regex"));

/// A standalone letter size. Upper case only, so the `s` in `women's`
/// is not a size.
static LETTER_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(XXXL|XXL|XL|XS|S|M|L)\b").expect("valid regex"));

const RULES: &[Rule<String>] = &[variant_size, direct_size, size_in_name];

pub(super) fn resolve(record: &RawRecord<'_>) -> Option<String> {
    first_hit(record, RULES)
}

fn variant_size(record: &RawRecord<'_>) -> Option<String> {
    record
        .at("/detail/sizes/0/name")
        .and_then(non_blank)
        .map(str::to_string)
}

fn direct_size(record: &RawRecord<'_>) -> Option<String> {
    record.text("size").map(str::to_string)
}

fn size_in_name(record: &RawRecord<'_>) -> Option<String> {
    let name = record.name()?;
    [&*LABELLED_SIZE_RE, &*REGIONAL_SIZE_RE, &*LETTER_SIZE_RE]
        .into_iter()
        .find_map(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}
