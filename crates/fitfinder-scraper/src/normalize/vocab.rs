//! Fixed vocabularies for color, material, and length inference.
//!
//! Terms match case-insensitively on word boundaries, so `"tailored"` does
//! not count as red. Within one vocabulary the list order decides which term
//! wins, not the position in the text.

use std::sync::LazyLock;

use fitfinder_core::products::UNKNOWN;
use regex::Regex;

use super::{capitalize, first_hit, non_blank, RawRecord, Rule};

const COLORS: &[&str] = &[
    "black",
    "white",
    "red",
    "blue",
    "green",
    "yellow",
    "purple",
    "pink",
    "orange",
    "brown",
    "gray",
    "grey",
    "beige",
    "navy",
    "teal",
    "cream",
    "anthracite",
    "ivory",
    "silver",
    "gold",
    "burgundy",
    "maroon",
    "olive",
];

const MATERIALS: &[&str] = &[
    "cotton",
    "polyester",
    "linen",
    "wool",
    "silk",
    "viscose",
    "nylon",
    "elastane",
    "spandex",
    "rayon",
    "acrylic",
    "cashmere",
    "modal",
];

/// Canonical length term followed by the words that imply it.
const LENGTHS: &[(&str, &[&str])] = &[
    ("mini", &["mini", "short"]),
    (
        "midi",
        &["midi", "medium", "mid-length", "mid length", "mid-level"],
    ),
    (
        "maxi",
        &["maxi", "long", "full-length", "full length", "floor-length"],
    ),
    ("knee-length", &["knee", "knee-length", "knee length"]),
];

struct Term {
    pattern: Regex,
    canonical: &'static str,
}

fn term(word: &str, canonical: &'static str) -> Term {
    Term {
        pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).expect("valid regex"),
        canonical,
    }
}

static COLOR_TERMS: LazyLock<Vec<Term>> =
    LazyLock::new(|| COLORS.iter().map(|&c| term(c, c)).collect());

static MATERIAL_TERMS: LazyLock<Vec<Term>> =
    LazyLock::new(|| MATERIALS.iter().map(|&m| term(m, m)).collect());

static LENGTH_TERMS: LazyLock<Vec<Term>> = LazyLock::new(|| {
    LENGTHS
        .iter()
        .flat_map(|&(canonical, words)| words.iter().map(move |&w| term(w, canonical)))
        .collect()
});

fn first_term(terms: &[Term], text: &str) -> Option<String> {
    terms
        .iter()
        .find(|t| t.pattern.is_match(text))
        .map(|t| capitalize(t.canonical))
}

/// First vocabulary color found in `text`, capitalized.
#[must_use]
pub fn match_color(text: &str) -> Option<String> {
    first_term(&COLOR_TERMS, text)
}

/// Every vocabulary material found in `text`, capitalized and comma-joined.
#[must_use]
pub fn match_materials(text: &str) -> Option<String> {
    let found: Vec<String> = MATERIAL_TERMS
        .iter()
        .filter(|t| t.pattern.is_match(text))
        .map(|t| capitalize(t.canonical))
        .collect();
    (!found.is_empty()).then(|| found.join(", "))
}

/// Canonical length term implied by `text`, capitalized.
#[must_use]
pub fn match_length(text: &str) -> Option<String> {
    first_term(&LENGTH_TERMS, text)
}

const COLOR_RULES: &[Rule<String>] = &[
    direct_color,
    variant_color,
    color_in_name,
    color_in_search_term,
];

const MATERIAL_RULES: &[Rule<String>] = &[direct_material, materials_in_description];

const LENGTH_RULES: &[Rule<String>] = &[direct_length, length_in_name];

fn direct_color(record: &RawRecord<'_>) -> Option<String> {
    record.first_text(&["color", "colorName"]).map(capitalize)
}

fn variant_color(record: &RawRecord<'_>) -> Option<String> {
    record
        .at("/detail/colors/0/name")
        .and_then(non_blank)
        .map(capitalize)
}

fn color_in_name(record: &RawRecord<'_>) -> Option<String> {
    record.name().and_then(match_color)
}

fn color_in_search_term(record: &RawRecord<'_>) -> Option<String> {
    match_color(record.search_term)
}

fn direct_material(record: &RawRecord<'_>) -> Option<String> {
    record
        .first_text(&["material", "fabricContent"])
        .map(str::to_string)
}

fn materials_in_description(record: &RawRecord<'_>) -> Option<String> {
    record
        .first_text(&["description", "shortDescription"])
        .and_then(match_materials)
}

fn direct_length(record: &RawRecord<'_>) -> Option<String> {
    record.first_text(&["length", "fit"]).map(capitalize)
}

fn length_in_name(record: &RawRecord<'_>) -> Option<String> {
    record.name().and_then(match_length)
}

pub(super) fn color(record: &RawRecord<'_>) -> String {
    first_hit(record, COLOR_RULES).unwrap_or_else(|| UNKNOWN.to_string())
}

pub(super) fn material(record: &RawRecord<'_>) -> Option<String> {
    first_hit(record, MATERIAL_RULES)
}

pub(super) fn length(record: &RawRecord<'_>) -> Option<String> {
    first_hit(record, LENGTH_RULES)
}

#[cfg(test)]
mod tests {
    use fitfinder_core::RetailerProfile;
    use serde_json::{json, Value};

    use super::*;

    fn record_color(raw: &Value, search_term: &str) -> String {
        let profile = RetailerProfile::zara();
        color(&RawRecord::new(raw, &profile, search_term))
    }

    #[test]
    fn color_from_name() {
        assert_eq!(
            record_color(&json!({"name": "Black Pleated Midi Skirt"}), ""),
            "Black"
        );
    }

    #[test]
    fn color_unknown_without_match() {
        assert_eq!(record_color(&json!({"name": "Pleated Skirt"}), ""), "Unknown");
    }

    #[test]
    fn color_falls_back_to_search_term() {
        assert_eq!(
            record_color(&json!({"name": "Pleated Skirt"}), "navy pleated skirt"),
            "Navy"
        );
    }

    #[test]
    fn direct_color_beats_name() {
        assert_eq!(
            record_color(&json!({"name": "Black Skirt", "colorName": "OFF-WHITE"}), ""),
            "Off-white"
        );
    }

    #[test]
    fn variant_color_beats_name() {
        let raw = json!({"name": "Black Skirt", "detail": {"colors": [{"name": "ECRU"}]}});
        assert_eq!(record_color(&raw, ""), "Ecru");
    }

    #[test]
    fn color_respects_word_boundaries() {
        assert_eq!(match_color("Tailored Trousers"), None);
        assert_eq!(match_color("Red-trimmed blazer"), Some("Red".to_string()));
    }

    #[test]
    fn color_uses_vocabulary_order() {
        assert_eq!(match_color("white and black stripes"), Some("Black".to_string()));
    }

    #[test]
    fn materials_collect_every_match() {
        assert_eq!(
            match_materials("Blend of 60% Cotton, 35% polyester and 5% elastane."),
            Some("Cotton, Polyester, Elastane".to_string())
        );
        assert_eq!(match_materials("Faux leather"), None);
    }

    #[test]
    fn material_direct_field_is_kept_verbatim() {
        let profile = RetailerProfile::hm();
        let raw = json!({"material": "100% linen", "description": "cotton"});
        assert_eq!(
            material(&RawRecord::new(&raw, &profile, "")).as_deref(),
            Some("100% linen")
        );
    }

    #[test]
    fn length_synonyms_map_to_canonical_term() {
        assert_eq!(match_length("Floor-length satin dress"), Some("Maxi".to_string()));
        assert_eq!(match_length("mid length skirt"), Some("Midi".to_string()));
        assert_eq!(match_length("Knee length shorts"), Some("Knee-length".to_string()));
        assert_eq!(match_length("Short denim skirt"), Some("Mini".to_string()));
        assert_eq!(match_length("Pleated skirt"), None);
    }

    #[test]
    fn length_direct_field_is_capitalized() {
        let profile = RetailerProfile::hm();
        let raw = json!({"title": "Maxi dress", "fit": "regular fit"});
        assert_eq!(
            length(&RawRecord::new(&raw, &profile, "")).as_deref(),
            Some("Regular fit")
        );
    }
}
