//! Structured data embedded in a search page: schema.org JSON-LD blocks
//! and serialized front-end application state.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use super::find_products;

static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static APP_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.(?:__INITIAL_STATE__|__PRELOADED_STATE__)\s*=\s*").expect("valid regex")
});

const STATE_SOURCES: &[fn(&str) -> Option<Value>] = &[next_data, app_state];

/// Nesting bound for the JSON-LD product search.
const MAX_JSON_LD_DEPTH: usize = 6;

/// Extracts candidate product records from `html`.
///
/// JSON-LD `Product` nodes win over application state; within application
/// state `__NEXT_DATA__` is tried before `window.__INITIAL_STATE__` and
/// `window.__PRELOADED_STATE__`.
pub(crate) fn extract(html: &str) -> Vec<Value> {
    let from_json_ld = json_ld_products(html);
    if !from_json_ld.is_empty() {
        return from_json_ld;
    }

    STATE_SOURCES
        .iter()
        .filter_map(|source| source(html))
        .map(|state| find_products(&state))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

fn json_ld_products(html: &str) -> Vec<Value> {
    let mut products = Vec::new();

    for cap in JSON_LD_RE.captures_iter(html) {
        let Some(text) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            tracing::debug!("skipping unparseable JSON-LD block");
            continue;
        };
        collect_json_ld(&value, 0, &mut products);
    }

    products
}

fn collect_json_ld(node: &Value, depth: usize, out: &mut Vec<Value>) {
    if depth > MAX_JSON_LD_DEPTH {
        return;
    }

    match node {
        Value::Array(items) => {
            for item in items {
                collect_json_ld(item, depth + 1, out);
            }
        }
        Value::Object(map) => {
            if has_type(node, "Product") {
                out.push(node.clone());
                return;
            }
            if let Some(graph) = map.get("@graph") {
                collect_json_ld(graph, depth + 1, out);
            }
            if has_type(node, "ItemList") {
                if let Some(elements) = map.get("itemListElement") {
                    collect_json_ld(elements, depth + 1, out);
                }
            }
            if let Some(item) = map.get("item") {
                collect_json_ld(item, depth + 1, out);
            }
        }
        _ => {}
    }
}

/// `@type` (or bare `type`) equals `wanted`, either directly or as one entry
/// of an array.
fn has_type(node: &Value, wanted: &str) -> bool {
    let Some(type_node) = node.get("@type").or_else(|| node.get("type")) else {
        return false;
    };
    match type_node {
        Value::String(s) => s.eq_ignore_ascii_case(wanted),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}

fn next_data(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[id="__NEXT_DATA__"]"#).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    serde_json::from_str(&text).ok()
}

/// The first `window.__INITIAL_STATE__ = {...}` style assignment that parses.
fn app_state(html: &str) -> Option<Value> {
    APP_STATE_RE.find_iter(html).find_map(|m| {
        let literal = balanced_json(&html[m.end()..])?;
        serde_json::from_str(literal).ok()
    })
}

/// The shortest prefix of `s` forming a complete JSON object or array.
///
/// Tracks bracket depth while skipping string literals and escapes, so
/// braces inside strings do not count.
fn balanced_json(s: &str) -> Option<&str> {
    let close = match s.chars().next()? {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return (c == close).then(|| &s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn page(body: &str) -> String {
        format!("<html><head><title>Search</title></head><body>{body}</body></html>")
    }

    #[test]
    fn json_ld_product_nodes() {
        let html = page(
            r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Product","name":"Satin midi skirt",
             "image":["https://img.example.com/a.jpg"],"offers":{"price":"39.99"}}
            </script>"#,
        );
        let found = extract(&html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "Satin midi skirt");
    }

    #[test]
    fn json_ld_item_list_and_graph() {
        let html = page(
            r#"<script type='application/ld+json'>
            {"@graph":[
              {"@type":"WebPage","name":"Results"},
              {"@type":"ItemList","itemListElement":[
                {"@type":"ListItem","position":1,"item":{"@type":"Product","name":"A"}},
                {"@type":"ListItem","position":2,"item":{"@type":["Product","Thing"],"name":"B"}}
              ]}
            ]}
            </script>"#,
        );
        let names: Vec<_> = extract(&html).iter().map(|p| p["name"].clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("B")]);
    }

    #[test]
    fn json_ld_without_products_falls_through_to_state() {
        let html = page(
            r#"<script type="application/ld+json">{"@type":"Organization","name":"Zara"}</script>
            <script>window.__INITIAL_STATE__ = {"search":{"products":[{"name":"From state"}]}};</script>"#,
        );
        assert_eq!(extract(&html), vec![json!({"name": "From state"})]);
    }

    #[test]
    fn next_data_script() {
        let html = page(
            r#"<script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"srpProps":{"hits":[{"title":"Linen shirt"}]}}}}
            </script>"#,
        );
        assert_eq!(extract(&html), vec![json!({"title": "Linen shirt"})]);
    }

    #[test]
    fn preloaded_state_with_braces_in_strings() {
        let html = page(
            r#"<script>window.__PRELOADED_STATE__={"items":[{"name":"Top {new}","url":"/p/1"}]};
            var other = {"x": 1};</script>"#,
        );
        assert_eq!(
            extract(&html),
            vec![json!({"name": "Top {new}", "url": "/p/1"})]
        );
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let html = page(
            r#"<script type="application/ld+json">{not json</script>
            <script>window.__INITIAL_STATE__ = {"items": [</script>"#,
        );
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn plain_page_yields_nothing() {
        assert!(extract(&page("<ul><li>No data here</li></ul>")).is_empty());
    }

    #[test]
    fn balanced_json_stops_at_matching_close() {
        assert_eq!(balanced_json(r#"{"a":[1,2]} trailing"#), Some(r#"{"a":[1,2]}"#));
        assert_eq!(balanced_json(r#"[{"a":"]"}],"#), Some(r#"[{"a":"]"}]"#));
        assert_eq!(balanced_json("[42}"), None);
        assert_eq!(balanced_json("nope"), None);
    }
}
