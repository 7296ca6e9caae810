//! Retrieval channels that turn a retailer response into raw candidates.
//!
//! Channels run in priority order (API capture, structured data, DOM) and
//! the first one that yields any candidate wins. Results are never merged
//! across channels.

pub(crate) mod api;
pub(crate) mod dom;
pub(crate) mod structured;

use serde_json::Value;

use crate::normalize::NAME_KEYS;

/// Maximum nesting depth searched for a product array.
const MAX_WALK_DEPTH: usize = 6;

/// Keys under which retailers keep their product lists.
const PRODUCT_KEYS: &[&str] = &[
    "products",
    "items",
    "results",
    "hits",
    "product",
    "data",
    "productList",
    "searchResult",
    "productGroups",
    "srpProps",
];

/// Which channel produced a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Api,
    Structured,
    Dom,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Api => "api",
            Self::Structured => "structured",
            Self::Dom => "dom",
        })
    }
}

/// Finds the first product array in `root`, searching at most
/// [`MAX_WALK_DEPTH`] levels deep. Returns an empty list when none is found.
pub(crate) fn find_products(root: &Value) -> Vec<Value> {
    walk(root, 0).unwrap_or_default()
}

fn walk(node: &Value, depth: usize) -> Option<Vec<Value>> {
    if depth > MAX_WALK_DEPTH {
        return None;
    }

    match node {
        Value::Array(items) => {
            product_records(items).or_else(|| items.iter().find_map(|item| walk(item, depth + 1)))
        }
        Value::Object(map) => {
            for key in PRODUCT_KEYS {
                match map.get(*key) {
                    Some(Value::Array(items)) => {
                        if let Some(found) = product_records(items) {
                            return Some(found);
                        }
                    }
                    Some(single) if looks_like_product(single) => {
                        return Some(vec![single.clone()]);
                    }
                    _ => {}
                }
            }
            map.values().find_map(|value| walk(value, depth + 1))
        }
        _ => None,
    }
}

/// The product-like elements of `items`, or `None` when there are none.
fn product_records(items: &[Value]) -> Option<Vec<Value>> {
    let found: Vec<Value> = items
        .iter()
        .filter(|item| looks_like_product(item))
        .cloned()
        .collect();
    (!found.is_empty()).then_some(found)
}

/// An object with a name-like key, or a `{content: {...}}` wrapper.
pub(crate) fn looks_like_product(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    NAME_KEYS
        .iter()
        .any(|key| map.get(*key).is_some_and(|v| !v.is_null()))
        || map.get("content").is_some_and(Value::is_object)
}
