use fitfinder_core::DomSelectors;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

/// Scrapes product tiles out of a rendered search page.
///
/// The first tile selector that matches anything decides the tile set. Each
/// tile becomes a flat `{name, price, url, image}` record; tiles with
/// neither a name nor a link are dropped.
pub(crate) fn extract(html: &str, selectors: &DomSelectors) -> Vec<Value> {
    let document = Html::parse_document(html);

    let Some(tiles) = selectors
        .tile
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .map(|selector| document.select(&selector).collect::<Vec<_>>())
        .find(|tiles| !tiles.is_empty())
    else {
        return Vec::new();
    };

    tiles
        .into_iter()
        .filter_map(|tile| tile_record(tile, selectors))
        .collect()
}

fn tile_record(tile: ElementRef<'_>, selectors: &DomSelectors) -> Option<Value> {
    let name = first_text(tile, &selectors.name);
    let url = first_attr(tile, &selectors.link, &["href"]);
    if name.is_none() && url.is_none() {
        return None;
    }

    let mut record = Map::new();
    let fields = [
        ("name", name),
        ("price", first_text(tile, &selectors.price)),
        ("url", url),
        ("image", first_attr(tile, &selectors.image, &["data-src", "src"])),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            record.insert(key.to_string(), Value::String(value));
        }
    }
    Some(Value::Object(record))
}

/// Collapsed text of the first element matched by any selector in order.
fn first_text(tile: ElementRef<'_>, selectors: &[String]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .flat_map(|selector| tile.select(&selector).collect::<Vec<_>>())
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// First non-blank attribute among `attrs`, probed per matched element.
fn first_attr(tile: ElementRef<'_>, selectors: &[String], attrs: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .flat_map(|selector| tile.select(&selector).collect::<Vec<_>>())
        .find_map(|element| {
            attrs
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!(selector = raw, error = %e, "skipping invalid CSS selector");
            None
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
