use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{first_hit, non_blank, RawRecord, Rule};

static ARTICLE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{7,10})").expect("valid regex"));

const IMAGE_KEYS: &[&str] = &[
    "image",
    "imageUrl",
    "image_url",
    "img",
    "src",
    "thumbnail",
    "mainImage",
];

const IMAGE_ARRAY_KEYS: &[&str] = &["xmedia", "images", "galleryImages", "thumbnails"];

const IMAGE_SUBKEYS: &[&str] = &["url", "src", "path", "imageUrl", "href"];

/// Resolution token substituted for `{width}` placeholders in media URLs.
const MEDIA_WIDTH: &str = "1024";

const RULES: &[Rule<String>] = &[direct_image, media_array, variant_media];

pub(super) fn resolve(record: &RawRecord<'_>) -> Option<String> {
    first_hit(record, RULES).and_then(|raw| finalize(&raw, record))
}

fn direct_image(record: &RawRecord<'_>) -> Option<String> {
    IMAGE_KEYS
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(media_url)
}

fn media_array(record: &RawRecord<'_>) -> Option<String> {
    IMAGE_ARRAY_KEYS
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(|value| value.as_array()?.first().and_then(media_url))
}

fn variant_media(record: &RawRecord<'_>) -> Option<String> {
    record.at("/detail/colors/0/xmedia/0").and_then(media_url)
}

/// A media reference may be a bare string, an object carrying the URL under
/// one of a few keys, or an array whose first element is either.
fn media_url(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_blank(value).map(str::to_string),
        Value::Object(map) => IMAGE_SUBKEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|inner| non_blank(inner).map(str::to_string)),
        Value::Array(items) => items.first().and_then(media_url),
        _ => None,
    }
}

/// Turns a raw media reference into an absolute https URL, rebuilding CDN
/// URLs for retailers that ship bare asset paths.
fn finalize(raw: &str, record: &RawRecord<'_>) -> Option<String> {
    let url = raw.trim().replace("{width}", MEDIA_WIDTH);
    if url.is_empty() {
        return None;
    }

    let Some(template) = record.profile.image_cdn.as_deref() else {
        let absolute = record.profile.absolutize(&url);
        return (!absolute.is_empty()).then(|| upgrade_to_https(&absolute));
    };

    Some(rebuild_cdn_url(&url, template))
}

fn rebuild_cdn_url(url: &str, template: &str) -> String {
    let cdn = |path: &str| template.replace("{path}", path.trim_start_matches('/'));
    let cdn_host = template
        .split("//")
        .nth(1)
        .and_then(|rest| rest.split(['/', '?']).next())
        .unwrap_or_default();

    if !cdn_host.is_empty() && url.contains(cdn_host) {
        return if url.starts_with("//") {
            format!("https:{url}")
        } else if url.starts_with("http://") || url.starts_with("https://") {
            upgrade_to_https(url)
        } else {
            format!("https://{url}")
        };
    }

    if let Some((_, asset_path)) = url.split_once("/assets/hm/") {
        return cdn(asset_path);
    }

    if let Some(rest) = url.strip_prefix("//") {
        let path = rest.split_once('/').map(|(_, p)| p).unwrap_or_default();
        return cdn(path);
    }

    if url.starts_with('/') {
        if let Some(article) = ARTICLE_NUMBER_RE.captures(url).and_then(|c| c.get(1)) {
            return cdn(&format!("productpage/{}", article.as_str()));
        }
        return cdn(url);
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return upgrade_to_https(url);
    }

    cdn(url)
}

fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}
