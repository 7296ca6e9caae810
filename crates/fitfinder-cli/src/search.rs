//! Search command handlers for the CLI.
//!
//! Both `search` and `classify-file` funnel into [`run_search`], which
//! applies the same validation as `POST /api/scrape` and prints the same JSON
//! envelope.

use fitfinder_core::{AppConfig, RetailerProfile, ScrapeRequest, ScrapeResponse};
use fitfinder_scraper::{aggregate, build_adapters};
use serde_json::{Map, Value};

/// Parse a `key=value` pair passed with `--attr`.
pub(crate) fn parse_attr(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("attribute key is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Build a request body equivalent to what the classifier would post.
///
/// `--color` and `--search-string` win over the same keys given via `--attr`.
pub(crate) fn request_body(
    clothing_type: Option<&str>,
    color: Option<&str>,
    search_string: Option<&str>,
    attrs: &[(String, String)],
) -> Vec<u8> {
    let mut attributes: Map<String, Value> = attrs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    if let Some(color) = color {
        attributes.insert("color".to_string(), Value::String(color.to_string()));
    }
    if let Some(search_string) = search_string {
        attributes.insert(
            "search_string".to_string(),
            Value::String(search_string.to_string()),
        );
    }

    let mut body = Map::new();
    if let Some(clothing_type) = clothing_type {
        body.insert(
            "clothing_type".to_string(),
            Value::String(clothing_type.to_string()),
        );
    }
    if !attributes.is_empty() {
        body.insert("attributes".to_string(), Value::Object(attributes));
    }
    Value::Object(body).to_string().into_bytes()
}

/// Pick the enabled profiles named in `keys`, or all of them when `keys` is
/// empty.
///
/// # Errors
///
/// Returns an error naming the first key that is unknown or disabled.
pub(crate) fn select_profiles(
    enabled: Vec<RetailerProfile>,
    keys: &[String],
) -> anyhow::Result<Vec<RetailerProfile>> {
    if keys.is_empty() {
        return Ok(enabled);
    }
    if let Some(missing) = keys.iter().find(|k| !enabled.iter().any(|p| &p.key == *k)) {
        let known: Vec<&str> = enabled.iter().map(|p| p.key.as_str()).collect();
        anyhow::bail!(
            "retailer '{missing}' is not enabled; enabled retailers: [{}]",
            known.join(", ")
        );
    }
    Ok(enabled
        .into_iter()
        .filter(|p| keys.contains(&p.key))
        .collect())
}

/// Validate `body`, search the selected retailers, and print the response.
///
/// # Errors
///
/// Returns an error if the body fails validation (after printing the failure
/// envelope), or the retailers file cannot be loaded.
pub(crate) async fn run_search(
    config: &AppConfig,
    body: &[u8],
    retailer_keys: &[String],
) -> anyhow::Result<()> {
    let query = match ScrapeRequest::from_json_slice(body) {
        Ok(query) => query,
        Err(e) => {
            print_response(&ScrapeResponse::failure(e.to_string()))?;
            anyhow::bail!("request rejected: {e}");
        }
    };

    let retailers = fitfinder_core::load_retailers_or_builtin(&config.retailers_path)?;
    let profiles = select_profiles(retailers.enabled(), retailer_keys)?;
    let adapters = build_adapters(&profiles, config);

    tracing::info!(
        clothing_type = %query.clothing_type,
        retailers = adapters.len(),
        "starting search"
    );
    let result = aggregate(&query, &adapters).await;
    tracing::info!(query = %result.query, count = result.items.len(), "search finished");

    print_response(&ScrapeResponse::success(result))
}

/// Print every configured retailer with its channels.
///
/// # Errors
///
/// Returns an error if the retailers file exists but cannot be loaded.
pub(crate) fn list_retailers(config: &AppConfig) -> anyhow::Result<()> {
    let retailers = fitfinder_core::load_retailers_or_builtin(&config.retailers_path)?;
    for profile in &retailers.retailers {
        let state = if profile.enabled { "enabled" } else { "disabled" };
        let api = if profile.api_search_url.is_some() {
            "api+page"
        } else {
            "page"
        };
        println!("{:<12} {:<16} {state:<9} {api}", profile.key, profile.label);
    }
    Ok(())
}

fn print_response(response: &ScrapeResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
