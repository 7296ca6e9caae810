use fitfinder_core::RetailerProfile;
use serde_json::Value;

use super::find_products;
use crate::client::{build_search_url, RetailerClient};
use crate::error::ScraperError;

/// Queries the retailer's JSON search endpoint. Retailers without one yield
/// an empty list without any request.
///
/// # Errors
///
/// Propagates transport, status, and JSON errors from [`RetailerClient`].
pub(crate) async fn search(
    client: &RetailerClient,
    profile: &RetailerProfile,
    query: &str,
) -> Result<Vec<Value>, ScraperError> {
    let Some(template) = profile.api_search_url.as_deref() else {
        return Ok(Vec::new());
    };
    let url = build_search_url(template, query)?;
    let body = client.get_json(&url).await?;
    Ok(find_products(&body))
}
