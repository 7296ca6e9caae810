use axum::{body::Bytes, extract::State, Extension, Json};
use fitfinder_core::{ScrapeRequest, ScrapeResponse};
use fitfinder_scraper::aggregate;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// `POST /api/scrape`: validates a classifier record and searches every
/// configured retailer with it.
pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let query = ScrapeRequest::from_json_slice(&body).map_err(|e| {
        tracing::warn!(request_id = %req_id.0, error = %e, "rejected scrape request");
        ApiError::from(e)
    })?;

    tracing::info!(
        request_id = %req_id.0,
        clothing_type = %query.clothing_type,
        retailers = state.adapters.len(),
        "starting scrape"
    );

    let result = aggregate(&query, &state.adapters).await;

    tracing::info!(
        request_id = %req_id.0,
        query = %result.query,
        count = result.items.len(),
        "scrape finished"
    );

    Ok(Json(ScrapeResponse::success(result)))
}
