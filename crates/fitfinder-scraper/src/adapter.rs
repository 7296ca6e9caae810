//! The per-retailer search seam.

use std::time::Duration;

use async_trait::async_trait;
use fitfinder_core::Product;

use crate::error::ScraperError;
use crate::query::SearchQuery;

/// Upper bound on one search attempt unless an adapter overrides it.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// A retailer that turns a search string into normalized products.
///
/// Implementors provide [`SourceAdapter::search_once`]; callers use
/// [`SourceAdapter::fetch`], which never fails. `fetch` bounds each attempt
/// by [`SourceAdapter::fetch_timeout`], turns errors into an empty list,
/// retries an empty multi-token search exactly once with its first two
/// tokens, and stamps every product's brand with the adapter's label.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used to tag results, e.g. `"zara"`.
    fn key(&self) -> &str;

    /// Display label forced onto every product's brand.
    fn label(&self) -> &str;

    /// Attribute keys holding this retailer's preferred search phrasing.
    fn search_keys(&self) -> Vec<String> {
        vec![format!("{}_search_string", self.key())]
    }

    fn fetch_timeout(&self) -> Duration {
        DEFAULT_FETCH_TIMEOUT
    }

    /// One search attempt with exactly `query`.
    ///
    /// # Errors
    ///
    /// Any [`ScraperError`] raised while retrieving or parsing results.
    async fn search_once(&self, query: &SearchQuery) -> Result<Vec<Product>, ScraperError>;

    async fn fetch(&self, query: &SearchQuery) -> Vec<Product> {
        let mut products = attempt(self, query).await;

        if products.is_empty() {
            if let Some(simpler) = query.simplified() {
                tracing::info!(
                    retailer = self.key(),
                    query = %query,
                    simplified = %simpler,
                    "no products found, retrying with simplified query"
                );
                products = attempt(self, &simpler).await;
            }
        }

        let label = self.label();
        for product in &mut products {
            label.clone_into(&mut product.brand);
        }
        products
    }
}

async fn attempt<A>(adapter: &A, query: &SearchQuery) -> Vec<Product>
where
    A: SourceAdapter + ?Sized,
{
    let timeout = adapter.fetch_timeout();
    let outcome = match tokio::time::timeout(timeout, adapter.search_once(query)).await {
        Ok(result) => result,
        Err(_) => Err(ScraperError::Timeout {
            retailer: adapter.key().to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    };

    match outcome {
        Ok(products) => {
            tracing::debug!(
                retailer = adapter.key(),
                query = %query,
                count = products.len(),
                "search attempt finished"
            );
            products
        }
        Err(e) => {
            tracing::warn!(
                retailer = adapter.key(),
                query = %query,
                error = %e,
                "search attempt failed"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
