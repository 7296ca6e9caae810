//! Concurrent fan-out across every configured retailer.

use std::sync::Arc;

use fitfinder_core::{AggregateResult, AttributeQuery};
use futures::future::join_all;

use crate::adapter::SourceAdapter;
use crate::query::{resolve, SearchQuery};

/// Runs one search per adapter concurrently and merges the results.
///
/// Every adapter gets its own task and its own resolved query. The call
/// waits for all of them; a task that panics contributes nothing. Items are
/// tagged with the key of the adapter that produced them, and the reported
/// query is the longest resolved per-retailer string.
pub async fn aggregate(
    query: &AttributeQuery,
    adapters: &[Arc<dyn SourceAdapter>],
) -> AggregateResult {
    let searches: Vec<(String, SearchQuery)> = adapters
        .iter()
        .map(|adapter| {
            (
                adapter.key().to_string(),
                resolve(query, &adapter.search_keys()),
            )
        })
        .collect();

    let handles = adapters.iter().zip(&searches).map(|(adapter, (_, search))| {
        let adapter = Arc::clone(adapter);
        let search = search.clone();
        tokio::spawn(async move { adapter.fetch(&search).await })
    });
    let outcomes = join_all(handles).await;

    let mut items = Vec::new();
    for ((retailer, search), outcome) in searches.iter().zip(outcomes) {
        let mut products = match outcome {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(
                    retailer = %retailer,
                    query = %search,
                    error = %e,
                    "retailer task failed"
                );
                Vec::new()
            }
        };
        tracing::info!(
            retailer = %retailer,
            query = %search,
            count = products.len(),
            "retailer finished"
        );
        for product in &mut products {
            retailer.clone_into(&mut product.retailer);
        }
        items.append(&mut products);
    }

    let display_query = longest(searches.iter().map(|(_, search)| search))
        .map_or_else(|| resolve(query, &[]), Clone::clone);

    AggregateResult {
        query: display_query.to_string(),
        items,
    }
}

/// The longest query in characters; the first one wins ties.
fn longest<'a>(queries: impl Iterator<Item = &'a SearchQuery>) -> Option<&'a SearchQuery> {
    let chars = |query: &SearchQuery| query.as_str().chars().count();
    queries.reduce(|best, next| {
        if chars(next) > chars(best) {
            next
        } else {
            best
        }
    })
}
