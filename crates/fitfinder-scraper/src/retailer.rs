//! Profile-driven adapter used for every configured storefront.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fitfinder_core::{AppConfig, Product, RetailerProfile};
use serde_json::Value;

use crate::adapter::{SourceAdapter, DEFAULT_FETCH_TIMEOUT};
use crate::channels::{api, dom, structured, Channel};
use crate::client::{build_search_url, ClientSettings, RetailerClient};
use crate::error::ScraperError;
use crate::normalize::normalize;
use crate::query::SearchQuery;

/// A [`SourceAdapter`] driven entirely by a [`RetailerProfile`].
///
/// Each search opens its own [`RetailerClient`], tries the JSON search
/// endpoint (when the profile has one), then the HTML search page's
/// structured data, then its product tiles.
#[derive(Debug, Clone)]
pub struct RetailerAdapter {
    profile: RetailerProfile,
    settings: ClientSettings,
    fetch_timeout: Duration,
}

impl RetailerAdapter {
    #[must_use]
    pub fn new(profile: RetailerProfile, settings: ClientSettings) -> Self {
        Self {
            profile,
            settings,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    async fn candidates(
        &self,
        client: &RetailerClient,
        query: &str,
    ) -> Result<(Channel, Vec<Value>), ScraperError> {
        let retailer = self.profile.key.as_str();

        if self.profile.api_search_url.is_some() {
            match api::search(client, &self.profile, query).await {
                Ok(found) if !found.is_empty() => return Ok((Channel::Api, found)),
                Ok(_) => tracing::debug!(retailer, query, "api channel returned no products"),
                Err(e) => tracing::warn!(
                    retailer,
                    query,
                    error = %e,
                    "api channel failed, falling back to search page"
                ),
            }
        }

        let url = build_search_url(&self.profile.page_search_url, query)?;
        let html = client.get_html(&url).await?;

        let found = structured::extract(&html);
        if !found.is_empty() {
            return Ok((Channel::Structured, found));
        }
        Ok((Channel::Dom, dom::extract(&html, &self.profile.dom)))
    }
}

/// One adapter per enabled profile, configured from `config`.
#[must_use]
pub fn build_adapters(
    profiles: &[RetailerProfile],
    config: &AppConfig,
) -> Vec<Arc<dyn SourceAdapter>> {
    let settings = ClientSettings::from_config(config);
    let timeout = Duration::from_secs(config.scraper_fetch_timeout_secs);
    profiles
        .iter()
        .filter(|profile| profile.enabled)
        .map(|profile| {
            let adapter = RetailerAdapter::new(profile.clone(), settings.clone())
                .with_fetch_timeout(timeout);
            Arc::new(adapter) as Arc<dyn SourceAdapter>
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for RetailerAdapter {
    fn key(&self) -> &str {
        &self.profile.key
    }

    fn label(&self) -> &str {
        &self.profile.label
    }

    fn search_keys(&self) -> Vec<String> {
        self.profile.search_keys()
    }

    fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    async fn search_once(&self, query: &SearchQuery) -> Result<Vec<Product>, ScraperError> {
        let client = RetailerClient::open(&self.settings)?;
        let (channel, raw) = self.candidates(&client, query.as_str()).await?;

        tracing::info!(
            retailer = %self.profile.key,
            query = %query,
            channel = %channel,
            count = raw.len(),
            "retrieved candidates"
        );

        Ok(raw
            .iter()
            .map(|record| normalize(record, query.as_str(), &self.profile))
            .collect())
    }
}
