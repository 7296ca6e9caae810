//! HTTP client for retailer search endpoints and pages.

mod browserless;
mod origin;

use std::time::Duration;

use fitfinder_core::AppConfig;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::ScraperError;
use crate::retry::RetryPolicy;

pub use browserless::BrowserlessSettings;
pub use origin::{extract_domain, extract_origin};

/// Everything needed to open a [`RetailerClient`].
///
/// Adapters keep one of these and open a fresh client for every search call,
/// so concurrent searches never share a connection pool.
#[derive(Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after a transient failure (429, 502-504, network).
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    /// Optional headless render service used for HTML pages.
    pub browserless: Option<BrowserlessSettings>,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .field("browserless", &self.browserless.as_ref().map(|b| &b.base_url))
            .finish()
    }
}

impl ClientSettings {
    #[must_use]
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.to_owned(),
            max_retries,
            backoff_base_secs,
            browserless: None,
        }
    }

    /// Settings from the `FITFINDER_SCRAPER_*` and `FITFINDER_BROWSERLESS_*`
    /// values of `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let browserless = config
            .browserless_url
            .as_deref()
            .map(|url| BrowserlessSettings::new(url, config.browserless_token.as_deref()));
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
        .with_browserless(browserless)
    }

    #[must_use]
    pub fn with_browserless(mut self, settings: Option<BrowserlessSettings>) -> Self {
        self.browserless = settings;
        self
    }
}

/// HTTP client for one retailer search call.
///
/// Maps 429, 404, and other non-2xx responses to typed errors. Transient
/// failures are repeated according to the settings' retry budget.
pub struct RetailerClient {
    client: Client,
    retry: RetryPolicy,
    browserless: Option<BrowserlessSettings>,
}

impl RetailerClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn open(settings: &ClientSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy::new(settings.max_retries, settings.backoff_base_secs),
            browserless: settings.browserless.clone(),
        })
    }

    /// GETs `url` and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`]: body is not valid JSON (not retried).
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, ScraperError> {
        let body = self
            .get_text(url, "application/json,text/plain;q=0.9,*/*;q=0.8")
            .await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("search response from {}", extract_domain(url)),
            source: e,
        })
    }

    /// Fetches the HTML of `url`, rendered through Browserless when configured.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_json`] minus `Deserialize`, plus
    /// [`ScraperError::Browserless`] when the render service rejects the call.
    pub async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        if let Some(settings) = &self.browserless {
            return self
                .retry
                .run(|| browserless::render(&self.client, settings, url))
                .await;
        }
        self.get_text(
            url,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .await
    }

    async fn get_text(&self, url: &str, accept: &str) -> Result<String, ScraperError> {
        let referer = extract_origin(url);
        self.retry
            .run(|| self.send_once(url, accept, &referer))
            .await
    }

    async fn send_once(
        &self,
        url: &str,
        accept: &str,
        referer: &str,
    ) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, referer)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs: response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok()),
            }),
            reqwest::StatusCode::NOT_FOUND => Err(ScraperError::NotFound {
                url: url.to_owned(),
            }),
            status if !status.is_success() => Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            }),
            _ => Ok(response.text().await?),
        }
    }
}

/// Substitutes the URL-encoded `query` into a `{query}` template.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the result is not an absolute URL.
pub fn build_search_url(template: &str, query: &str) -> Result<String, ScraperError> {
    let encoded = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC).to_string();
    let url = template.replace("{query}", &encoded);
    reqwest::Url::parse(&url).map_err(|e| ScraperError::InvalidUrl {
        url: url.clone(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
