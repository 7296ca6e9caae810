//! Browserless `/content` rendering for JavaScript-heavy search pages.

use crate::error::ScraperError;

#[derive(Clone)]
pub struct BrowserlessSettings {
    pub base_url: String,
    pub token: Option<String>,
}

impl BrowserlessSettings {
    #[must_use]
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    fn content_endpoint(&self) -> String {
        match &self.token {
            Some(token) => format!("{}/content?token={token}", self.base_url),
            None => format!("{}/content", self.base_url),
        }
    }
}

/// Fetch fully-rendered HTML for `url` via the `/content` endpoint.
///
/// Transport errors are stripped of their URL, which carries the token.
pub(super) async fn render(
    client: &reqwest::Client,
    settings: &BrowserlessSettings,
    url: &str,
) -> Result<String, ScraperError> {
    let body = serde_json::json!({ "url": url });

    let resp = client
        .post(settings.content_endpoint())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .json(&body)
        .send()
        .await
        .map_err(redacted)?;

    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ScraperError::RateLimited {
            domain: super::extract_domain(&settings.base_url),
            retry_after_secs: None,
        });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(ScraperError::Browserless {
            status: status.as_u16(),
            message,
        });
    }

    resp.text().await.map_err(redacted)
}

fn redacted(err: reqwest::Error) -> ScraperError {
    ScraperError::Http(err.without_url())
}
