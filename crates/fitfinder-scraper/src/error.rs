use thiserror::Error;

/// Failure of one retailer search call. Adapters log these and report an
/// empty product list; they never reach the aggregator.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not parse {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 429. `retry_after_secs` is the `Retry-After` hint, when sent.
    #[error("rate limited by {domain}")]
    RateLimited {
        domain: String,
        retry_after_secs: Option<u64>,
    },

    #[error("search page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("{retailer} search timed out after {timeout_secs}s")]
    Timeout { retailer: String, timeout_secs: u64 },

    #[error("invalid search URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("browserless render failed with status {status}: {message}")]
    Browserless { status: u16, message: String },
}
