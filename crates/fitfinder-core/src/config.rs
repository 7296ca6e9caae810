use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like default user agent. Retailer search pages serve a stripped
/// or blocked response to obvious bot agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("FITFINDER_ENV", "development"))?;

    let bind_addr = or_default("FITFINDER_BIND_ADDR", "0.0.0.0:5002")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("FITFINDER_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("FITFINDER_LOG_LEVEL", "info");
    let retailers_path = PathBuf::from(or_default(
        "FITFINDER_RETAILERS_PATH",
        "./config/retailers.yaml",
    ));

    let scraper_request_timeout_secs = parse_u64("FITFINDER_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_fetch_timeout_secs = parse_u64("FITFINDER_SCRAPER_FETCH_TIMEOUT_SECS", "300")?;
    let scraper_user_agent = or_default("FITFINDER_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_retries = parse_u32("FITFINDER_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("FITFINDER_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;

    if scraper_fetch_timeout_secs == 0 {
        return Err(invalid(
            "FITFINDER_SCRAPER_FETCH_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let browserless_url = optional("FITFINDER_BROWSERLESS_URL");
    let browserless_token = optional("FITFINDER_BROWSERLESS_TOKEN");

    let rate_limit_per_minute = parse_usize("FITFINDER_RATE_LIMIT_PER_MINUTE", "5")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "FITFINDER_RATE_LIMIT_PER_MINUTE",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        retailers_path,
        scraper_request_timeout_secs,
        scraper_fetch_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        browserless_url,
        browserless_token,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FITFINDER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
