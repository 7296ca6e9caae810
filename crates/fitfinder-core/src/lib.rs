//! Shared domain types and configuration for fitfinder.
//!
//! The scraper, server, and CLI crates all speak in terms of the types
//! defined here: the classifier's [`AttributeQuery`], the normalized
//! [`Product`], and the [`AppConfig`] loaded from the environment.

pub mod app_config;
pub mod attributes;
pub mod config;
pub mod products;
pub mod retailers;

pub use app_config::{AppConfig, Environment};
pub use attributes::{AttributeQuery, ScrapeRequest, ValidationError};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{AggregateResult, Availability, Product, ProductAttributes, ScrapeResponse};
pub use retailers::{
    builtin_retailers, load_retailers, load_retailers_or_builtin, DomSelectors, RetailerProfile,
    RetailersFile,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file at {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[from] serde_yaml::Error),

    #[error("retailer config validation failed: {0}")]
    Validation(String),
}
