//! Multi-retailer product search for fitfinder.
//!
//! A [`SourceAdapter`] turns one search string into normalized products;
//! [`aggregate`] fans a classifier [`fitfinder_core::AttributeQuery`] out to
//! every adapter at once and merges what comes back.

pub mod adapter;
pub mod aggregate;
pub(crate) mod channels;
pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod retailer;
pub(crate) mod retry;

pub use adapter::{SourceAdapter, DEFAULT_FETCH_TIMEOUT};
pub use aggregate::aggregate;
pub use client::{build_search_url, BrowserlessSettings, ClientSettings, RetailerClient};
pub use error::ScraperError;
pub use normalize::normalize;
pub use query::{resolve, SearchQuery};
pub use retailer::{build_adapters, RetailerAdapter};
