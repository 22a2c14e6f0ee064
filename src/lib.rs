//! # Trending Digest
//!
//! Collects short-lived trending items (headlines, hot posts, trending
//! repositories) from a fixed set of JSON APIs and HTML pages and normalizes
//! them into one flat list of [`models::Item`]s.
//!
//! ## Architecture
//!
//! 1. **Transport** ([`transport`]): GET with a browser user agent, 10s timeout,
//!    and exponential backoff retry
//! 2. **Sanitizer** ([`sanitize`]): markup to plain text
//! 3. **Sources** ([`sources`]): per-platform extraction, driven by a registry
//!    of JSON paths and CSS selectors
//! 4. **Aggregator** ([`aggregator`]): runs every enabled source, isolates
//!    failures, merges results in configuration order
//!
//! ## Example
//!
//! ```no_run
//! use trending_digest::aggregator::Aggregator;
//! use trending_digest::config::SourcesConfig;
//! use trending_digest::transport::{HttpFetcher, RetryFetch, RetryPolicy};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SourcesConfig::from_json_str(&std::fs::read_to_string("config/sources.json")?)?;
//! let fetcher = RetryFetch::new(HttpFetcher::new()?, RetryPolicy::default());
//! let items = Aggregator::new(fetcher).fetch_all(&config).await;
//! println!("{} items", items.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod sanitize;
pub mod sources;
pub mod transport;
pub mod utils;
