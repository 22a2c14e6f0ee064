//! # Trending Digest
//!
//! Fetches trending items from every enabled platform in the sources
//! configuration and prints one JSON digest.
//!
//! ## Usage
//!
//! ```sh
//! trending_digest -c config/sources.json -o ./out/digest.json
//! ```
//!
//! Logs go to stderr, so stdout carries only the digest when `-o` is omitted.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use trending_digest::aggregator::{Aggregator, SourceStatus};
use trending_digest::config::load_config;
use trending_digest::models::Digest;
use trending_digest::outputs::json;
use trending_digest::transport::{HttpFetcher, RetryFetch, RetryPolicy};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("trending_digest starting up");

    let args = Cli::parse();
    debug!(config = %args.config, output = ?args.output, concurrency = args.concurrency, "Parsed CLI arguments");

    let config = match load_config(Path::new(&args.config)).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config, error = %e, "Failed to load sources configuration");
            return Err(e.into());
        }
    };
    info!(path = %args.config, platforms = config.len(), "Loaded configuration");

    let fetcher = RetryFetch::new(HttpFetcher::new()?, RetryPolicy::default());
    let aggregator = Aggregator::new(fetcher).with_concurrency(usize::from(args.concurrency));
    let report = aggregator.run(&config).await;

    for outcome in &report.outcomes {
        match &outcome.status {
            SourceStatus::Fetched(_) | SourceStatus::Disabled => {
                debug!(platform = %outcome.platform, status = %outcome.status, "Source outcome");
            }
            SourceStatus::Skipped(_) | SourceStatus::Failed(_) => {
                warn!(platform = %outcome.platform, status = %outcome.status, "Source outcome");
            }
        }
    }
    if report.items.is_empty() {
        warn!(problems = report.problems(), "No items collected; writing an empty digest");
    }

    let digest = Digest::new(&report.items, args.include_meta);
    if let Err(e) = json::write_digest(&digest, args.output.as_deref().map(Path::new)).await {
        error!(error = %e, "Failed to write digest");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
