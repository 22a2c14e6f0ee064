//! Command-line interface definitions for Trending Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The configuration path can also be provided via an environment variable.

use clap::Parser;

/// Command-line arguments for the Trending Digest application.
///
/// # Examples
///
/// ```sh
/// # Use config/sources.json and print the digest to stdout
/// trending_digest
///
/// # Custom config, write to a file, fetch four sources at a time
/// trending_digest -c ./sources.yaml -o ./out/digest.json --concurrency 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the sources configuration (JSON, or YAML by extension)
    #[arg(short, long, env = "TRENDING_CONFIG", default_value = "config/sources.json")]
    pub config: String,

    /// Write the digest to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Maximum number of sources fetched at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Include `raw_category` and `fetched_at` in every digest entry
    #[arg(long)]
    pub include_meta: bool,
}
