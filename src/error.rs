//! Error types for the fetch, extraction and configuration layers.
//!
//! Errors are grouped by the boundary that absorbs them:
//! - [`FetchError`]: a request that still failed after every retry attempt.
//!   Absorbed by the multi-endpoint loop or by the aggregator.
//! - [`SourceError`]: anything that makes a whole source (or endpoint) fail.
//! - [`ConfigError`]: a platform entry that cannot be turned into a source, or a
//!   configuration document that cannot be read at all.
//!
//! Malformed individual records never produce an error value; extraction skips them.

use std::path::PathBuf;
use thiserror::Error;

/// A transport failure surfaced after retries are exhausted.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body-read failure.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that was requested.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} responded with HTTP {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The status the server returned.
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    /// The URL this error refers to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}

/// Failure of a single source or endpoint.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The body did not have the shape the source's kind requires.
    #[error("{platform}: expected a {expected} body from {url}")]
    UnexpectedPayload {
        platform: String,
        url: String,
        expected: &'static str,
    },
}

/// A platform entry (or the whole document) that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no source registered for platform `{0}`")]
    UnknownPlatform(String),

    #[error("platform `{platform}` is missing required field `{field}`")]
    MissingField {
        platform: String,
        field: &'static str,
    },

    #[error("platform `{platform}` is declared as `{declared}` but is registered as `{registered}`")]
    KindMismatch {
        platform: String,
        declared: &'static str,
        registered: &'static str,
    },

    #[error("platform `{platform}` has an invalid entry: {source}")]
    InvalidEntry {
        platform: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("platform `{platform}` uses an invalid selector `{selector}`")]
    Selector { platform: String, selector: String },

    #[error("platform `{platform}` has an invalid origin `{origin}`: {source}")]
    Origin {
        platform: String,
        origin: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_url_and_status() {
        let err = FetchError::Status {
            url: "https://example.com/hot".to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/hot"));
        assert!(msg.contains("503"));
        assert_eq!(err.url(), "https://example.com/hot");
    }

    #[test]
    fn test_source_error_wraps_fetch_error_transparently() {
        let fetch = FetchError::Status {
            url: "https://example.com".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        let expected = fetch.to_string();
        let err = SourceError::from(fetch);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_missing_field_message() {
        let err = ConfigError::MissingField {
            platform: "zhihu".to_string(),
            field: "url",
        };
        assert_eq!(
            err.to_string(),
            "platform `zhihu` is missing required field `url`"
        );
    }
}
