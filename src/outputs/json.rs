//! JSON output of the aggregated digest.
//!
//! The document has the shape consumers expect:
//! ```text
//! {
//!   "total": 2,
//!   "items": [
//!     { "title": "...", "url": "...", "platform": "zhihu", "platform_icon": "📘", "content": "..." },
//!     ...
//!   ]
//! }
//! ```

use crate::models::Digest;
use crate::utils::ensure_parent_writable;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, stdout};
use tracing::{error, info, instrument};

/// Serialize `digest` as pretty-printed JSON.
pub fn render(digest: &Digest<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(digest)
}

/// Write `digest` to `output`, or to stdout when `output` is `None`.
///
/// # Arguments
///
/// * `digest` - The digest to serialize
/// * `output` - Destination file; parent directories are created as needed
///
/// # Returns
///
/// `Ok(())` on success, or an error if serialization, directory creation or
/// writing fails.
#[instrument(level = "info", skip_all, fields(total = digest.total))]
pub async fn write_digest(digest: &Digest<'_>, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut json = render(digest)?;
    json.push('\n');

    match output {
        Some(path) => {
            if let Err(e) = ensure_parent_writable(path).await {
                error!(path = %path.display(), error = %e, "Output location is not writable");
                return Err(e);
            }
            fs::write(path, json).await?;
            info!(path = %path.display(), "Wrote digest");
        }
        None => {
            let mut out = stdout();
            out.write_all(json.as_bytes()).await?;
            out.flush().await?;
        }
    }
    Ok(())
}
