//! Output generation for the aggregated digest.
//!
//! # Submodules
//!
//! - [`json`]: Writes the `{"total", "items"}` digest to stdout or a file

pub mod json;
