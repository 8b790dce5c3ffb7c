//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the HTTP listener binds.

use std::path::Path;

use tracing::{info, warn};

/// Check that the data file can be read. Logs the outcome and returns
/// whether the file was readable; a missing file is not an error here.
pub async fn check_readable(data_file: &Path) -> bool {
    match tokio::fs::read(data_file).await {
        Ok(bytes) => {
            info!(path = %data_file.display(), bytes = bytes.len(), "data file readable");
            true
        }
        Err(e) => {
            warn!(path = %data_file.display(), error = %e, "data file not readable");
            false
        }
    }
}
