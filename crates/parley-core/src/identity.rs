//! System prompt loading

use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Default identity file name inside the data directory
pub const IDENTITY_FILE: &str = "IDENTITY.md";

/// Read the system prompt from `path`.
///
/// A missing file yields an empty prompt. Any other read failure is logged
/// and also yields an empty prompt; startup never aborts here.
pub async fn load_identity(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            info!(path = %path.display(), bytes = text.len(), "Loaded identity");
            text
        }
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read identity file");
            String::new()
        }
    }
}
