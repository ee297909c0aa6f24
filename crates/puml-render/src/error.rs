//! Render error types.

use std::path::PathBuf;

/// Error raised by the render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An unresolvable engine/format combination was requested.
    ///
    /// Detected before any cache or network activity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote server was unreachable or returned a non-success status.
    #[error("server request failed{}: {message}", status_suffix(*.status))]
    Transport {
        /// HTTP status, if a response was received at all.
        status: Option<u16>,
        /// Transport failure or response body excerpt.
        message: String,
    },

    /// The cache entry could not be read or written.
    #[error("cache I/O error at {}: {source}", path.display())]
    CacheIo {
        /// Path of the cache entry or directory involved.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// I/O error outside the cache (source or output files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}
