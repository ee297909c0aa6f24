//! Content-addressed render cache.
//!
//! Entries live at `{cache_dir}/{sha256-digest}.{format}` and hold the exact
//! bytes returned by the server. Content-addressing makes the cache
//! trivially consistent: a digest either exists with the right content or
//! not at all, so entries are never re-validated against the server and
//! never rewritten in place. Concurrent writers for the same digest produce
//! byte-identical output, so a lost write is harmless.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::client::DiagramServer;
use crate::engine::ImageFormat;
use crate::error::RenderError;

/// Compute the sha256 hex digest of diagram content.
///
/// This is the cache's primary key, computed over the UTF-8 bytes of the
/// (possibly wrapped) source.
#[must_use]
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Render `content` via `server`, consulting the cache first.
///
/// The digest is always computed and returned, even when `use_cache` is
/// false (in which case no disk access happens at all). On a cache miss the
/// cache directory is created if needed, the server is consulted once, and
/// the result is written before returning. A read or write failure aborts
/// the call; the cache is never silently bypassed.
pub fn render_cached(
    server: &dyn DiagramServer,
    format: ImageFormat,
    content: &str,
    use_cache: bool,
    cache_dir: &Path,
) -> Result<(Vec<u8>, String), RenderError> {
    let digest = content_digest(content);

    if !use_cache {
        return Ok((server.fetch(format, content)?, digest));
    }

    let cache_file = cache_dir.join(format!("{digest}.{format}"));

    tracing::debug!("probing cache file {}", cache_file.display());
    if cache_file.is_file() {
        let bytes = fs::read(&cache_file).map_err(|source| RenderError::CacheIo {
            path: cache_file.clone(),
            source,
        })?;
        return Ok((bytes, digest));
    }

    // Idempotent: a concurrent process creating the same directory is fine
    fs::create_dir_all(cache_dir).map_err(|source| RenderError::CacheIo {
        path: cache_dir.to_path_buf(),
        source,
    })?;

    let bytes = server.fetch(format, content)?;

    fs::write(&cache_file, &bytes).map_err(|source| RenderError::CacheIo {
        path: cache_file.clone(),
        source,
    })?;
    tracing::debug!("wrote cache file {}", cache_file.display());

    Ok((bytes, digest))
}
