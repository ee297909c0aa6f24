//! Remote render client.
//!
//! [`RemoteServer`] talks to a `PlantUML` server over HTTP. The diagram
//! source travels in the URL path, compressed and encoded with the server's
//! custom scheme: `GET {server}/{format}/{encoded}`.
//!
//! The [`DiagramServer`] trait is the seam between the cache layer and the
//! network; tests substitute a stub implementation for it.

use std::time::Duration;

use ureq::Agent;

use crate::consts::DEFAULT_TIMEOUT;
use crate::encode::compress_and_encode;
use crate::engine::ImageFormat;
use crate::error::RenderError;

/// A service that renders diagram source into image bytes.
///
/// Implemented by [`RemoteServer`] for the real HTTP round-trip. The cache
/// layer only consults a `DiagramServer` on a cache miss.
pub trait DiagramServer {
    /// Render `content` to the given format, returning the raw image bytes.
    ///
    /// A single failed attempt propagates immediately; no retries.
    fn fetch(&self, format: ImageFormat, content: &str) -> Result<Vec<u8>, RenderError>;
}

/// HTTP client for a remote `PlantUML` server.
pub struct RemoteServer {
    url: String,
    agent: Agent,
}

impl RemoteServer {
    /// Create a client for the server at `url` with the default timeout.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit HTTP timeout.
    ///
    /// A timeout surfaces as the same [`RenderError::Transport`] kind as any
    /// other transport failure.
    #[must_use]
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            agent: create_agent(timeout),
        }
    }

    /// The server base URL this client targets.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the request URL for the given format and encoded content.
    fn request_url(&self, format: ImageFormat, encoded: &str) -> String {
        let base = self.url.trim_end_matches('/');
        format!("{base}/{format}/{encoded}")
    }
}

impl DiagramServer for RemoteServer {
    fn fetch(&self, format: ImageFormat, content: &str) -> Result<Vec<u8>, RenderError> {
        let url = self.request_url(format, &compress_and_encode(content));
        tracing::debug!("requesting {url}");

        let response = self.agent.get(&url).call().map_err(|e| RenderError::Transport {
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if !(200..300).contains(&status) {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Transport {
                status: Some(status),
                message: error_body,
            });
        }

        body.read_to_vec().map_err(|e| RenderError::Transport {
            status: Some(status),
            message: e.to_string(),
        })
    }
}

/// Create an HTTP agent with the specified timeout.
///
/// Non-success statuses are handled by the caller rather than mapped to
/// transport errors by the agent itself.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
