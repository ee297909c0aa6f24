//! Diagram rendering via a remote `PlantUML` server.
//!
//! This crate turns plain-text diagram markup (`PlantUML`, Graphviz or ditaa)
//! into rendered image bytes by delegating to a `PlantUML` server over HTTP:
//! - Engine auto-detection from `@startXXX` markers, with content wrapping
//!   for untagged sources
//! - The server's custom deflate-based URL encoding
//! - A content-addressed on-disk cache keyed by sha256 digest
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`engine`]: Engine and format types, detection and resolution
//! - [`encode`]: Compression and the server's base64-like text encoding
//! - [`client`]: The [`DiagramServer`] seam and its HTTP implementation
//! - [`cache`]: Content-addressed cache wrapped around a server
//! - [`render`]: The [`Renderer`] orchestrator and file-oriented entry point
//!
//! # Example
//!
//! ```ignore
//! use puml_render::{Renderer, RenderOptions};
//!
//! let renderer = Renderer::new("http://plantuml.com/plantuml/")
//!     .cache_dir("/tmp/puml-cache");
//!
//! let result = renderer.render("Bob -> Alice : hello", &RenderOptions::default())?;
//! std::fs::write(format!("hello.{}", result.format), &result.bytes)?;
//! ```

mod cache;
mod client;
mod consts;
mod encode;
mod engine;
mod error;
mod render;

pub use cache::{content_digest, render_cached};
pub use client::{DiagramServer, RemoteServer};
pub use consts::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};
pub use encode::{compress_and_encode, encode_bytes};
pub use engine::{Engine, ImageFormat};
pub use error::RenderError;
pub use render::{RenderOptions, RenderResult, Renderer};
