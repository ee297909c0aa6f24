//! Render orchestrator.
//!
//! [`Renderer`] composes engine resolution, format resolution and the
//! content-addressed cache into the public entry points: [`Renderer::render`]
//! for in-memory content and [`Renderer::render_file`] for source files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::render_cached;
use crate::client::{DiagramServer, RemoteServer};
use crate::engine::{Engine, ImageFormat, resolve_engine, resolve_format};
use crate::error::RenderError;

/// Per-call rendering options.
///
/// Unset fields fall back to detection (engine) or the renderer's
/// configured defaults (format).
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderOptions {
    /// Engine to render with. When `None` the engine is auto-detected from
    /// the content's `@startXXX` marker.
    pub engine: Option<Engine>,
    /// Output format. When `None` the configured default applies, except
    /// for ditaa which always renders to PNG.
    pub format: Option<ImageFormat>,
}

/// Result of a render call.
#[derive(Debug)]
pub struct RenderResult {
    /// Raw image bytes as returned by the server or the cache.
    pub bytes: Vec<u8>,
    /// The format that was actually rendered.
    pub format: ImageFormat,
    /// The engine that was used or detected.
    pub engine: Engine,
    /// Sha256 hex digest of the (possibly wrapped) content. Always
    /// computed, also when caching was bypassed for the call.
    pub digest: String,
}

/// Renders diagram content through a remote server with local caching.
///
/// Holds the resolved defaults for a series of render calls. Construct with
/// a server URL and adjust via builder methods, or derive the settings from
/// an application config:
///
/// ```ignore
/// use puml_render::{Engine, ImageFormat, Renderer, RenderOptions};
///
/// let renderer = Renderer::new("http://plantuml.com/plantuml/")
///     .engine(Engine::Plantuml)
///     .format(ImageFormat::Svg)
///     .cache_dir("~/.cache/puml");
///
/// let result = renderer.render("Bob -> Alice : hello", &RenderOptions::default())?;
/// ```
pub struct Renderer {
    server: Box<dyn DiagramServer>,
    default_engine: Engine,
    default_format: ImageFormat,
    use_cache: bool,
    cache_dir: PathBuf,
}

impl Renderer {
    /// Create a renderer against the server at `url`.
    ///
    /// Defaults: engine `plantuml`, format `svg`, caching enabled in
    /// `.puml-cache` under the current directory.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_server(Box::new(RemoteServer::new(url)))
    }

    fn from_server(server: Box<dyn DiagramServer>) -> Self {
        Self {
            server,
            default_engine: Engine::Plantuml,
            default_format: ImageFormat::Svg,
            use_cache: true,
            cache_dir: PathBuf::from(".puml-cache"),
        }
    }

    /// Set the default engine used when detection finds no marker.
    #[must_use]
    pub fn engine(mut self, engine: Engine) -> Self {
        self.default_engine = engine;
        self
    }

    /// Set the default output format.
    #[must_use]
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Enable or disable the content-addressed cache.
    #[must_use]
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the cache directory. The path must already be expanded
    /// (no `~` shorthand).
    #[must_use]
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Create a renderer with an explicit HTTP timeout.
    #[must_use]
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::from_server(Box::new(RemoteServer::with_timeout(url, timeout)))
    }

    /// Replace the server implementation.
    ///
    /// The seam for substituting a stub server in tests or an alternative
    /// transport in embedding applications.
    #[must_use]
    pub fn with_server(mut self, server: Box<dyn DiagramServer>) -> Self {
        self.server = server;
        self
    }

    /// Render diagram content to image bytes.
    ///
    /// Sequences engine resolution (wrapping untagged content when an engine
    /// was requested), format resolution, and the cached fetch. An explicit
    /// `ditaa` + `svg` pairing is rejected before any cache or network
    /// activity, since the remote ditaa renderer has no vector output.
    pub fn render(
        &self,
        content: &str,
        opts: &RenderOptions,
    ) -> Result<RenderResult, RenderError> {
        if opts.engine == Some(Engine::Ditaa) && opts.format == Some(ImageFormat::Svg) {
            return Err(RenderError::Configuration(
                "the ditaa engine does not support the svg format".to_owned(),
            ));
        }

        let (engine, content) = resolve_engine(content, opts.engine, self.default_engine);
        let format = resolve_format(engine, opts.format, self.default_format);

        let (bytes, digest) = render_cached(
            self.server.as_ref(),
            format,
            &content,
            self.use_cache,
            &self.cache_dir,
        )?;

        Ok(RenderResult {
            bytes,
            format,
            engine,
            digest,
        })
    }

    /// Render a source file and write the image to disk.
    ///
    /// When `output` is `None` the destination is derived from the source's
    /// file stem and the resolved format (`diagram.uml` rendering to svg
    /// becomes `diagram.svg` in the current directory). The output file is
    /// only written when the render succeeded. Returns the destination path.
    pub fn render_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        opts: &RenderOptions,
    ) -> Result<PathBuf, RenderError> {
        let content = fs::read_to_string(input)?;
        let result = self.render(&content, opts)?;

        let outfile = match output {
            Some(path) => path.to_path_buf(),
            None => {
                let stem = input
                    .file_stem()
                    .map_or_else(|| "diagram".into(), |s| s.to_string_lossy());
                PathBuf::from(format!("{stem}.{}", result.format))
            }
        };

        fs::write(&outfile, &result.bytes)?;
        Ok(outfile)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    /// Stub server recording the content and format of every fetch.
    #[derive(Default)]
    struct RecordingServer {
        requests: RefCell<Vec<(ImageFormat, String)>>,
    }

    impl DiagramServer for Rc<RecordingServer> {
        fn fetch(&self, format: ImageFormat, content: &str) -> Result<Vec<u8>, RenderError> {
            self.requests.borrow_mut().push((format, content.to_owned()));
            Ok(format!("<svg>{content}</svg>").into_bytes())
        }
    }

    fn stub_server() -> Rc<RecordingServer> {
        Rc::new(RecordingServer::default())
    }

    fn renderer_with_stub(tmp: &TempDir) -> Renderer {
        Renderer::new("http://stub.invalid/")
            .with_server(Box::new(stub_server()))
            .cache_dir(tmp.path().join("cache"))
    }

    #[test]
    fn test_render_default_engine_and_format() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let result = renderer
            .render("Bob -> Alice : hello", &RenderOptions::default())
            .unwrap();

        // No marker, no requested engine: configured defaults apply
        assert_eq!(result.engine, Engine::Plantuml);
        assert_eq!(result.format, ImageFormat::Svg);
        assert_eq!(result.digest.len(), 64);
        let rendered = String::from_utf8(result.bytes).unwrap();
        assert!(rendered.contains("Bob"));
        assert!(rendered.contains("Alice"));
    }

    #[test]
    fn test_render_wraps_for_requested_engine() {
        let tmp = TempDir::new().unwrap();
        let server = stub_server();
        let renderer = Renderer::new("http://stub.invalid/")
            .with_server(Box::new(Rc::clone(&server)))
            .use_cache(false)
            .cache_dir(tmp.path());

        let opts = RenderOptions {
            engine: Some(Engine::Graphviz),
            format: None,
        };
        renderer.render("digraph G { a -> b }", &opts).unwrap();

        let requests = server.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, "@startdot\ndigraph G { a -> b }\n@enddot");
    }

    #[test]
    fn test_render_digest_covers_wrapped_content() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let opts = RenderOptions {
            engine: Some(Engine::Graphviz),
            format: None,
        };
        let result = renderer.render("digraph G {}", &opts).unwrap();

        assert_eq!(
            result.digest,
            crate::cache::content_digest("@startdot\ndigraph G {}\n@enddot")
        );
    }

    #[test]
    fn test_render_rejects_explicit_ditaa_svg() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let opts = RenderOptions {
            engine: Some(Engine::Ditaa),
            format: Some(ImageFormat::Svg),
        };
        let err = renderer.render("+--+\n|  |\n+--+", &opts).unwrap_err();

        assert!(matches!(err, RenderError::Configuration(_)));
        // Rejected before any cache activity
        assert!(!tmp.path().join("cache").exists());
    }

    #[test]
    fn test_render_ditaa_defaults_to_png() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let opts = RenderOptions {
            engine: Some(Engine::Ditaa),
            format: None,
        };
        let result = renderer.render("+--+\n|  |\n+--+", &opts).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
    }

    #[test]
    fn test_render_detected_engine_wins_over_requested() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let opts = RenderOptions {
            engine: Some(Engine::Ditaa),
            format: None,
        };
        let result = renderer
            .render("@startuml\nBob -> Alice : hello\n@enduml", &opts)
            .unwrap();

        // The in-content marker takes precedence, and with it the svg default
        assert_eq!(result.engine, Engine::Plantuml);
        assert_eq!(result.format, ImageFormat::Svg);
    }

    #[test]
    fn test_render_file_writes_explicit_output() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let input = tmp.path().join("sequence.uml");
        fs::write(&input, "@startuml\nA -> B\n@enduml").unwrap();
        let explicit = tmp.path().join("out.svg");

        let outfile = renderer
            .render_file(&input, Some(&explicit), &RenderOptions::default())
            .unwrap();

        assert_eq!(outfile, explicit);
        assert!(fs::read(&outfile).unwrap().starts_with(b"<svg>"));
    }

    #[test]
    fn test_render_file_missing_input_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let renderer = renderer_with_stub(&tmp);

        let err = renderer
            .render_file(
                &tmp.path().join("nonexistent.uml"),
                None,
                &RenderOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
