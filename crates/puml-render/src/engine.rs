//! Engine and format types, detection and resolution.
//!
//! Diagram source may carry an explicit `@startXXX` marker identifying the
//! engine it targets. Detection is a case-sensitive prefix test only; the
//! rest of the document is never inspected.

use std::borrow::Cow;
use std::fmt;

/// Supported rendering engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Plantuml,
    Graphviz,
    Ditaa,
}

impl Engine {
    /// Parse an engine from its configuration or CLI name.
    ///
    /// Returns `None` for unknown names.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plantuml" => Some(Self::Plantuml),
            "graphviz" => Some(Self::Graphviz),
            "ditaa" => Some(Self::Ditaa),
            _ => None,
        }
    }

    /// Engine name as used in configuration and URLs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plantuml => "plantuml",
            Self::Graphviz => "graphviz",
            Self::Ditaa => "ditaa",
        }
    }

    /// The `@startXXX` marker that identifies this engine in source text.
    #[must_use]
    pub fn start_marker(self) -> &'static str {
        match self {
            Self::Plantuml => "@startuml",
            Self::Graphviz => "@startdot",
            Self::Ditaa => "@startditaa",
        }
    }

    /// The tag used when wrapping untagged content (`@start<tag>`/`@end<tag>`).
    #[must_use]
    pub fn wrap_tag(self) -> &'static str {
        match self {
            Self::Plantuml => "uml",
            Self::Graphviz => "dot",
            Self::Ditaa => "ditaa",
        }
    }

    /// Detect the engine targeted by `content` from its leading marker.
    ///
    /// ```
    /// use puml_render::Engine;
    ///
    /// assert_eq!(Engine::detect("@startdot\ndigraph {}\n@enddot"), Some(Engine::Graphviz));
    /// assert_eq!(Engine::detect("Bob -> Alice"), None);
    /// ```
    #[must_use]
    pub fn detect(content: &str) -> Option<Self> {
        if content.starts_with(Self::Plantuml.start_marker()) {
            return Some(Self::Plantuml);
        }
        if content.starts_with(Self::Graphviz.start_marker()) {
            return Some(Self::Graphviz);
        }
        if content.starts_with(Self::Ditaa.start_marker()) {
            return Some(Self::Ditaa);
        }
        None
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Vector output (default).
    #[default]
    Svg,
    /// Raster output; the only format the remote ditaa renderer supports.
    Png,
}

impl ImageFormat {
    /// Parse a format from its configuration or CLI name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Format name as used in URLs and file extensions.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the engine for a render call and wrap the content if needed.
///
/// Resolution rules:
/// - No engine requested: use the detected engine, falling back to `default`
///   (with a warning) when the content carries no marker. Content is left
///   untouched in both cases.
/// - Engine requested, no marker detected: wrap the content in
///   `@start<tag>`/`@end<tag>` so the server can classify it.
/// - Engine requested but a *different* marker detected: the detected engine
///   wins (with a warning); the content already carries a valid marker and
///   is left untouched.
pub(crate) fn resolve_engine<'a>(
    content: &'a str,
    requested: Option<Engine>,
    default: Engine,
) -> (Engine, Cow<'a, str>) {
    let detected = Engine::detect(content);

    match (requested, detected) {
        (Some(requested), None) => {
            let tag = requested.wrap_tag();
            let wrapped = format!("@start{tag}\n{content}\n@end{tag}");
            (requested, Cow::Owned(wrapped))
        }
        (Some(requested), Some(detected)) => {
            if requested != detected {
                tracing::warn!(
                    "engine mismatch: requested {requested} but content starts with \
                     {marker}, assuming {detected}",
                    marker = detected.start_marker(),
                );
            }
            (detected, Cow::Borrowed(content))
        }
        (None, Some(detected)) => (detected, Cow::Borrowed(content)),
        (None, None) => {
            tracing::warn!("unable to determine the engine, assuming {default}");
            (default, Cow::Borrowed(content))
        }
    }
}

/// Resolve the output format for a render call.
///
/// An explicitly requested format wins. Otherwise the configured default is
/// used, except for ditaa which the remote server only renders to PNG.
pub(crate) fn resolve_format(
    engine: Engine,
    requested: Option<ImageFormat>,
    default: ImageFormat,
) -> ImageFormat {
    match requested {
        Some(format) => format,
        None if engine == Engine::Ditaa => ImageFormat::Png,
        None => default,
    }
}
