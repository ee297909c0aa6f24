//! puml CLI - render `PlantUML`, Graphviz and ditaa diagrams.
//!
//! Renders each source file via a remote `PlantUML` server, caching results
//! locally by content digest:
//!
//! ```text
//! puml sequence.uml
//! puml --engine graphviz --format png graph.dot
//! puml --server http://localhost:8080/plantuml/ --no-cache *.uml
//! ```

mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use puml_config::{CliSettings, Config};
use puml_render::{Engine, ImageFormat, RenderOptions, Renderer};

use error::CliError;
use output::Output;

/// Client for the `PlantUML` server.
#[derive(Parser)]
#[command(name = "puml", version, about)]
struct Cli {
    /// Engine to use to render diagrams (default: auto-detect).
    #[arg(long, value_parser = ["plantuml", "graphviz", "ditaa"])]
    engine: Option<String>,

    /// Diagram export format (default: from configuration).
    #[arg(long, value_parser = ["svg", "png"])]
    format: Option<String>,

    /// Server to use for rendering (overrides configuration).
    #[arg(long)]
    server: Option<String>,

    /// Do not use the local render cache.
    #[arg(long)]
    no_cache: bool,

    /// Directory to store cached renders (overrides configuration).
    #[arg(long)]
    cache_dir: Option<String>,

    /// Path to an rc file (default: layered ~/.pumlrc and project .pumlrc).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity level (-v warn, -vv info, -vvv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Source files to render.
    #[arg(required = true)]
    sources: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("warn"),
        2 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &Output) -> Result<(), CliError> {
    // Engine/format names are constrained by clap, so parsing cannot fail
    let engine = cli.engine.as_deref().and_then(Engine::parse);
    let format = cli.format.as_deref().and_then(ImageFormat::parse);

    // Reject impossible combinations before touching the network or cache
    if engine == Some(Engine::Ditaa) && format == Some(ImageFormat::Svg) {
        return Err(CliError::Validation(
            "the ditaa engine does not support the svg format".to_owned(),
        ));
    }

    for src in &cli.sources {
        if !src.is_file() {
            return Err(CliError::Validation(format!(
                "no such file: {}",
                src.display()
            )));
        }
    }

    let cli_settings = CliSettings {
        engine: None,
        format: None,
        server: cli.server.clone(),
        use_cache: cli.no_cache.then_some(false),
        cache_dir: cli.cache_dir.clone(),
    };
    let config = Config::load(cli.config.as_deref(), Some(&cli_settings))?;

    let renderer = Renderer::new(config.server.clone())
        .engine(config.engine)
        .format(config.format)
        .use_cache(config.use_cache)
        .cache_dir(config.cache_dir.clone());

    // Per-file options: --engine/--format act per render call so that
    // in-content markers can still override them
    let opts = RenderOptions { engine, format };

    for src in &cli.sources {
        let destination = renderer.render_file(src, None, &opts)?;
        output.info(&format!(
            "Writing output for {} to {}",
            src.display(),
            destination.display()
        ));
    }
    output.success(&format!("Rendered {} file(s)", cli.sources.len()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_sources() {
        let result = Cli::try_parse_from(["puml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_engine() {
        let result = Cli::try_parse_from(["puml", "--engine", "mermaid", "a.uml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_accepts_full_invocation() {
        let cli = Cli::try_parse_from([
            "puml",
            "--engine",
            "graphviz",
            "--format",
            "png",
            "--server",
            "http://localhost:8080/",
            "--no-cache",
            "-vv",
            "graph.dot",
            "other.dot",
        ])
        .unwrap();

        assert_eq!(cli.engine.as_deref(), Some("graphviz"));
        assert_eq!(cli.format.as_deref(), Some("png"));
        assert!(cli.no_cache);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.sources.len(), 2);
    }

    #[test]
    fn test_ditaa_svg_rejected_before_any_work() {
        let cli = Cli::try_parse_from([
            "puml",
            "--engine",
            "ditaa",
            "--format",
            "svg",
            "missing.ditaa",
        ])
        .unwrap();

        let err = run(&cli, &Output::new()).unwrap_err();
        // Validation fires before the missing source file is even checked
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("ditaa"));
    }
}
