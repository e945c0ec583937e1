//! Launcher binary for docrelay.
//!
//! A thin shim over the library crate that maps CLI flags to the server
//! configuration and starts the web UI on a local port.

use anyhow::{Context, Result};
use clap::Parser;
use docrelay::web::{self, AppState, DEFAULT_BODY_LIMIT};
use docrelay::ConvertConfig;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the UI on the default port, then open http://127.0.0.1:8501
  docrelay

  # Different port, engine from a virtualenv
  docrelay --port 9000 --engine /opt/venv/bin/docling

  # Debug logging (includes every scraped engine log line)
  docrelay -v

ENGINE:
  Document conversion is performed by the external `docling` executable,
  spawned once per uploaded file. Install it with `pip install docling`
  or point --engine at an existing installation.
"#;

/// Browser-based document converter — upload, convert, download.
#[derive(Parser, Debug)]
#[command(
    name = "docrelay",
    version,
    about = "Browser-based document converter — upload, convert, download",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "DOCRELAY_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "DOCRELAY_PORT", default_value_t = 8501)]
    port: u16,

    /// Name or path of the conversion engine executable.
    #[arg(long, env = "DOCRELAY_ENGINE", default_value = "docling")]
    engine: String,

    /// Maximum upload body size in megabytes.
    #[arg(long, env = "DOCRELAY_BODY_LIMIT_MB", default_value_t = 500)]
    body_limit_mb: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCRELAY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCRELAY_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Server setup ─────────────────────────────────────────────────────
    let defaults = ConvertConfig::builder()
        .engine_program(&cli.engine)
        .build()
        .context("invalid engine configuration")?;
    let state = AppState::new(defaults);

    let body_limit = if cli.body_limit_mb == 0 {
        DEFAULT_BODY_LIMIT
    } else {
        cli.body_limit_mb * 1024 * 1024
    };
    let addr = SocketAddr::new(cli.host, cli.port);
    eprintln!("docrelay listening on http://{addr}");

    web::serve(addr, state, body_limit)
        .await
        .with_context(|| format!("server failed on {addr}"))
}
