//! The converter seam: everything that understands documents lives on the
//! other side of this trait.
//!
//! The production implementation, [`DoclingEngine`], spawns the external
//! `docling` executable once per file and passes the option booleans straight
//! through as flags. Its stderr is consumed line by line while it runs: each
//! line is fed to the [`ProgressRelay`] scraper and the last few lines are
//! kept so a non-zero exit can report something useful.
//!
//! Tests substitute their own [`DocumentConverter`] so the web and batch
//! layers can be exercised without the engine installed.

use crate::config::{ConvertConfig, PageSelection};
use crate::error::RelayError;
use crate::formats::{output_filename, InputFormat, OutputFormat};
use crate::progress::ProgressRelay;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How many trailing stderr lines to keep for the failure message.
const STDERR_TAIL_LINES: usize = 20;

/// A successfully converted document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// The converted text in the requested output format.
    pub content: String,
    /// Page count, scraped from the engine's progress log; 1 when the
    /// engine never reported pages (non-paged formats).
    pub pages: usize,
}

/// The external collaborator that performs all document understanding.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert one staged file, feeding progress lines through `relay`.
    async fn convert(
        &self,
        input: &Path,
        input_format: InputFormat,
        output: OutputFormat,
        config: &ConvertConfig,
        relay: &ProgressRelay,
    ) -> Result<ConvertedDocument, RelayError>;
}

/// Spawns the `docling` command-line converter per file.
#[derive(Debug, Default, Clone)]
pub struct DoclingEngine;

impl DoclingEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Assemble the engine's argument vector for one file.
///
/// The option booleans map to paired `--flag`/`--no-flag` switches; `-v`
/// makes the engine log the per-page lines the progress relay scrapes.
pub fn engine_args(
    input: &Path,
    out_dir: &Path,
    output: OutputFormat,
    config: &ConvertConfig,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--to".into(),
        output.engine_name().into(),
        "--output".into(),
        out_dir.to_string_lossy().into_owned(),
    ];
    args.push(if config.ocr { "--ocr" } else { "--no-ocr" }.into());
    args.push(
        if config.table_structure {
            "--table-structure"
        } else {
            "--no-table-structure"
        }
        .into(),
    );
    args.push(if config.extract_images { "--images" } else { "--no-images" }.into());
    match config.pages {
        PageSelection::All => {}
        PageSelection::Single(p) => {
            args.extend(["--page-range".into(), p.to_string(), p.to_string()]);
        }
        PageSelection::Range(start, end) => {
            args.extend(["--page-range".into(), start.to_string(), end.to_string()]);
        }
    }
    args.push("-v".into());
    args.push(input.to_string_lossy().into_owned());
    args
}

#[async_trait]
impl DocumentConverter for DoclingEngine {
    async fn convert(
        &self,
        input: &Path,
        _input_format: InputFormat,
        output: OutputFormat,
        config: &ConvertConfig,
        relay: &ProgressRelay,
    ) -> Result<ConvertedDocument, RelayError> {
        let out_dir = tempfile::tempdir().map_err(|e| RelayError::StageFailed {
            filename: input.display().to_string(),
            source: e,
        })?;

        let args = engine_args(input, out_dir.path(), output, config);
        debug!(program = %config.engine_program, ?args, "spawning engine");

        let mut child = Command::new(&config.engine_program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RelayError::EngineStartFailed {
                program: config.engine_program.clone(),
                source: e,
            })?;

        // The engine logs to stderr; scrape every line for page counters
        // while keeping a short tail for error reporting.
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RelayError::Internal("engine stderr was not piped".into()))?;
        let mut lines = BufReader::new(stderr).lines();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        while let Ok(Some(line)) = lines.next_line().await {
            relay.observe_line(&line);
            debug!(target: "docrelay::engine", "{line}");
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }

        let status = child.wait().await.map_err(|e| RelayError::EngineStartFailed {
            program: config.engine_program.clone(),
            source: e,
        })?;
        if !status.success() {
            let stderr_tail = tail.iter().cloned().collect::<Vec<_>>().join("\n");
            warn!(%status, "engine failed");
            return Err(RelayError::EngineFailed {
                status: status.to_string(),
                stderr_tail,
            });
        }

        // The engine writes `<input stem>.<output ext>` into --output.
        let produced = expected_output_path(input, out_dir.path(), output);
        if !produced.exists() {
            return Err(RelayError::OutputMissing { path: produced });
        }
        let content =
            tokio::fs::read_to_string(&produced)
                .await
                .map_err(|e| RelayError::OutputUnreadable {
                    path: produced.clone(),
                    source: e,
                })?;

        let pages = relay.page_total().max(1);
        info!(input = %input.display(), pages, bytes = content.len(), "engine finished");
        // out_dir drops here, removing the staged output on every path.
        Ok(ConvertedDocument { content, pages })
    }
}

/// Where the engine will have written its output for `input`.
fn expected_output_path(input: &Path, out_dir: &Path, output: OutputFormat) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(output_filename(&name, output))
}
