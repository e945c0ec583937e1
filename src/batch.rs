//! Sequential batch conversion of uploaded files.
//!
//! Files are converted strictly one at a time, in upload order, inside the
//! request that carried them. Every per-file failure — unsupported
//! extension, staging I/O, engine exit — is stringified into that file's
//! result and the batch continues with the next file. Only the caller's
//! cancellation (dropping the future) stops a batch early.
//!
//! Each file is staged into its own [`tempfile::TempDir`] under its original
//! name so the engine sees a real path and derives the right output stem;
//! the directory is removed when the result is recorded, on success and
//! failure alike.

use crate::config::ConvertConfig;
use crate::converter::DocumentConverter;
use crate::error::RelayError;
use crate::formats::{output_filename, InputFormat, OutputFormat};
use crate::progress::ProgressRelay;
use bytes::Bytes;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// One uploaded blob, owned by the request lifecycle.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Success-or-failure for one file; the two arms are mutually exclusive by
/// construction.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The engine produced output.
    Converted { content: String, pages: usize },
    /// Conversion failed; the error, uniformly stringified.
    Failed { message: String },
}

/// The record kept for each uploaded file after its conversion attempt.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Original upload filename.
    pub filename: String,
    /// Filename offered for download (stem + output extension).
    pub output_name: String,
    /// Requested output format.
    pub format: OutputFormat,
    /// Wall-clock conversion time for this file.
    pub duration_ms: u64,
    pub outcome: Outcome,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Converted { .. })
    }

    /// The converted content, if this file succeeded.
    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Converted { content, .. } => Some(content),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn pages(&self) -> Option<usize> {
        match &self.outcome {
            Outcome::Converted { pages, .. } => Some(*pages),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Converted { .. } => None,
            Outcome::Failed { message } => Some(message),
        }
    }
}

/// Everything produced by one conversion batch, held in server memory for
/// the download endpoints. No persistence.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub results: Vec<ConversionResult>,
    pub total_duration_ms: u64,
}

impl BatchOutput {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Convert `files` one at a time, reporting through `relay`.
///
/// Never fails as a whole: per-file errors land in the corresponding
/// [`ConversionResult`].
pub async fn convert_batch(
    converter: &dyn DocumentConverter,
    files: &[UploadedFile],
    output: OutputFormat,
    config: &ConvertConfig,
    relay: &ProgressRelay,
) -> BatchOutput {
    let batch_start = Instant::now();
    relay.begin_batch(files.len());

    let mut results = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        let paged = InputFormat::from_filename(&file.name)
            .map(|f| f.is_paged())
            .unwrap_or(false);
        relay.begin_file(i + 1, &file.name, paged);
        info!(file = %file.name, index = i + 1, total = files.len(), "converting");

        let file_start = Instant::now();
        let outcome = match convert_one(converter, file, output, config, relay).await {
            Ok(doc) => Outcome::Converted {
                content: doc.content,
                pages: doc.pages,
            },
            Err(e) => {
                warn!(file = %file.name, error = %e, "conversion failed, continuing batch");
                Outcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        results.push(ConversionResult {
            filename: file.name.clone(),
            output_name: output_filename(&file.name, output),
            format: output,
            duration_ms: file_start.elapsed().as_millis() as u64,
            outcome,
        });
    }

    relay.finish_batch();
    let out = BatchOutput {
        results,
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
    };
    info!(
        total = out.results.len(),
        succeeded = out.succeeded(),
        failed = out.failed(),
        duration_ms = out.total_duration_ms,
        "batch finished"
    );
    out
}

/// Stage one upload to a temp file and hand it to the converter.
async fn convert_one(
    converter: &dyn DocumentConverter,
    file: &UploadedFile,
    output: OutputFormat,
    config: &ConvertConfig,
    relay: &ProgressRelay,
) -> Result<crate::converter::ConvertedDocument, RelayError> {
    let input_format =
        InputFormat::from_filename(&file.name).ok_or_else(|| RelayError::UnsupportedFormat {
            filename: file.name.clone(),
        })?;

    let stage = tempfile::tempdir().map_err(|e| RelayError::StageFailed {
        filename: file.name.clone(),
        source: e,
    })?;
    // Keep only the final path component; uploads get to pick a name,
    // not a location.
    let safe_name = Path::new(&file.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let staged_path = stage.path().join(&safe_name);
    tokio::fs::write(&staged_path, &file.bytes)
        .await
        .map_err(|e| RelayError::StageFailed {
            filename: file.name.clone(),
            source: e,
        })?;

    let doc = converter
        .convert(&staged_path, input_format, output, config, relay)
        .await;
    // `stage` drops here: the temp file is removed on success and failure.
    doc
}
