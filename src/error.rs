//! Error types for the docrelay library.
//!
//! A single [`RelayError`] covers everything that can go wrong while staging
//! an upload and handing it to the external conversion engine. Errors are
//! always caught at the per-file level by [`crate::batch::convert_batch`],
//! stringified into the result's failure message, and the batch moves on to
//! the next file — there is no retry and no partial-result recovery.
//!
//! The web layer has its own small response-mapping error type
//! ([`crate::web::WebError`]); this enum is about conversion, not HTTP.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while converting a single uploaded file.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// The upload's extension maps to no supported input format.
    #[error("Unsupported file format: '{filename}'\nSee /api/formats for the supported extensions.")]
    UnsupportedFormat { filename: String },

    /// The uploaded blob could not be written to temporary storage.
    #[error("Failed to stage '{filename}' in temporary storage: {source}")]
    StageFailed {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The engine executable could not be started at all.
    #[error(
        "Failed to start conversion engine '{program}': {source}\n\
         Check that it is installed and on PATH (e.g. `pip install docling`)."
    )]
    EngineStartFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine process exited with a non-zero status.
    #[error("Conversion engine exited with status {status}:\n{stderr_tail}")]
    EngineFailed { status: String, stderr_tail: String },

    /// The engine reported success but the expected output file is missing.
    #[error("Engine produced no output file at '{path}'")]
    OutputMissing { path: PathBuf },

    /// The output file exists but could not be read back.
    #[error("Failed to read engine output '{path}': {source}")]
    OutputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
