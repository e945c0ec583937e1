//! Batch download packaging: an in-memory zip of the successful results.
//!
//! Deflate-compressed, built entirely in memory — converted documents are
//! text and batches are interactive-scale, so there is nothing to stream.
//! Failed files are simply absent from the archive.

use crate::batch::ConversionResult;
use crate::error::RelayError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Filename offered for the batch download.
pub const ARCHIVE_NAME: &str = "converted_documents.zip";

/// Bundle every successful result into a zip archive.
///
/// Entry names are the results' output filenames; entry bytes are exactly
/// the converted content.
pub fn bundle_successful(results: &[ConversionResult]) -> Result<Vec<u8>, RelayError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for result in results {
        if let Some(content) = result.content() {
            writer
                .start_file(result.output_name.as_str(), options)
                .map_err(|e| RelayError::Internal(format!("zip entry: {e}")))?;
            writer
                .write_all(content.as_bytes())
                .map_err(|e| RelayError::Internal(format!("zip write: {e}")))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| RelayError::Internal(format!("zip finish: {e}")))?;
    Ok(cursor.into_inner())
}
