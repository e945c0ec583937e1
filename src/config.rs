//! Conversion options handed to the external engine.
//!
//! All per-batch behaviour is controlled through [`ConvertConfig`], built via
//! its [`ConvertConfigBuilder`]. The options are deliberately flat — a small
//! set of booleans plus a page selection — because they are passed straight
//! through to the engine's command line; this crate interprets none of them.
//!
//! # Design choice: builder over constructor
//! The UI, the launcher, and tests each set a different subset of knobs.
//! The builder lets each caller state only what it cares about and rely on
//! documented defaults for the rest.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};

/// Options for one conversion batch.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
///
/// # Example
/// ```rust
/// use docrelay::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .ocr(false)
///     .table_structure(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Run OCR on scanned pages. Default: true.
    ///
    /// OCR dominates conversion time on scanned PDFs; the UI exposes this
    /// switch so users with born-digital documents can skip it entirely.
    pub ocr: bool,

    /// Recognise table structure. Default: true.
    pub table_structure: bool,

    /// Extract embedded images alongside the text. Default: false.
    pub extract_images: bool,

    /// Which pages of a paged document to convert. Default: all.
    pub pages: PageSelection,

    /// Name or path of the engine executable. Default: `"docling"`.
    ///
    /// Resolved through PATH by the OS; point this at an absolute path when
    /// the engine lives in a virtualenv the server does not activate.
    pub engine_program: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            ocr: true,
            table_structure: true,
            extract_images: false,
            pages: PageSelection::default(),
            engine_program: "docling".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn ocr(mut self, v: bool) -> Self {
        self.config.ocr = v;
        self
    }

    pub fn table_structure(mut self, v: bool) -> Self {
        self.config.table_structure = v;
        self
    }

    pub fn extract_images(mut self, v: bool) -> Self {
        self.config.extract_images = v;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn engine_program(mut self, program: impl Into<String>) -> Self {
        self.config.engine_program = program.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, RelayError> {
        let c = &self.config;
        if c.engine_program.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "Engine program must not be empty".into(),
            ));
        }
        if let PageSelection::Range(start, end) = c.pages {
            if start == 0 || end < start {
                return Err(RelayError::InvalidConfig(format!(
                    "Page range must be 1-indexed with start ≤ end, got {start}-{end}"
                )));
            }
        }
        if let PageSelection::Single(p) = c.pages {
            if p == 0 {
                return Err(RelayError::InvalidConfig(
                    "Page numbers are 1-indexed".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

/// Which pages of a paged document to convert (1-indexed, inclusive).
///
/// Forwarded to the engine verbatim; non-paged formats ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page.
    Single(usize),
    /// Convert a contiguous range of pages.
    Range(usize, usize),
}

impl PageSelection {
    /// Parse the form/flag value: `all`, `5`, or `3-15`.
    pub fn parse(value: &str) -> Option<PageSelection> {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("all") {
            return Some(PageSelection::All);
        }
        if let Some((start, end)) = v.split_once('-') {
            let start: usize = start.trim().parse().ok()?;
            let end: usize = end.trim().parse().ok()?;
            return Some(PageSelection::Range(start, end));
        }
        v.parse().ok().map(PageSelection::Single)
    }
}
