//! Input-format detection and output-format mapping.
//!
//! Detection is purely extension-driven: the engine itself sniffs file
//! content, so the front-end only needs a cheap answer to "will the engine
//! accept this at all?" before staging the upload. The table below mirrors
//! the extension sets the engine advertises; anything not listed is rejected
//! up front with a per-file failure rather than a doomed engine run.

use serde::Serialize;

/// Input formats the conversion engine accepts, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Pdf,
    Word,
    PowerPoint,
    Excel,
    Html,
    Markdown,
    Csv,
    AsciiDoc,
    Xml,
    Vtt,
    Json,
    Image,
    Audio,
}

impl InputFormat {
    /// Every extension (lowercase, no dot) mapping to this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            InputFormat::Pdf => &["pdf"],
            InputFormat::Word => &["docx", "dotx", "docm", "dotm"],
            InputFormat::PowerPoint => &["pptx", "potx", "ppsx", "pptm", "potm", "ppsm"],
            InputFormat::Excel => &["xlsx", "xlsm"],
            InputFormat::Html => &["html", "htm", "xhtml"],
            InputFormat::Markdown => &["md"],
            InputFormat::Csv => &["csv"],
            InputFormat::AsciiDoc => &["adoc", "asciidoc", "asc"],
            InputFormat::Xml => &["xml", "nxml"],
            InputFormat::Vtt => &["vtt"],
            InputFormat::Json => &["json"],
            InputFormat::Image => &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"],
            InputFormat::Audio => &["wav", "mp3", "m4a", "aac", "ogg", "flac", "mp4", "avi", "mov"],
        }
    }

    /// Human-readable label used by the UI's format table.
    pub fn label(&self) -> &'static str {
        match self {
            InputFormat::Pdf => "PDF",
            InputFormat::Word => "Word",
            InputFormat::PowerPoint => "PowerPoint",
            InputFormat::Excel => "Excel",
            InputFormat::Html => "HTML",
            InputFormat::Markdown => "Markdown",
            InputFormat::Csv => "CSV",
            InputFormat::AsciiDoc => "AsciiDoc",
            InputFormat::Xml => "XML",
            InputFormat::Vtt => "VTT",
            InputFormat::Json => "JSON",
            InputFormat::Image => "Image",
            InputFormat::Audio => "Audio/Video",
        }
    }

    /// Category the UI's format table groups this format under.
    pub fn group(&self) -> &'static str {
        match self {
            InputFormat::Pdf
            | InputFormat::Word
            | InputFormat::PowerPoint
            | InputFormat::Excel
            | InputFormat::Html
            | InputFormat::Markdown
            | InputFormat::Csv => "Documents",
            InputFormat::Image => "Images",
            InputFormat::Audio => "Audio & Video",
            InputFormat::AsciiDoc | InputFormat::Xml | InputFormat::Vtt | InputFormat::Json => {
                "Other"
            }
        }
    }

    /// All formats, in the order the UI lists them.
    pub fn all() -> &'static [InputFormat] {
        &[
            InputFormat::Pdf,
            InputFormat::Word,
            InputFormat::PowerPoint,
            InputFormat::Excel,
            InputFormat::Html,
            InputFormat::Markdown,
            InputFormat::Csv,
            InputFormat::AsciiDoc,
            InputFormat::Xml,
            InputFormat::Vtt,
            InputFormat::Json,
            InputFormat::Image,
            InputFormat::Audio,
        ]
    }

    /// Detect the input format from a filename's extension, case-insensitive.
    ///
    /// Returns `None` for missing or unknown extensions.
    pub fn from_filename(filename: &str) -> Option<InputFormat> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        InputFormat::all()
            .iter()
            .copied()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Paged formats get the per-page progress bar; everything else only
    /// shows batch-level progress.
    pub fn is_paged(&self) -> bool {
        matches!(self, InputFormat::Pdf)
    }
}

/// Output formats the engine can render, with their fixed extension and
/// MIME mapping used by the download endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Json,
    Text,
}

impl OutputFormat {
    /// Parse the form-field value sent by the UI.
    pub fn parse(value: &str) -> Option<OutputFormat> {
        match value.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "text" | "txt" => Some(OutputFormat::Text),
            _ => None,
        }
    }

    /// File extension for downloads (no dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }

    /// MIME type for the single-file download response.
    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Json => "application/json",
            OutputFormat::Text => "text/plain; charset=utf-8",
        }
    }

    /// The name the engine's `--to` flag expects.
    pub fn engine_name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

/// Replace an upload's extension with the output format's, e.g.
/// `report.final.pdf` + Markdown → `report.final.md`.
pub fn output_filename(upload_name: &str, format: OutputFormat) -> String {
    let stem = upload_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(upload_name);
    format!("{stem}.{}", format.extension())
}
