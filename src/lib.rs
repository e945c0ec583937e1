//! # docrelay
//!
//! A browser-based front-end for document conversion: upload PDF, Word,
//! Excel, image, and other files, convert them to Markdown/HTML/JSON/plain
//! text, watch progress, and download results singly or as a zip.
//!
//! ## What this crate is — and is not
//!
//! All document understanding (layout analysis, OCR, table structure) is
//! delegated to an external conversion engine — the `docling` command-line
//! converter by default — behind the [`DocumentConverter`] trait. This crate
//! is the glue around it: file intake, engine invocation, progress display,
//! and result packaging. It contains no parsing of its own.
//!
//! ## Flow
//!
//! ```text
//! browser upload
//!  │
//!  ├─ 1. Intake    multipart blobs → per-file temp staging
//!  ├─ 2. Convert   spawn engine per file, options passed through as flags
//!  ├─ 3. Progress  scrape "Finished converting pages X/Y" off engine stderr,
//!  │               browser polls the shared counters
//!  ├─ 4. Results   per-file success-or-failure records, previews
//!  └─ 5. Download  single files with fixed MIME mapping, or one zip
//! ```
//!
//! Batches run strictly sequentially, one file at a time, inside the
//! request that uploaded them. A per-file failure is recorded and the batch
//! continues; there is no retry.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docrelay::{web, ConvertConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let state = web::AppState::new(ConvertConfig::default());
//!     let addr = "127.0.0.1:8501".parse().unwrap();
//!     web::serve(addr, state, web::DEFAULT_BODY_LIMIT).await
//! }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docrelay` launcher binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod formats;
pub mod progress;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::{bundle_successful, ARCHIVE_NAME};
pub use batch::{convert_batch, BatchOutput, ConversionResult, Outcome, UploadedFile};
pub use config::{ConvertConfig, ConvertConfigBuilder, PageSelection};
pub use converter::{ConvertedDocument, DoclingEngine, DocumentConverter};
pub use error::RelayError;
pub use formats::{output_filename, InputFormat, OutputFormat};
pub use progress::{scrape_page_progress, ProgressRelay, ProgressSnapshot};
