//! Best-effort progress relay scraped from the engine's log output.
//!
//! The engine exposes no progress API. What it does expose is a log line of
//! the form `Finished converting pages 5/10 time=1.234` on stderr while it
//! chews through a paged document. The relay pattern-matches that fixed
//! substring out of every line it sees and stores the page counters in
//! shared state; the browser repaints its progress bars from a polled
//! snapshot of that state.
//!
//! This is a display aid, nothing more: unmatched and malformed lines are
//! silently ignored, counters can lag the engine, and nothing downstream may
//! depend on them for correctness.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The fixed pattern the engine logs once per page batch.
static PAGE_PROGRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Finished converting pages (\d+)/(\d+)").expect("valid regex"));

/// Extract `(current, total)` page counters from a single engine log line.
///
/// Returns `None` for lines that do not match the pattern, including
/// truncated or garbled variants.
pub fn scrape_page_progress(line: &str) -> Option<(usize, usize)> {
    let caps = PAGE_PROGRESS_RE.captures(line)?;
    let current = caps[1].parse().ok()?;
    let total = caps[2].parse().ok()?;
    Some((current, total))
}

/// Point-in-time view of the relay, serialised for the polling endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// A batch is currently converting.
    pub active: bool,
    /// 1-indexed position of the file being converted (0 when idle).
    pub file_index: usize,
    /// Number of files in the batch.
    pub total_files: usize,
    /// Name of the file being converted.
    pub current_file: Option<String>,
    /// Pages finished for the current file, scraped from the engine log.
    pub page_current: usize,
    /// Total pages of the current file, scraped from the engine log.
    /// 0 until the first matching log line arrives.
    pub page_total: usize,
    /// Per-page progress is only meaningful for paged formats.
    pub paged: bool,
}

impl ProgressSnapshot {
    fn idle() -> Self {
        Self {
            active: false,
            file_index: 0,
            total_files: 0,
            current_file: None,
            page_current: 0,
            page_total: 0,
            paged: false,
        }
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Shared mutable progress state: written by the stderr scraper, read by
/// the polling endpoint.
///
/// One relay is shared by the whole server, matching the single-batch
/// execution model — a second concurrent batch would overwrite the first
/// batch's counters, and the display would be wrong but nothing else.
#[derive(Clone, Default)]
pub struct ProgressRelay {
    inner: Arc<Mutex<ProgressSnapshot>>,
}

impl ProgressRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a batch of `total_files` files.
    pub fn begin_batch(&self, total_files: usize) {
        let mut s = self.lock();
        *s = ProgressSnapshot::idle();
        s.active = true;
        s.total_files = total_files;
    }

    /// Mark the start of file `index` (1-indexed), resetting page counters.
    pub fn begin_file(&self, index: usize, filename: &str, paged: bool) {
        let mut s = self.lock();
        s.file_index = index;
        s.current_file = Some(filename.to_string());
        s.page_current = 0;
        s.page_total = 0;
        s.paged = paged;
    }

    /// Feed one engine log line through the scraper.
    pub fn observe_line(&self, line: &str) {
        if let Some((current, total)) = scrape_page_progress(line) {
            let mut s = self.lock();
            s.page_current = current;
            s.page_total = total;
        }
    }

    /// Mark the batch finished and return to the idle state.
    pub fn finish_batch(&self) {
        *self.lock() = ProgressSnapshot::idle();
    }

    /// Copy out the current state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().clone()
    }

    /// Total pages last reported for the current file (0 if none seen).
    pub fn page_total(&self) -> usize {
        self.lock().page_total
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressSnapshot> {
        // A poisoned relay would only ever lose display state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
