//! Progress-callback trait for per-file extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the input files.
//!
//! # Example
//!
//! ```rust
//! use gpx_starting_point_extract::{ExtractConfig, ExtractionProgressCallback, FileSkip};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SkipCounter {
//!     skipped: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for SkipCounter {
//!     fn on_file_skipped(&self, _index: usize, _total: usize, skip: &FileSkip) {
//!         self.skipped.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{skip}");
//!     }
//! }
//!
//! let counter = Arc::new(SkipCounter { skipped: AtomicUsize::new(0) });
//!
//! let config = ExtractConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FileSkip;
use crate::waypoint::Waypoint;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes each input file.
///
/// Files are processed one at a time in the order given, so events for one
/// file never interleave with another's. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first file is read.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position of the file on the command line
    /// * `total` — number of input files
    /// * `path`  — the file about to be read
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a file produced a waypoint.
    fn on_waypoint(&self, index: usize, total: usize, waypoint: &Waypoint) {
        let _ = (index, total, waypoint);
    }

    /// Called when a file produced no waypoint and the run continues.
    fn on_file_skipped(&self, index: usize, total: usize, skip: &FileSkip) {
        let _ = (index, total, skip);
    }

    /// Called once after every file has been processed successfully.
    ///
    /// # Arguments
    /// * `total_files` — number of input files
    /// * `extracted`   — files that contributed a waypoint
    fn on_run_complete(&self, total_files: usize, extracted: usize) {
        let _ = (total_files, extracted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
