//! Result types returned by the extraction entry points.

use crate::error::FileSkip;
use crate::waypoint::{Bounds, Waypoint};
use serde::Serialize;

/// Everything a run produced, before or instead of writing it to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// The rendered GPX 1.1 document.
    pub gpx: String,
    /// Extracted waypoints in input order.
    pub waypoints: Vec<Waypoint>,
    /// Present when bounds were requested and at least one waypoint exists.
    pub bounds: Option<Bounds>,
    /// Input files that contributed no waypoint.
    pub skipped: Vec<FileSkip>,
    pub stats: ExtractionStats,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub total_files: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Machine-readable summary printed by the CLI's `--json` flag.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub output: &'a std::path::Path,
    pub stats: &'a ExtractionStats,
    pub bounds: Option<&'a Bounds>,
    pub skipped: &'a [FileSkip],
}
