//! # gpx-starting-point-extract
//!
//! Collect the first waypoint of each GPX file into one GPX 1.1 waypoint file.
//!
//! Given a set of track logs — one per hike, ride or run — the first `<wpt>`
//! of each is usually its starting point. This crate pulls that point out of
//! every file, labels it with the file's name, and writes all of them into a
//! single document that GPS devices and map tools can import as POIs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! GPX files
//!  │
//!  ├─ 1. Input    read each file fully into memory
//!  ├─ 2. Extract  first top-level <wpt> in the declared version's namespace
//!  ├─ 3. Bounds   optional enclosing rectangle
//!  ├─ 4. Build    GPX 1.1 tree, optional Garmin gpxx extensions
//!  └─ 5. Write    indented XML, atomically replacing the output file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gpx_starting_point_extract::{convert_to_file, ExtractConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::builder()
//!         .include_bounds(true)
//!         .category("Trailheads")
//!         .build()?;
//!     let output = convert_to_file(&["monday.gpx", "tuesday.gpx"], "starts.gpx", &config)?;
//!     for skip in &output.skipped {
//!         eprintln!("{skip}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gpx-starting-point-extract` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod waypoint;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder, GpxVersion, InvalidWaypointPolicy, OutputProfile};
pub use convert::{convert, convert_to_file, extract_waypoints, ExtractedWaypoints};
pub use error::{FileSkip, GpxExtractError, WaypointField};
pub use output::{ExtractionOutput, ExtractionStats, RunSummary};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use waypoint::{Bounds, Waypoint};
