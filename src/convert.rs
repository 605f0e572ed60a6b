//! Run entry points: extract, aggregate, build and write.
//!
//! Files are processed strictly one after another in the order given. A file
//! without a top-level waypoint is skipped with a diagnostic; every other
//! problem aborts the run before anything is written (see the policy table
//! in [`crate::error`]).

use crate::config::{ExtractConfig, InvalidWaypointPolicy};
use crate::error::{FileSkip, GpxExtractError};
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{bounds, build, extract, input, write};
use crate::waypoint::Waypoint;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Waypoints and skips collected from a list of input files.
#[derive(Debug, Clone, Default)]
pub struct ExtractedWaypoints {
    /// One waypoint per contributing file, in input order.
    pub waypoints: Vec<Waypoint>,
    /// Files that contributed nothing, in input order.
    pub skipped: Vec<FileSkip>,
}

/// Extract the first waypoint of every file in `paths`.
///
/// # Errors
/// Returns the first fatal error; files after it are not read.
pub fn extract_waypoints<P: AsRef<Path>>(
    paths: &[P],
    config: &ExtractConfig,
) -> Result<ExtractedWaypoints, GpxExtractError> {
    let total = paths.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut extracted = ExtractedWaypoints::default();
    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, path);
        }

        match extract_one(path, config)? {
            Ok(waypoint) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_waypoint(index, total, &waypoint);
                }
                extracted.waypoints.push(waypoint);
            }
            Err(skip) => {
                warn!("{skip}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(index, total, &skip);
                }
                extracted.skipped.push(skip);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, extracted.waypoints.len());
    }
    Ok(extracted)
}

/// Outer error: fatal. Inner error: this file is skipped.
fn extract_one(
    path: &Path,
    config: &ExtractConfig,
) -> Result<Result<Waypoint, FileSkip>, GpxExtractError> {
    let bytes = input::read_document(path)?;
    match extract::extract_first_waypoint(path, &bytes, config) {
        Ok(Some(waypoint)) => Ok(Ok(waypoint)),
        Ok(None) => Ok(Err(FileSkip::NoWaypoint {
            path: path.to_path_buf(),
        })),
        Err(e)
            if e.is_invalid_waypoint()
                && config.invalid_waypoint_policy == InvalidWaypointPolicy::Skip =>
        {
            Ok(Err(FileSkip::Invalid {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }))
        }
        Err(e) => Err(e),
    }
}

/// Extract waypoints from `paths` and render the merged GPX document.
///
/// Nothing is written to disk; see [`convert_to_file`].
///
/// # Errors
/// * `InvalidConfig` — `paths` is empty
/// * any fatal error from reading or extracting an input file
pub fn convert<P: AsRef<Path>>(
    paths: &[P],
    config: &ExtractConfig,
) -> Result<ExtractionOutput, GpxExtractError> {
    let start = Instant::now();
    if paths.is_empty() {
        return Err(GpxExtractError::InvalidConfig(
            "At least one input file is required".into(),
        ));
    }
    info!("Extracting first waypoints from {} files", paths.len());

    // ── Step 1–2: Resolve inputs and extract ─────────────────────────────
    let ExtractedWaypoints { waypoints, skipped } = extract_waypoints(paths, config)?;

    // ── Step 3: Bounds ───────────────────────────────────────────────────
    let bounds = if config.include_bounds {
        let b = bounds::compute_bounds(&waypoints);
        if b.is_none() {
            warn!("No waypoints extracted; omitting bounds metadata");
        }
        b
    } else {
        None
    };

    // ── Step 4: Build and render ─────────────────────────────────────────
    let document = build::build_document(&waypoints, bounds.as_ref(), config);
    let gpx = write::write_document(&document)?;
    debug!("Rendered {} bytes of GPX", gpx.len());

    let stats = ExtractionStats {
        total_files: paths.len(),
        extracted: waypoints.len(),
        skipped: skipped.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Extracted {}/{} waypoints ({} skipped)",
        stats.extracted, stats.total_files, stats.skipped
    );

    Ok(ExtractionOutput {
        gpx,
        waypoints,
        bounds,
        skipped,
        stats,
    })
}

/// Run [`convert`] and replace `output_path` with the result.
///
/// The output file is only touched after every input was processed; on any
/// error it is left as it was.
pub fn convert_to_file<P: AsRef<Path>>(
    paths: &[P],
    output_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractionOutput, GpxExtractError> {
    let output = convert(paths, config)?;
    let path = output_path.as_ref();
    write::write_to_file(path, &output.gpx)?;
    info!(
        "Wrote {} waypoints to {}",
        output.waypoints.len(),
        path.display()
    );
    Ok(output)
}
