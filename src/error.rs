//! Error types for the gpx-starting-point-extract library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`GpxExtractError`] — **Fatal**: the run cannot proceed at all
//!   (unreadable input, malformed XML, unknown GPX version, output not
//!   writable). Returned as `Err(GpxExtractError)` from the top-level
//!   `convert*` functions; nothing is written to the output path.
//!
//! * [`FileSkip`] — **Non-fatal**: one input file contributed no waypoint,
//!   but every other file is fine. Stored in
//!   [`crate::output::ExtractionOutput::skipped`] so callers can report it.
//!
//! Per-file policy:
//!
//! | Condition                                   | Outcome                         |
//! |---------------------------------------------|---------------------------------|
//! | file unreadable                             | `FileNotFound` / `PermissionDenied` / `InputReadFailed` |
//! | malformed XML                               | `ParseError`                    |
//! | `version` missing or unknown                | `UnsupportedVersion`            |
//! | no top-level `<wpt>`                        | [`FileSkip::NoWaypoint`]        |
//! | `<wpt>` without `lat`/`lon`/`<name>`        | `MissingField`, or [`FileSkip::Invalid`] under [`crate::config::InvalidWaypointPolicy::Skip`] |
//! | unparsable coordinate or elevation          | `InvalidNumber`, same policy    |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All fatal errors returned by the gpx-starting-point-extract library.
#[derive(Debug, Error)]
pub enum GpxExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("GPX file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The file is not well-formed XML.
    #[error("'{path}' is not well-formed XML: {detail}")]
    ParseError { path: PathBuf, detail: String },

    /// The root `version` attribute is absent or not `1.0` / `1.1`.
    #[error(
        "'{path}' declares unsupported GPX version {}\nSupported versions: 1.0, 1.1",
        quoted_version(.version)
    )]
    UnsupportedVersion {
        path: PathBuf,
        version: Option<String>,
    },

    // ── Waypoint errors ───────────────────────────────────────────────────
    /// The first waypoint lacks a required attribute or child element.
    #[error("First waypoint in '{path}' has no {field}")]
    MissingField { path: PathBuf, field: WaypointField },

    /// A coordinate or elevation is not a finite decimal number.
    #[error("First waypoint in '{path}' has invalid {field}: {value:?}")]
    InvalidNumber {
        path: PathBuf,
        field: WaypointField,
        value: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or replace the output GPX file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
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

fn quoted_version(version: &Option<String>) -> String {
    match version {
        Some(v) => format!("'{v}'"),
        None => "(none)".to_string(),
    }
}

impl GpxExtractError {
    /// Whether this error describes a bad waypoint rather than a bad file.
    ///
    /// These are the errors [`crate::config::InvalidWaypointPolicy::Skip`]
    /// downgrades to [`FileSkip::Invalid`].
    pub fn is_invalid_waypoint(&self) -> bool {
        matches!(
            self,
            GpxExtractError::MissingField { .. } | GpxExtractError::InvalidNumber { .. }
        )
    }
}

/// Waypoint data items that can be missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointField {
    Lat,
    Lon,
    Name,
    Ele,
}

impl fmt::Display for WaypointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WaypointField::Lat => "'lat' attribute",
            WaypointField::Lon => "'lon' attribute",
            WaypointField::Name => "<name> element",
            WaypointField::Ele => "<ele> element",
        };
        f.write_str(s)
    }
}

/// A non-fatal reason why an input file contributed no waypoint.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FileSkip {
    /// The document is valid GPX but has no top-level `<wpt>`.
    #[error("no waypoint found in {}", .path.display())]
    NoWaypoint { path: PathBuf },

    /// The first waypoint was unusable and the run skips such files.
    #[error("skipping {}: {detail}", .path.display())]
    Invalid { path: PathBuf, detail: String },
}

impl FileSkip {
    /// The input file that was skipped.
    pub fn path(&self) -> &Path {
        match self {
            FileSkip::NoWaypoint { path } | FileSkip::Invalid { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_waypoint_display_matches_diagnostic_line() {
        let skip = FileSkip::NoWaypoint {
            path: PathBuf::from("tracks/empty.gpx"),
        };
        assert_eq!(skip.to_string(), "no waypoint found in tracks/empty.gpx");
    }

    #[test]
    fn unsupported_version_display_with_value() {
        let e = GpxExtractError::UnsupportedVersion {
            path: PathBuf::from("a.gpx"),
            version: Some("2.0".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("'2.0'"), "got: {msg}");
        assert!(msg.contains("a.gpx"), "got: {msg}");
    }

    #[test]
    fn unsupported_version_display_without_value() {
        let e = GpxExtractError::UnsupportedVersion {
            path: PathBuf::from("a.gpx"),
            version: None,
        };
        assert!(e.to_string().contains("(none)"));
    }

    #[test]
    fn missing_field_display() {
        let e = GpxExtractError::MissingField {
            path: PathBuf::from("b.gpx"),
            field: WaypointField::Name,
        };
        assert!(e.to_string().contains("<name> element"));
        assert!(e.is_invalid_waypoint());
    }

    #[test]
    fn parse_error_is_not_an_invalid_waypoint() {
        let e = GpxExtractError::ParseError {
            path: PathBuf::from("c.gpx"),
            detail: "unexpected end".into(),
        };
        assert!(!e.is_invalid_waypoint());
    }

    #[test]
    fn file_skip_serialises_with_reason_tag() {
        let skip = FileSkip::Invalid {
            path: PathBuf::from("d.gpx"),
            detail: "no lat".into(),
        };
        let json = serde_json::to_string(&skip).unwrap();
        assert!(json.contains("\"reason\":\"invalid\""), "got: {json}");
    }
}
