//! Waypoint extraction: find the first top-level `<wpt>` of a GPX document.
//!
//! The document is scanned with a namespace-aware pull parser from the first
//! byte to the last. Scanning does not stop once the waypoint is complete:
//! a document that is broken further down is still rejected as a whole, the
//! same outcome a DOM parse would give.
//!
//! Every text node and attribute value is decoded and entity-expanded, not
//! only the ones that end up in the waypoint, so a stray `&` or an undefined
//! entity anywhere is a parse error. Decoding follows the encoding named in
//! the XML declaration or byte order mark, UTF-8 when neither is present.
//!
//! Only elements in the namespace of the declared GPX version count. A
//! `<wpt>` must be a direct child of the root; route and track points
//! (`<rtept>`, `<trkpt>`) and anything nested deeper are ignored.

use crate::config::{ExtractConfig, GpxVersion};
use crate::error::{GpxExtractError, WaypointField};
use crate::pipeline::input::basename;
use crate::waypoint::{round_to, truncate_elevation, Waypoint};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::fmt;
use std::path::Path;
use tracing::debug;

// Element depths while scanning (after the opening tag is counted).
const ROOT_DEPTH: usize = 1;
const POINT_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// Raw data of the selected `<wpt>`, before validation.
#[derive(Debug, Default)]
struct PointScan {
    lat: Option<String>,
    lon: Option<String>,
    name: Option<String>,
    ele: Option<String>,
}

/// Which child of the selected point is collecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Name,
    Ele,
}

#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    namespace: Option<String>,
    version: Option<GpxVersion>,
    /// Reported after the scan so syntax errors take precedence.
    version_error: Option<GpxExtractError>,
    /// Some once the first top-level point opened.
    point: Option<PointScan>,
    /// True while inside the selected point.
    in_point: bool,
    capture: Option<Capture>,
}

/// Extract the first top-level waypoint of the GPX document `bytes`, read
/// from `path`.
///
/// Returns `Ok(None)` when the document is valid but holds no top-level
/// `<wpt>`.
///
/// # Errors
/// * `ParseError` — the document is not well-formed XML or cannot be decoded
/// * `UnsupportedVersion` — root `version` is absent or not `1.0`/`1.1`
/// * `MissingField` — the point has no `lat`, `lon` or `<name>`
/// * `InvalidNumber` — a coordinate or the elevation is not a finite number
pub fn extract_first_waypoint(
    path: &Path,
    bytes: &[u8],
    config: &ExtractConfig,
) -> Result<Option<Waypoint>, GpxExtractError> {
    let scanner = scan_document(path, bytes, config)?;

    let Some(point) = scanner.point else {
        debug!("{}: no top-level waypoint", path.display());
        return Ok(None);
    };

    let latitude = parse_coordinate(path, WaypointField::Lat, point.lat, config.precision)?;
    let longitude = parse_coordinate(path, WaypointField::Lon, point.lon, config.precision)?;
    let name = point.name.ok_or_else(|| GpxExtractError::MissingField {
        path: path.to_path_buf(),
        field: WaypointField::Name,
    })?;
    let elevation = point
        .ele
        .map(|raw| parse_elevation(path, &raw))
        .transpose()?;

    let waypoint = Waypoint {
        basename: basename(path),
        name,
        latitude,
        longitude,
        elevation,
    };
    debug!(
        "{}: GPX {} waypoint '{}' at {}, {}",
        path.display(),
        scanner.version.map(|v| v.as_str()).unwrap_or("?"),
        waypoint.name,
        waypoint.latitude,
        waypoint.longitude
    );
    Ok(Some(waypoint))
}

fn scan_document(
    path: &Path,
    bytes: &[u8],
    config: &ExtractConfig,
) -> Result<Scanner, GpxExtractError> {
    let mut reader = NsReader::from_reader(bytes);
    let mut scanner = Scanner::default();
    let mut seen_root = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(parse_error(
                    path,
                    format!("{e} (at byte {})", reader.buffer_position()),
                ))
            }
        };

        match event {
            Event::Start(e) if scanner.depth == 0 => {
                scanner.open_root(path, &reader, &e, &mut seen_root, config)?;
                scanner.depth = ROOT_DEPTH;
            }
            // `<gpx .../>` is a complete document without children.
            Event::Empty(e) if scanner.depth == 0 => {
                scanner.open_root(path, &reader, &e, &mut seen_root, config)?;
            }
            Event::Start(e) => {
                check_bound(path, &reader, &e)?;
                scanner.open(path, &reader, &e)?;
                scanner.depth += 1;
            }
            Event::Empty(e) => {
                check_bound(path, &reader, &e)?;
                scanner.open(path, &reader, &e)?;
                scanner.depth += 1;
                scanner.close();
            }
            Event::End(_) => {
                if scanner.depth == 0 {
                    return Err(parse_error(path, "closing tag without an open element"));
                }
                scanner.close();
            }
            Event::Text(t) => {
                if scanner.depth == 0 {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(parse_error(path, "text outside the root element"));
                    }
                } else {
                    let s = t.unescape().map_err(|e| parse_error(path, e))?;
                    if scanner.capturing() {
                        scanner.push_text(&s);
                    }
                }
            }
            Event::CData(c) => {
                if scanner.depth == 0 {
                    return Err(parse_error(path, "CDATA outside the root element"));
                }
                let s = c.decode().map_err(|e| parse_error(path, e))?;
                if scanner.capturing() {
                    scanner.push_text(&s);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if !seen_root {
        return Err(parse_error(path, "no root element"));
    }
    if scanner.depth != 0 {
        return Err(parse_error(path, "unexpected end of document (unclosed element)"));
    }
    if let Some(unsupported) = scanner.version_error.take() {
        return Err(unsupported);
    }
    Ok(scanner)
}

impl Scanner {
    fn open_root(
        &mut self,
        path: &Path,
        reader: &NsReader<&[u8]>,
        e: &BytesStart,
        seen_root: &mut bool,
        config: &ExtractConfig,
    ) -> Result<(), GpxExtractError> {
        if *seen_root {
            return Err(parse_error(path, "more than one root element"));
        }
        *seen_root = true;
        check_bound(path, reader, e)?;
        match root_version(path, reader, e)? {
            Ok(version) => {
                self.version = Some(version);
                self.namespace = Some(config.namespace_for(version).to_string());
            }
            Err(unsupported) => self.version_error = Some(unsupported),
        }
        Ok(())
    }

    fn open(
        &mut self,
        path: &Path,
        reader: &NsReader<&[u8]>,
        e: &BytesStart,
    ) -> Result<(), GpxExtractError> {
        // A child element ends the leading text of `<name>`/`<ele>`.
        if self.depth == FIELD_DEPTH {
            self.capture = None;
        }

        let Some(namespace) = self.namespace.as_deref() else {
            return check_attributes(path, reader, e);
        };

        if self.depth == ROOT_DEPTH
            && self.point.is_none()
            && is_gpx_element(reader, e, namespace, b"wpt")
        {
            let mut point = PointScan::default();
            for attr in e.attributes() {
                let attr = attr.map_err(|err| parse_error(path, err))?;
                let value = attr
                    .decode_and_unescape_value(reader.decoder())
                    .map_err(|err| parse_error(path, err))?;
                match attr.key.as_ref() {
                    b"lat" if point.lat.is_none() => point.lat = Some(value.into_owned()),
                    b"lon" if point.lon.is_none() => point.lon = Some(value.into_owned()),
                    _ => {}
                }
            }
            self.point = Some(point);
            self.in_point = true;
            return Ok(());
        }

        if self.in_point && self.depth == POINT_DEPTH {
            if let Some(point) = self.point.as_mut() {
                if point.name.is_none() && is_gpx_element(reader, e, namespace, b"name") {
                    point.name = Some(String::new());
                    self.capture = Some(Capture::Name);
                } else if point.ele.is_none() && is_gpx_element(reader, e, namespace, b"ele") {
                    point.ele = Some(String::new());
                    self.capture = Some(Capture::Ele);
                }
            }
        }
        check_attributes(path, reader, e)
    }

    fn close(&mut self) {
        self.depth -= 1;
        if self.depth == POINT_DEPTH {
            self.capture = None;
        }
        if self.depth == ROOT_DEPTH {
            self.in_point = false;
        }
    }

    fn capturing(&self) -> bool {
        self.capture.is_some() && self.depth == FIELD_DEPTH
    }

    fn push_text(&mut self, s: &str) {
        let Some(point) = self.point.as_mut() else {
            return;
        };
        let target = match self.capture {
            Some(Capture::Name) => point.name.as_mut(),
            Some(Capture::Ele) => point.ele.as_mut(),
            None => None,
        };
        if let Some(target) = target {
            target.push_str(s);
        }
    }
}

/// Decode every attribute value, as a full parse would.
fn check_attributes(
    path: &Path,
    reader: &NsReader<&[u8]>,
    e: &BytesStart,
) -> Result<(), GpxExtractError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| parse_error(path, err))?;
        attr.decode_and_unescape_value(reader.decoder())
            .map_err(|err| parse_error(path, err))?;
    }
    Ok(())
}

/// Reject elements whose prefix is not declared.
fn check_bound(
    path: &Path,
    reader: &NsReader<&[u8]>,
    e: &BytesStart,
) -> Result<(), GpxExtractError> {
    let (ns, _) = reader.resolve_element(e.name());
    if let ResolveResult::Unknown(prefix) = ns {
        return Err(parse_error(
            path,
            format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        ));
    }
    Ok(())
}

fn is_gpx_element(reader: &NsReader<&[u8]>, e: &BytesStart, namespace: &str, local: &[u8]) -> bool {
    let (ns, name) = reader.resolve_element(e.name());
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == namespace.as_bytes())
        && name.as_ref() == local
}

/// Outer error: the root tag is malformed. Inner error: the version is not
/// one this tool reads.
fn root_version(
    path: &Path,
    reader: &NsReader<&[u8]>,
    root: &BytesStart,
) -> Result<Result<GpxVersion, GpxExtractError>, GpxExtractError> {
    let mut declared = None;
    for attr in root.attributes() {
        let attr = attr.map_err(|err| parse_error(path, err))?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| parse_error(path, err))?;
        if attr.key.as_ref() == b"version" && declared.is_none() {
            declared = Some(value.into_owned());
        }
    }

    Ok(declared
        .as_deref()
        .and_then(GpxVersion::from_attribute)
        .ok_or_else(|| GpxExtractError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: declared.clone(),
        }))
}

fn parse_coordinate(
    path: &Path,
    field: WaypointField,
    raw: Option<String>,
    precision: u32,
) -> Result<f64, GpxExtractError> {
    let raw = raw.ok_or_else(|| GpxExtractError::MissingField {
        path: path.to_path_buf(),
        field,
    })?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(round_to(v, precision)),
        _ => Err(GpxExtractError::InvalidNumber {
            path: path.to_path_buf(),
            field,
            value: raw,
        }),
    }
}

fn parse_elevation(path: &Path, raw: &str) -> Result<i64, GpxExtractError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(truncate_elevation)
        .ok_or_else(|| GpxExtractError::InvalidNumber {
            path: path.to_path_buf(),
            field: WaypointField::Ele,
            value: raw.to_string(),
        })
}

fn parse_error(path: &Path, detail: impl fmt::Display) -> GpxExtractError {
    GpxExtractError::ParseError {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}
