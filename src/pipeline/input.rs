//! Input resolution: load a user-supplied GPX path into memory.
//!
//! Each document is read completely before it is parsed; the extractor works
//! on the full contents so a malformed tail is reported even when the first
//! waypoint sits near the top. Files are loaded as raw bytes: the character
//! encoding comes from the XML declaration (or a byte order mark) and is
//! applied by the extractor, so `ISO-8859-1` and `windows-1252` exports from
//! older devices are read as well as UTF-8.

use crate::error::GpxExtractError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read the raw contents of the file at `path`.
///
/// Missing files and permission problems get their own error variants so the
/// CLI can print a targeted hint; everything else is `InputReadFailed`.
pub fn read_document(path: &Path) -> Result<Vec<u8>, GpxExtractError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(GpxExtractError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(GpxExtractError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(GpxExtractError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Input file name without its extension, used as the output point label.
///
/// Only the last extension is removed (`a.b.gpx` → `a.b`), and a leading dot
/// does not count as one (`.gpx` → `.gpx`).
pub fn basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_basename() {
        assert_eq!(basename(Path::new("tracks/morning-run.gpx")), "morning-run");
        assert_eq!(basename(Path::new("a.b.gpx")), "a.b");
        assert_eq!(basename(Path::new("noext")), "noext");
        assert_eq!(basename(Path::new("/abs/dir/Peak.GPX")), "Peak");
        assert_eq!(basename(Path::new(".gpx")), ".gpx");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_document(&PathBuf::from("/definitely/not/here.gpx")).unwrap_err();
        assert!(matches!(err, GpxExtractError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_existing_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"<gpx version=\"1.1\"/>").unwrap();
        let bytes = read_document(tmp.path()).unwrap();
        assert_eq!(bytes, b"<gpx version=\"1.1\"/>");
    }

    #[test]
    fn test_read_keeps_non_utf8_bytes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"<name>Caf\xe9</name>").unwrap();
        let bytes = read_document(tmp.path()).unwrap();
        assert_eq!(bytes, b"<name>Caf\xe9</name>");
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_document(dir.path()).is_err());
    }
}
