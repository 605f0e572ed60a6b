//! Writer: serialise the element tree and replace the output file.
//!
//! Rendering uses quick-xml's indenting writer (two spaces per level) behind
//! an `<?xml version="1.0" encoding="UTF-8"?>` declaration. A regular file is
//! replaced atomically: a temp file next to the target is written in full
//! and then renamed over it, so a failed run never leaves half a document.
//! Symlinks are followed, so the file they point at is replaced and the link
//! stays. Targets that are not regular files (`/dev/stdout`, a named pipe)
//! cannot be renamed over and are written directly.

use crate::error::GpxExtractError;
use crate::pipeline::build::{Element, Node};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const INDENT_WIDTH: usize = 2;

/// Render `root` as an indented, UTF-8 XML document ending in a newline.
pub fn write_document(root: &Element) -> Result<String, GpxExtractError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(internal)?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(internal)
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), GpxExtractError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let has_content = el
        .children
        .iter()
        .any(|n| !matches!(n, Node::Text(t) if t.is_empty()));
    if !has_content {
        return writer.write_event(Event::Empty(start)).map_err(internal);
    }

    writer.write_event(Event::Start(start)).map_err(internal)?;
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) if t.is_empty() => {}
            Node::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(internal)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(internal)
}

/// Replace the file at `path` with `contents`.
///
/// The parent directory must exist. An existing file keeps its permissions.
pub fn write_to_file(path: &Path, contents: &str) -> Result<(), GpxExtractError> {
    let fail = |source: std::io::Error| GpxExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    // `metadata` follows symlinks.
    if let Ok(existing) = fs::metadata(path) {
        if !existing.is_file() {
            write_direct(path, contents).map_err(fail)?;
            debug!("Wrote {} bytes to {} (direct)", contents.len(), path.display());
            return Ok(());
        }
    }
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = target.as_path();

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(contents.as_bytes()).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;

    match fs::metadata(path) {
        Ok(existing) => tmp
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(fail)?,
        Err(_) => default_permissions(tmp.as_file()).map_err(fail)?,
    }

    tmp.persist(path).map_err(|e| fail(e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

fn write_direct(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

// Temp files are created owner-only.
#[cfg(unix)]
fn default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

fn internal(e: impl fmt::Display) -> GpxExtractError {
    GpxExtractError::Internal(format!("XML serialisation failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_and_indentation() {
        let root = Element::new("gpx")
            .attr("version", "1.1")
            .child(
                Element::new("wpt")
                    .attr("lat", "1.0")
                    .child(Element::text("name", "a")),
            );
        let xml = write_document(&root).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <gpx version=\"1.1\">\n  \
               <wpt lat=\"1.0\">\n    \
                 <name>a</name>\n  \
               </wpt>\n\
             </gpx>\n"
        );
    }

    #[test]
    fn test_empty_text_renders_self_closing() {
        let root = Element::new("wpt").child(Element::text("desc", ""));
        let xml = write_document(&root).unwrap();
        assert!(xml.contains("<desc/>"), "got: {xml}");
    }

    #[test]
    fn test_escaping() {
        let root = Element::new("wpt")
            .attr("note", "a\"b<c")
            .child(Element::text("desc", "Fish & Chips <open>"));
        let xml = write_document(&root).unwrap();
        assert!(xml.contains("Fish &amp; Chips &lt;open&gt;"), "got: {xml}");
        assert!(!xml.contains("a\"b<c"), "got: {xml}");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gpx");
        fs::write(&path, "old content that is longer than the new one").unwrap();

        write_to_file(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // No temp files left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_symlink_keeps_link() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.gpx");
        let link = dir.path().join("link.gpx");
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_to_file(&link, "new").unwrap();
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_to_character_device() {
        use std::os::unix::fs::FileTypeExt;

        write_to_file(Path::new("/dev/null"), "<gpx/>").unwrap();
        assert!(fs::metadata("/dev/null").unwrap().file_type().is_char_device());
    }

    #[test]
    fn test_write_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_to_file(dir.path(), "x").unwrap_err();
        assert!(matches!(err, GpxExtractError::OutputWriteFailed { .. }));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.gpx");
        let err = write_to_file(&path, "x").unwrap_err();
        assert!(matches!(err, GpxExtractError::OutputWriteFailed { .. }));
        assert!(!path.exists());
    }
}
