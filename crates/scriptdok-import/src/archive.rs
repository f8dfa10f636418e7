//! Archive handling for zipped screenplay exports
//!
//! Celtx projects, Fade In documents and zipped exports are ZIP archives
//! holding one markup document among assets and metadata. The archive is
//! unpacked into a scratch directory scoped to one import; the directory is
//! removed when the [`ScratchArchive`] is dropped, on every exit path.

use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;
use tracing::debug;
use zip::read::ZipArchive;

use crate::error::{ImportError, Result};

/// File extensions that can hold a script document
const MARKUP_EXTENSIONS: &[&str] = &["xml", "html", "htm", "xhtml", "fdx", "osf"];

/// Entry names that never hold the script itself
const METADATA_NAMES: &[&str] = &[
    "[content_types].xml",
    "manifest.xml",
    "meta.xml",
    "settings.xml",
    "styles.xml",
];

/// Name fragments that mark the preferred script document
const SCRIPT_HINTS: &[&str] = &["script", "screenplay", "index"];

/// An archive unpacked into a scratch directory
#[derive(Debug)]
pub struct ScratchArchive {
    /// Scratch directory; deleted on drop
    dir: TempDir,
    /// Relative paths of all file entries, sorted
    entries: Vec<String>,
}

impl ScratchArchive {
    /// Unpack archive bytes into a fresh scratch directory.
    ///
    /// The directory is created under `scratch_root` when given, otherwise
    /// under the system temp directory.
    pub fn extract(bytes: &[u8], scratch_root: Option<&Path>) -> Result<Self> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("scriptdok-");
            b
        };
        let dir = match scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            // Entries escaping the archive root are skipped by extract too
            if let Some(path) = file.enclosed_name() {
                entries.push(path.to_string_lossy().replace('\\', "/"));
            }
        }
        entries.sort();

        archive.extract(dir.path())?;
        debug!(
            "Extracted {} entries into {}",
            entries.len(),
            dir.path().display()
        );

        Ok(Self { dir, entries })
    }

    /// Scratch directory path (valid until drop)
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// All file entries, sorted
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Read the script document: the entry chosen by [`select_script_entry`]
    pub fn script_document(&self) -> Result<(String, Vec<u8>)> {
        let entry = select_script_entry(&self.entries).ok_or(ImportError::NoDocumentFound)?;
        let bytes = std::fs::read(self.dir.path().join(entry))?;
        debug!("Selected archive entry {} ({} bytes)", entry, bytes.len());
        Ok((entry.to_string(), bytes))
    }
}

/// Pick the entry most likely to hold the script.
///
/// Markup entries whose file name mentions "script", "screenplay" or
/// "index" win; otherwise the first markup entry in sorted order. Metadata
/// entries and hidden directories are never chosen.
pub fn select_script_entry(entries: &[String]) -> Option<&str> {
    let candidates: Vec<&str> = entries
        .iter()
        .map(String::as_str)
        .filter(|e| is_plausible_markup(e))
        .collect();

    candidates
        .iter()
        .find(|e| {
            let base = base_name(e).to_lowercase();
            SCRIPT_HINTS.iter().any(|hint| base.contains(hint))
        })
        .or_else(|| candidates.first())
        .copied()
}

fn is_plausible_markup(entry: &str) -> bool {
    let lower = entry.to_lowercase();
    if lower.starts_with("meta-inf/")
        || lower.starts_with("__macosx/")
        || lower.starts_with("_rels/")
        || lower.split('/').any(|part| part.starts_with('.'))
    {
        return false;
    }
    let base = base_name(&lower);
    if METADATA_NAMES.contains(&base) {
        return false;
    }
    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| MARKUP_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn base_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_zip;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_prefers_script_names() {
        let entries = names(&[
            "META-INF/container.xml",
            "notes.html",
            "project.rdf",
            "script-4f1a.html",
        ]);
        assert_eq!(select_script_entry(&entries), Some("script-4f1a.html"));
    }

    #[test]
    fn test_select_falls_back_to_first_markup() {
        let entries = names(&["[Content_Types].xml", "document.xml", "images/cover.png"]);
        assert_eq!(select_script_entry(&entries), Some("document.xml"));
    }

    #[test]
    fn test_select_none_without_markup() {
        let entries = names(&["cover.png", "META-INF/manifest.xml", ".hidden/script.xml"]);
        assert_eq!(select_script_entry(&entries), None);
    }

    #[test]
    fn test_extract_and_read_document() {
        let bytes = build_zip(&[
            ("project.rdf", "<rdf/>"),
            ("script-1.html", "<p class=\"sceneheading\">INT. A - DAY</p>"),
        ]);
        let archive = ScratchArchive::extract(&bytes, None).unwrap();
        assert_eq!(archive.entries().len(), 2);

        let (name, doc) = archive.script_document().unwrap();
        assert_eq!(name, "script-1.html");
        assert!(String::from_utf8(doc).unwrap().contains("sceneheading"));
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let bytes = build_zip(&[("document.xml", "<document/>")]);

        let archive = ScratchArchive::extract(&bytes, Some(root.path())).unwrap();
        let scratch = archive.path().to_path_buf();
        assert!(scratch.exists());
        assert!(scratch.starts_with(root.path()));

        drop(archive);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_no_document_found() {
        let bytes = build_zip(&[("cover.png", "not really a png")]);
        let archive = ScratchArchive::extract(&bytes, None).unwrap();
        assert!(matches!(
            archive.script_document(),
            Err(ImportError::NoDocumentFound)
        ));
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let root = TempDir::new().unwrap();
        let result = ScratchArchive::extract(b"PK\x03\x04garbage", Some(root.path()));
        assert!(matches!(result, Err(ImportError::Archive(_))));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
