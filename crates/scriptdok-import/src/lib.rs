//! # scriptdok-import
//!
//! Screenplay import and normalization for scriptdok.
//!
//! This crate turns screenplay sources into one canonical scene list:
//! - Final Draft and Open Screenplay Format markup
//! - Zipped exports (Celtx, Fade In), unpacked into a scoped scratch directory
//! - Class-tagged HTML exports
//! - PDFs, through positioned lines from an external extractor
//! - Anything else, through a heading-line pattern scan
//!
//! ## Example: Importing a Final Draft file
//!
//! ```no_run
//! use scriptdok_import::{NullProgress, RevisionRequest, ScriptImporter};
//!
//! let bytes = std::fs::read("pilot.fdx")?;
//! let outcome = ScriptImporter::new()
//!     .track_revisions(RevisionRequest::new("editor"))
//!     .import(&bytes, "pilot.fdx", &NullProgress)?;
//!
//! for scene in outcome.drafts() {
//!     println!("{} {}", scene.number, scene.heading);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod assembler;
pub mod detect;
pub mod error;
pub mod fallback;
pub mod importer;
pub mod markup;
pub mod pdf;
pub mod progress;
pub mod revision;
pub mod store;
pub mod strategy;
pub mod style;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::{select_script_entry, ScratchArchive};
pub use assembler::{format_body_line, OpenScene, SceneAssembler};
pub use detect::{detect, Detection, SourceFormat};
pub use error::{ImportError, Result, XmlSyntaxError};
pub use fallback::{scan_headings, PatternScanner, PATTERN_SCAN_CONFIDENCE};
pub use importer::{ImportOutcome, ScriptImporter, HEADING_DENSITY_BYTES};
pub use markup::markup_to_text;
pub use pdf::{ColumnLayout, LayoutClassifier, LineSource, PdfLayoutParser};
pub use progress::{ImportStage, NullProgress, ProgressEvent, ProgressSink};
pub use revision::{
    hash_source, provenance_key, tag_scenes, RevisionRequest, RevisionTracker, TaggedScene,
};
pub use store::{ImportBatch, JsonFileStore, MemoryStore, ProjectData, SceneStore, StoreError};
pub use strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};
pub use style::StyleParser;
pub use xml::{parse_script_xml, XmlSceneParser};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
