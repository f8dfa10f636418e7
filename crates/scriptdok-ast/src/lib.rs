//! scriptdok-ast - Scene and screenplay element definitions
//!
//! This crate provides the data model shared by every scriptdok import path:
//! the scene drafts an import produces, the classified elements the heuristic
//! parsers work with, the positioned text lines a PDF extractor hands in, and
//! the durable revision record.

pub mod element;
pub mod revision;
pub mod scene;

pub use element::{is_all_caps, ElementType, ParsedElement, TextLine};
pub use revision::{RevisionColor, RevisionDelta, RevisionRecord};
pub use scene::{LocationType, SceneDraft};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
