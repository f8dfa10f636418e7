//! Error types for import operations

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can end an import
///
/// Degraded results (fallback strategies, low confidence) are not errors;
/// they come back as warnings on a successful import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source bytes could not be decoded as text
    #[error("Invalid encoding: source is not UTF-8, UTF-16 or Windows-1252 text")]
    InvalidEncoding,

    /// The structured XML parser could not read the document
    #[error("XML parse failed: {0}")]
    XmlParseFailed(XmlSyntaxError),

    /// An archive held no recognizable script document
    #[error("No script document found in archive")]
    NoDocumentFound,

    /// Every strategy, fallbacks included, came back empty
    #[error("No scenes found")]
    NoScenesFound,

    /// The source or the scratch directory could not be accessed
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The persistence adapter rejected the import batch
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] StoreError),

    /// Error reading the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported input
    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ImportError::AccessDenied(err.to_string()),
            _ => ImportError::Io(err),
        }
    }
}

/// What the XML reader rejected, and on which source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSyntaxError {
    pub message: String,
    /// 1-based line of the offending markup, when known
    pub line: Option<usize>,
}

impl XmlSyntaxError {
    /// Build an error positioned at a byte offset of `source`
    pub fn at_offset(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let end = offset.min(source.len());
        let line = source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1;
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for XmlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;
