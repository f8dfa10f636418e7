//! Import diagnostics for scriptdok
//!
//! An import that succeeds can still carry warnings: a fallback strategy was
//! used, classification confidence is low, or the source had no scenes where
//! some were expected. These are reported as [`Diagnostic`]s next to the
//! scenes rather than as errors.

use serde::{Deserialize, Serialize};

/// A diagnostic message from an import
///
/// # Example
///
/// ```
/// use scriptdok_core::diagnostics::{Diagnostic, Location, Severity};
///
/// let diag = Diagnostic::new(Severity::Warning, "Structured parse found no headings")
///     .with_code("W002")
///     .with_location(Location::page(3))
///     .with_help("The document was re-read with the heading pattern scan");
/// assert!(diag.is_warning());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Optional warning code (e.g., "W0001")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Where in the source the issue was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Related notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning, the result may be degraded
    Warning,
}

/// A position in a screenplay source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Page number (1-indexed), for paged sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Line or paragraph number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            location: None,
            help: None,
            notes: Vec::new(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl Location {
    /// A whole page
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            line: None,
        }
    }

    /// A line in an unpaged source
    pub fn line(line: usize) -> Self {
        Self {
            page: None,
            line: Some(line),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.page, self.line) {
            (Some(page), Some(line)) => write!(f, "page {}, line {}", page, line),
            (Some(page), None) => write!(f, "page {}", page),
            (None, Some(line)) => write!(f, "line {}", line),
            (None, None) => write!(f, "document"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref location) = self.location {
            write!(f, "\n  --> {}", location)?;
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}
