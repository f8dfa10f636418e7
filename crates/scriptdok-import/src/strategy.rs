//! Parsing strategies
//!
//! Each import path implements [`SceneParser`]; the importer picks a
//! [`Strategy`] from the detected format and falls back to the pattern scan
//! when the primary strategy comes back empty.

use std::borrow::Cow;

use scriptdok_ast::{SceneDraft, TextLine};
use scriptdok_core::Diagnostic;
use serde::Serialize;

use crate::detect::SourceFormat;
use crate::error::Result;

/// Input handed to a parser
#[derive(Debug, Clone, Copy)]
pub enum ParseInput<'a> {
    /// Decoded document text
    Text(&'a str),
    /// Positioned lines from a PDF extractor
    Lines(&'a [TextLine]),
}

impl<'a> ParseInput<'a> {
    /// The input as plain text; lines are joined with newlines
    pub fn text(&self) -> Cow<'a, str> {
        match *self {
            ParseInput::Text(text) => Cow::Borrowed(text),
            ParseInput::Lines(lines) => Cow::Owned(
                lines
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }

    /// Size of the input in bytes
    pub fn len(&self) -> usize {
        match *self {
            ParseInput::Text(text) => text.len(),
            ParseInput::Lines(lines) => lines.iter().map(|l| l.text.len() + 1).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How scenes were recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Structured script markup, read with the state machine
    StructuredXml,
    /// Class-tagged HTML blocks
    StyleClasses,
    /// Heading-line regex scan
    PatternScan,
    /// Column-based classification of positioned PDF lines
    PdfLayout,
}

impl Strategy {
    /// Primary strategy for a detected format.
    ///
    /// Archives have none until their inner document is detected.
    pub fn for_format(format: SourceFormat) -> Option<Self> {
        match format {
            SourceFormat::ScriptXml => Some(Strategy::StructuredXml),
            SourceFormat::Html => Some(Strategy::StyleClasses),
            SourceFormat::PlainText => Some(Strategy::PatternScan),
            SourceFormat::Pdf => Some(Strategy::PdfLayout),
            SourceFormat::Archive => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::StructuredXml => "structured-xml",
            Strategy::StyleClasses => "style-classes",
            Strategy::PatternScan => "pattern-scan",
            Strategy::PdfLayout => "pdf-layout",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a parser recovered
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub scenes: Vec<SceneDraft>,
    pub warnings: Vec<Diagnostic>,
    /// Overall certainty, 0.0 to 1.0
    pub confidence: f32,
    pub strategy: Strategy,
}

impl ParseOutcome {
    /// Outcome whose confidence is the mean scene confidence (0.0 when empty)
    pub fn new(strategy: Strategy, scenes: Vec<SceneDraft>) -> Self {
        let confidence = if scenes.is_empty() {
            0.0
        } else {
            scenes.iter().map(|s| s.confidence).sum::<f32>() / scenes.len() as f32
        };
        Self {
            scenes,
            warnings: Vec::new(),
            confidence,
            strategy,
        }
    }

    /// Attach a warning
    pub fn with_warning(mut self, warning: Diagnostic) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// A way of turning source input into scenes
pub trait SceneParser {
    /// The strategy this parser implements
    fn strategy(&self) -> Strategy;

    /// Recover scenes from the input
    fn parse(&self, input: &ParseInput<'_>) -> Result<ParseOutcome>;
}
