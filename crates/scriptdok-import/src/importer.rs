//! Import orchestration
//!
//! Detect the format, unpack archives into a scoped scratch directory, run
//! the primary strategy, fall back to the pattern scan when it comes back
//! empty, then tag scenes and (optionally) record a revision.

use std::path::PathBuf;

use scriptdok_ast::{RevisionColor, RevisionRecord, SceneDraft, TextLine};
use scriptdok_core::{Diagnostic, Location};
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::ScratchArchive;
use crate::detect::{detect, SourceFormat};
use crate::error::{ImportError, Result};
use crate::fallback::PatternScanner;
use crate::pdf::{ColumnLayout, LineSource, PdfLayoutParser};
use crate::progress::{emit, ImportStage, ProgressEvent, ProgressSink};
use crate::revision::{hash_source, tag_scenes, RevisionRequest, RevisionTracker, TaggedScene};
use crate::store::{ImportBatch, SceneStore};
use crate::strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};
use crate::style::StyleParser;
use crate::xml::XmlSceneParser;

/// A structured parse with fewer headings than one per this many bytes is
/// cross-checked with the pattern scan
pub const HEADING_DENSITY_BYTES: usize = 40_000;

/// Result of one import
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub file_name: String,
    /// Format of the document that was parsed (the inner one for archives)
    pub format: SourceFormat,
    pub strategy: Strategy,
    /// Archive entry the scenes were read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub file_hash: String,
    pub scenes: Vec<TaggedScene>,
    pub warnings: Vec<Diagnostic>,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<RevisionRecord>,
}

impl ImportOutcome {
    /// The scene drafts, in ordinal order
    pub fn drafts(&self) -> impl Iterator<Item = &SceneDraft> {
        self.scenes.iter().map(|t| &t.scene)
    }

    /// Total length in eighths
    pub fn total_eighths(&self) -> u64 {
        self.drafts().map(|s| u64::from(s.page_length_eighths)).sum()
    }
}

/// The document a strategy runs on
struct Source {
    format: SourceFormat,
    document: Option<String>,
    body: SourceBody,
}

enum SourceBody {
    Text(String),
    Lines(Vec<TextLine>),
}

/// Screenplay importer
///
/// # Example
///
/// ```
/// use scriptdok_import::{NullProgress, ScriptImporter};
///
/// let text = b"INT. KITCHEN - DAY\n\nJohn enters.\n\nEXT. STREET - NIGHT\n";
/// let outcome = ScriptImporter::new()
///     .import(text, "pilot.txt", &NullProgress)
///     .unwrap();
/// assert_eq!(outcome.scenes.len(), 2);
/// ```
pub struct ScriptImporter {
    layout: ColumnLayout,
    scratch_root: Option<PathBuf>,
    tracker: RevisionTracker,
    revision: Option<RevisionRequest>,
    line_source: Option<Box<dyn LineSource>>,
}

impl Default for ScriptImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptImporter {
    pub fn new() -> Self {
        Self {
            layout: ColumnLayout::default(),
            scratch_root: None,
            tracker: RevisionTracker::default(),
            revision: None,
            line_source: None,
        }
    }

    /// Column layout for PDF classification
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Directory under which archive scratch directories are created
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Line extractor for PDF sources
    pub fn with_line_source(mut self, source: impl LineSource + 'static) -> Self {
        self.line_source = Some(Box::new(source));
        self
    }

    pub fn with_tracker(mut self, tracker: RevisionTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Record a revision for every import
    pub fn track_revisions(mut self, request: RevisionRequest) -> Self {
        self.revision = Some(request);
        self
    }

    /// Import raw source bytes
    pub fn import(
        &self,
        bytes: &[u8],
        file_name: &str,
        progress: &dyn ProgressSink,
    ) -> Result<ImportOutcome> {
        self.run(bytes, file_name, None, progress)
    }

    /// Import lines already extracted from a PDF
    pub fn import_lines(
        &self,
        lines: &[TextLine],
        file_name: &str,
        progress: &dyn ProgressSink,
    ) -> Result<ImportOutcome> {
        let file_hash = hash_source(&serde_json::to_vec(lines)?);
        let source = Source {
            format: SourceFormat::Pdf,
            document: None,
            body: SourceBody::Lines(lines.to_vec()),
        };
        self.finish(source, file_name, file_hash, None, progress)
    }

    /// Import and commit the result to a store as one batch
    pub fn import_into(
        &self,
        store: &mut dyn SceneStore,
        bytes: &[u8],
        file_name: &str,
        progress: &dyn ProgressSink,
    ) -> Result<ImportOutcome> {
        let prior_color = store.latest_revision()?.map(|r| r.color);
        let outcome = self.run(bytes, file_name, prior_color, progress)?;

        emit(
            progress,
            ProgressEvent::new(ImportStage::Committing, 0.95, "Committing import"),
        );
        store.commit(ImportBatch {
            scenes: outcome.scenes.clone(),
            revision: outcome.revision.clone(),
        })?;

        Ok(outcome)
    }

    fn run(
        &self,
        bytes: &[u8],
        file_name: &str,
        prior_color: Option<RevisionColor>,
        progress: &dyn ProgressSink,
    ) -> Result<ImportOutcome> {
        emit(
            progress,
            ProgressEvent::new(ImportStage::Detecting, 0.0, "Detecting format")
                .with_detail(file_name),
        );
        let file_hash = hash_source(bytes);
        let source = self.load_source(bytes, file_name, progress)?;
        self.finish(source, file_name, file_hash, prior_color, progress)
    }

    /// Resolve the bytes to the document a strategy can run on.
    ///
    /// The archive scratch directory lives only for the duration of this
    /// call.
    fn load_source(
        &self,
        bytes: &[u8],
        file_name: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Source> {
        let detection = detect(bytes, file_name)?;

        match detection.format {
            SourceFormat::Archive => {
                emit(
                    progress,
                    ProgressEvent::new(ImportStage::Extracting, 0.1, "Extracting archive"),
                );
                let archive = ScratchArchive::extract(bytes, self.scratch_root.as_deref())?;
                let (entry, document) = archive.script_document()?;
                let inner = detect(&document, &entry)?;
                match (inner.format, inner.text) {
                    (SourceFormat::Archive | SourceFormat::Pdf, _) | (_, None) => {
                        Err(ImportError::Unsupported(format!(
                            "archive entry {} is not a text document",
                            entry
                        )))
                    }
                    (format, Some(text)) => Ok(Source {
                        format,
                        document: Some(entry),
                        body: SourceBody::Text(text),
                    }),
                }
            }
            SourceFormat::Pdf => {
                let line_source = self.line_source.as_ref().ok_or_else(|| {
                    ImportError::Unsupported(
                        "PDF input needs a line extractor or pre-extracted lines".to_string(),
                    )
                })?;
                Ok(Source {
                    format: SourceFormat::Pdf,
                    document: None,
                    body: SourceBody::Lines(line_source.extract_lines(bytes)?),
                })
            }
            format => Ok(Source {
                format,
                document: None,
                body: SourceBody::Text(detection.text.unwrap_or_default()),
            }),
        }
    }

    fn finish(
        &self,
        source: Source,
        file_name: &str,
        file_hash: String,
        prior_color: Option<RevisionColor>,
        progress: &dyn ProgressSink,
    ) -> Result<ImportOutcome> {
        let input = match &source.body {
            SourceBody::Text(text) => ParseInput::Text(text),
            SourceBody::Lines(lines) => ParseInput::Lines(lines),
        };
        let strategy = Strategy::for_format(source.format).ok_or_else(|| {
            ImportError::Unsupported(format!("no strategy for {}", source.format))
        })?;

        let outcome = self.parse_with_fallback(strategy, &input, progress)?;

        let revision = self.revision.as_ref().map(|request| {
            emit(
                progress,
                ProgressEvent::new(ImportStage::Tracking, 0.9, "Recording revision"),
            );
            self.tracker
                .create_record(file_name, &file_hash, &outcome.scenes, request, prior_color)
        });

        info!(
            "Imported {} scenes from {} ({}, {}, confidence {:.2})",
            outcome.scenes.len(),
            file_name,
            source.format,
            outcome.strategy,
            outcome.confidence
        );
        emit(
            progress,
            ProgressEvent::new(
                ImportStage::Done,
                1.0,
                format!("Imported {} scenes", outcome.scenes.len()),
            ),
        );

        Ok(ImportOutcome {
            file_name: file_name.to_string(),
            format: source.format,
            strategy: outcome.strategy,
            document: source.document,
            scenes: tag_scenes(&file_hash, outcome.scenes),
            file_hash,
            warnings: outcome.warnings,
            confidence: outcome.confidence,
            revision,
        })
    }

    fn parser(&self, strategy: Strategy) -> Box<dyn SceneParser> {
        match strategy {
            Strategy::StructuredXml => Box::new(XmlSceneParser),
            Strategy::StyleClasses => Box::new(StyleParser),
            Strategy::PatternScan => Box::new(PatternScanner),
            Strategy::PdfLayout => Box::new(PdfLayoutParser::new(self.layout.clone())),
        }
    }

    /// Run the primary strategy and fall back to the pattern scan when it
    /// fails to parse, finds nothing, or finds implausibly few headings.
    ///
    /// The PDF path never falls back: an empty result is returned as is.
    fn parse_with_fallback(
        &self,
        strategy: Strategy,
        input: &ParseInput<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<ParseOutcome> {
        emit(
            progress,
            ProgressEvent::new(ImportStage::Parsing, 0.3, format!("Parsing ({})", strategy)),
        );

        let mut syntax_line = None;
        let (mut outcome, reason) = match self.parser(strategy).parse(input) {
            Ok(outcome) => {
                let reason = fallback_reason(&outcome, input.len());
                (outcome, reason)
            }
            Err(ImportError::XmlParseFailed(err)) => {
                syntax_line = err.line;
                (
                    ParseOutcome::new(strategy, Vec::new()),
                    Some(format!("structured parse failed: {}", err.message)),
                )
            }
            Err(err) => return Err(err),
        };

        if strategy == Strategy::PdfLayout {
            return Ok(outcome);
        }

        if let Some(reason) = reason {
            if outcome.strategy != Strategy::PatternScan {
                warn!("{}; trying pattern scan", reason);
                emit(
                    progress,
                    ProgressEvent::new(ImportStage::Fallback, 0.6, "Scanning for headings")
                        .with_detail(reason.clone()),
                );
                let scan = PatternScanner.parse(input)?;
                if scan.scenes.len() > outcome.scenes.len() {
                    let mut warnings = std::mem::take(&mut outcome.warnings);
                    let mut warning =
                        Diagnostic::warning(format!("{}; headings recovered by pattern scan", reason))
                            .with_code("W003")
                            .with_help("scene numbers, lengths and body text may be incomplete");
                    if let Some(line) = syntax_line {
                        warning = warning.with_location(Location::line(line));
                    }
                    warnings.push(warning);
                    outcome = scan;
                    warnings.append(&mut outcome.warnings);
                    outcome.warnings = warnings;
                }
            }
        }

        if outcome.scenes.is_empty() {
            return Err(ImportError::NoScenesFound);
        }
        Ok(outcome)
    }
}

/// Why a primary outcome should be cross-checked with the pattern scan
fn fallback_reason(outcome: &ParseOutcome, input_len: usize) -> Option<String> {
    let found = outcome.scenes.len();
    if found == 0 {
        return Some(format!("{} found no scenes", outcome.strategy));
    }
    if outcome.strategy == Strategy::StructuredXml
        && found.saturating_mul(HEADING_DENSITY_BYTES) < input_len
    {
        return Some(format!(
            "only {} headings in {} bytes of structured markup",
            found, input_len
        ));
    }
    None
}
