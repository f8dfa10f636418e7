//! PDF layout import
//!
//! PDF decoding is not done here: a [`LineSource`] supplies positioned
//! lines, which are classified by indent and content and assembled into
//! scenes. Page lengths on this path are estimates.

pub mod classifier;
pub mod layout;

pub use classifier::LayoutClassifier;
pub use layout::{Column, ColumnLayout};

use scriptdok_ast::TextLine;
use scriptdok_core::{Diagnostic, Location};
use tracing::{debug, warn};

use crate::assembler::SceneAssembler;
use crate::error::{ImportError, Result};
use crate::strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};

/// Supplies positioned text lines for a PDF
pub trait LineSource: Send + Sync {
    /// Extract page-ordered lines from raw PDF bytes
    fn extract_lines(&self, pdf: &[u8]) -> Result<Vec<TextLine>>;
}

/// Lines extracted ahead of time
impl LineSource for Vec<TextLine> {
    fn extract_lines(&self, _pdf: &[u8]) -> Result<Vec<TextLine>> {
        Ok(self.clone())
    }
}

/// The PDF layout strategy
#[derive(Debug, Clone, Default)]
pub struct PdfLayoutParser {
    classifier: LayoutClassifier,
}

impl PdfLayoutParser {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            classifier: LayoutClassifier::new(layout),
        }
    }

    /// Classify lines and assemble scenes.
    ///
    /// A document without a single heading is not an error: it comes back
    /// empty with a warning and zero confidence.
    pub fn parse_lines(&self, lines: &[TextLine]) -> ParseOutcome {
        let elements = self.classifier.classify(lines);
        let scenes = SceneAssembler::new().assemble(&elements);
        debug!(
            "Layout classification: {} lines, {} elements, {} scenes",
            lines.len(),
            elements.len(),
            scenes.len()
        );

        if scenes.is_empty() {
            warn!("No scene headings among {} lines", lines.len());
            let mut warning =
                Diagnostic::warning(format!("no scene headings found in {} lines", lines.len()))
                    .with_code("W002")
                    .with_help("check the [pdf] column layout against the script's indents");
            let first_page = lines.iter().map(|l| l.page).min();
            let last_page = lines.iter().map(|l| l.page).max();
            if let (Some(first), Some(last)) = (first_page, last_page) {
                warning = warning
                    .with_location(Location::page(first))
                    .with_note(format!("searched pages {} to {}", first, last));
            }
            return ParseOutcome::new(Strategy::PdfLayout, scenes).with_warning(warning);
        }

        ParseOutcome::new(Strategy::PdfLayout, scenes).with_warning(
            Diagnostic::info("page lengths are estimated from the pages each scene touches")
                .with_code("I001"),
        )
    }
}

impl SceneParser for PdfLayoutParser {
    fn strategy(&self) -> Strategy {
        Strategy::PdfLayout
    }

    fn parse(&self, input: &ParseInput<'_>) -> Result<ParseOutcome> {
        match input {
            ParseInput::Lines(lines) => Ok(self.parse_lines(lines)),
            ParseInput::Text(_) => Err(ImportError::Unsupported(
                "layout classification needs positioned lines".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{columns, PageWriter};
    use scriptdok_ast::LocationType;

    #[test]
    fn test_parse_two_page_script() {
        let lines = PageWriter::new()
            .line("INT. KITCHEN - DAY", columns::ACTION)
            .gap()
            .line("John pours coffee.", columns::ACTION)
            .gap()
            .line("JOHN", columns::CHARACTER)
            .line("(tired)", columns::PARENTHETICAL)
            .line("Another Monday.", columns::DIALOGUE)
            .next_page()
            .line("CUT TO:", columns::TRANSITION)
            .gap()
            .line("EXT. STREET - NIGHT", columns::ACTION)
            .finish();

        let outcome = PdfLayoutParser::default().parse_lines(&lines);
        assert_eq!(outcome.strategy, Strategy::PdfLayout);
        assert_eq!(outcome.scenes.len(), 2);

        let kitchen = &outcome.scenes[0];
        assert_eq!(kitchen.location_type, Some(LocationType::Int));
        assert_eq!(
            kitchen.script_text.as_deref(),
            Some("John pours coffee.\nJOHN\n(tired)\nAnother Monday.\nCUT TO:")
        );
        assert_eq!(kitchen.page_number, Some(1));
        assert_eq!(kitchen.page_length_eighths, 8);

        let street = &outcome.scenes[1];
        assert_eq!(street.page_number, Some(2));
        assert_eq!(street.page_length_eighths, 4);
        assert!(outcome.confidence > 0.0);
    }

    #[test]
    fn test_no_headings_is_empty_success() {
        let lines = PageWriter::new()
            .line("Just some notes.", columns::ACTION)
            .finish();
        let outcome = PdfLayoutParser::default().parse_lines(&lines);
        assert!(outcome.scenes.is_empty());
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.warnings.iter().any(|w| w.is_warning()));
    }

    #[test]
    fn test_no_headings_warning_points_at_pages() {
        let lines = PageWriter::new()
            .next_page()
            .next_page()
            .line("Just some notes.", columns::ACTION)
            .next_page()
            .line("More notes.", columns::ACTION)
            .finish();
        let outcome = PdfLayoutParser::default().parse_lines(&lines);
        let warning = &outcome.warnings[0];
        assert_eq!(warning.code.as_deref(), Some("W002"));
        assert_eq!(warning.location, Some(Location::page(lines[0].page)));
        assert!(warning.help.as_deref().unwrap().contains("[pdf]"));
        assert_eq!(
            warning.notes,
            vec![format!(
                "searched pages {} to {}",
                lines[0].page,
                lines[lines.len() - 1].page
            )]
        );
    }

    #[test]
    fn test_scene_spanning_extreme_page_numbers() {
        let lines = vec![
            TextLine::new("INT. KITCHEN - DAY", 1, 72.0, columns::ACTION),
            TextLine::new("John enters.", u32::MAX, 96.0, columns::ACTION),
        ];
        let outcome = PdfLayoutParser::default().parse_lines(&lines);
        assert_eq!(outcome.scenes.len(), 1);
        assert_eq!(outcome.scenes[0].page_length_eighths, u32::MAX / 2);
    }

    #[test]
    fn test_text_input_is_unsupported() {
        let result = PdfLayoutParser::default().parse(&ParseInput::Text("INT. A - DAY"));
        assert!(matches!(result, Err(ImportError::Unsupported(_))));
    }

    #[test]
    fn test_pre_extracted_lines_source() {
        let lines = vec![TextLine::new("INT. A - DAY", 1, 72.0, 108.0)];
        assert_eq!(lines.extract_lines(b"%PDF-1.4").unwrap(), lines);
    }
}
