//! Screenplay elements and positioned text lines
//!
//! The heuristic import paths (PDF layout and HTML style classification)
//! first turn their input into a stream of [`ParsedElement`]s before scenes
//! are assembled. [`TextLine`] is the contract with the external PDF text
//! extractor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of screenplay element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    SceneHeading,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    Transition,
    Shot,
    PageNumber,
    TitlePage,
    Unknown,
}

impl ElementType {
    /// Map a paragraph type, style name or CSS class to an element type.
    ///
    /// Matching ignores case, whitespace, hyphens and underscores, so
    /// `"Scene Heading"`, `"scene-heading"` and `"sceneheading"` all map to
    /// [`ElementType::SceneHeading`]. Returns `None` for names outside the
    /// table; callers decide what an unmatched name means.
    pub fn from_style_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        let element = match key.as_str() {
            "sceneheading" | "sceneheader" | "slugline" | "slug" | "scene" | "heading" => {
                ElementType::SceneHeading
            }
            "action" | "general" | "description" => ElementType::Action,
            "character" | "charactername" | "char" => ElementType::Character,
            "dialog" | "dialogue" => ElementType::Dialogue,
            "parenthetical" | "paren" | "wryly" => ElementType::Parenthetical,
            "transition" => ElementType::Transition,
            "shot" => ElementType::Shot,
            "pagenumber" => ElementType::PageNumber,
            "titlepage" | "title" => ElementType::TitlePage,
            _ => return None,
        };
        Some(element)
    }

    /// Human-readable label ("Scene Heading", "Dialogue", ...)
    pub fn label(self) -> &'static str {
        match self {
            ElementType::SceneHeading => "Scene Heading",
            ElementType::Action => "Action",
            ElementType::Character => "Character",
            ElementType::Parenthetical => "Parenthetical",
            ElementType::Dialogue => "Dialogue",
            ElementType::Transition => "Transition",
            ElementType::Shot => "Shot",
            ElementType::PageNumber => "Page Number",
            ElementType::TitlePage => "Title Page",
            ElementType::Unknown => "Unknown",
        }
    }

    /// Whether consecutive lines of this type may be joined into one element.
    ///
    /// Headings, character cues and page numbers are always single-line.
    pub fn merges_across_lines(self) -> bool {
        !matches!(
            self,
            ElementType::SceneHeading | ElementType::Character | ElementType::PageNumber
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified unit of screenplay text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedElement {
    pub element_type: ElementType,
    /// Normalized text
    pub text: String,
    /// Text as it appeared in the source, before normalization
    pub original_text: String,
    /// Physical page (1-based); 0 when the source has no pages
    pub page_number: u32,
    /// Scene number captured from a heading line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_number: Option<String>,
    pub confidence: f32,
    /// Left indent in points; 0.0 when the source has no geometry
    pub left_indent: f32,
    /// Indices of the source lines/paragraphs this element was built from
    #[serde(default)]
    pub lines: Vec<usize>,
}

impl ParsedElement {
    /// Create an element from a single source unit
    pub fn new(element_type: ElementType, text: impl Into<String>, confidence: f32) -> Self {
        let text = text.into();
        Self {
            element_type,
            original_text: text.clone(),
            text,
            page_number: 0,
            scene_number: None,
            confidence,
            left_indent: 0.0,
            lines: Vec::new(),
        }
    }

    /// Set the page number
    pub fn on_page(mut self, page: u32) -> Self {
        self.page_number = page;
        self
    }

    /// Set the left indent
    pub fn at_indent(mut self, indent: f32) -> Self {
        self.left_indent = indent;
        self
    }

    /// Record the source line index
    pub fn from_line(mut self, index: usize) -> Self {
        self.lines.push(index);
        self
    }

    /// Re-type the element with a new confidence
    pub fn retype(&mut self, element_type: ElementType, confidence: f32) {
        self.element_type = element_type;
        self.confidence = confidence;
    }
}

/// One positioned line of text from a PDF page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Physical page (1-based)
    pub page: u32,
    /// Vertical position from the top of the page, in points
    pub y: f32,
    /// Left indent from the page edge, in points
    pub left_indent: f32,
    /// Whether every letter on the line is upper case
    #[serde(default)]
    pub all_caps: bool,
}

impl TextLine {
    /// Create a line, deriving the ALL-CAPS flag from the text
    pub fn new(text: impl Into<String>, page: u32, y: f32, left_indent: f32) -> Self {
        let text = text.into();
        let all_caps = is_all_caps(&text);
        Self {
            text,
            page,
            y,
            left_indent,
            all_caps,
        }
    }
}

/// True when the text has at least one letter and no lower-case letters
pub fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_style_name_variants() {
        assert_eq!(
            ElementType::from_style_name("Scene Heading"),
            Some(ElementType::SceneHeading)
        );
        assert_eq!(
            ElementType::from_style_name("scene-heading"),
            Some(ElementType::SceneHeading)
        );
        assert_eq!(
            ElementType::from_style_name("slugline"),
            Some(ElementType::SceneHeading)
        );
        assert_eq!(
            ElementType::from_style_name("dialog"),
            Some(ElementType::Dialogue)
        );
        assert_eq!(
            ElementType::from_style_name("General"),
            Some(ElementType::Action)
        );
        assert_eq!(ElementType::from_style_name("footer"), None);
    }

    #[test]
    fn test_merges_across_lines() {
        assert!(ElementType::Action.merges_across_lines());
        assert!(ElementType::Dialogue.merges_across_lines());
        assert!(!ElementType::SceneHeading.merges_across_lines());
        assert!(!ElementType::Character.merges_across_lines());
        assert!(!ElementType::PageNumber.merges_across_lines());
    }

    #[test]
    fn test_text_line_all_caps() {
        assert!(TextLine::new("JOHN (V.O.)", 1, 100.0, 266.0).all_caps);
        assert!(!TextLine::new("John walks in.", 1, 100.0, 108.0).all_caps);
        assert!(!TextLine::new("12.", 1, 30.0, 500.0).all_caps);
    }

    #[test]
    fn test_element_builders() {
        let mut el = ParsedElement::new(ElementType::Action, "He runs.", 0.4)
            .on_page(3)
            .at_indent(108.0)
            .from_line(7);
        assert_eq!(el.page_number, 3);
        assert_eq!(el.lines, vec![7]);
        assert_eq!(el.original_text, "He runs.");

        el.retype(ElementType::Dialogue, 0.75);
        assert_eq!(el.element_type, ElementType::Dialogue);
        assert_eq!(el.confidence, 0.75);
    }
}
