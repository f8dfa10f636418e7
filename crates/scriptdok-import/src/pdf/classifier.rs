//! Line classification by indent and content
//!
//! Each positioned line is typed on its own first, then the element stream
//! is refined: title-page marking, paragraph merging, context correction.
//! Every non-blank line ends up in some element.

use std::sync::OnceLock;

use regex::Regex;
use scriptdok_ast::{is_all_caps, ElementType, ParsedElement, TextLine};
use scriptdok_core::{is_scene_heading, split_scene_number};

use super::layout::{Column, ColumnLayout};

/// Confidence scores for each rule
pub mod confidence {
    pub const PAGE_NUMBER: f32 = 0.9;
    pub const SCENE_HEADING: f32 = 0.95;
    pub const TRANSITION_PHRASE: f32 = 0.95;
    pub const TRANSITION_TO: f32 = 0.85;
    pub const TRANSITION_COLON: f32 = 0.7;
    pub const PARENTHETICAL: f32 = 0.8;
    pub const PARENTHETICAL_AT_COLUMN: f32 = 0.95;
    pub const CHARACTER_AT_COLUMN: f32 = 0.9;
    pub const CHARACTER_AT_COLUMN_WITH_MARKER: f32 = 0.95;
    pub const CHARACTER_MARKER: f32 = 0.85;
    pub const DIALOGUE: f32 = 0.8;
    pub const SHOT: f32 = 0.75;
    pub const ACTION: f32 = 0.4;
    pub const CORRECTED_DIALOGUE: f32 = 0.75;
    pub const TITLE_PAGE: f32 = 0.6;
}

/// Longest line still read as a character cue
const MAX_CHARACTER_LEN: usize = 50;

const TRANSITION_PHRASES: &[&str] = &[
    "CUT TO:",
    "SMASH CUT TO:",
    "MATCH CUT TO:",
    "JUMP CUT TO:",
    "HARD CUT TO:",
    "CUT TO BLACK.",
    "DISSOLVE TO:",
    "FADE IN:",
    "FADE OUT.",
    "FADE OUT:",
    "FADE TO:",
    "FADE TO BLACK.",
    "WIPE TO:",
    "INTERCUT WITH:",
    "BACK TO:",
];

const SHOT_PREFIXES: &[&str] = &[
    "ANGLE ON",
    "CLOSE ON",
    "CLOSE UP",
    "CLOSE-UP",
    "EXTREME CLOSE",
    "ECU",
    "WIDE ON",
    "WIDE SHOT",
    "POV",
    "INSERT",
    "ESTABLISHING",
    "TRACKING",
    "AERIAL",
    "BACK TO SCENE",
];

fn page_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:page\s+)?\(?\d{1,4}[A-Z]{0,2}\)?\.?$").unwrap())
}

fn character_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\((?:V\.\s?O\.?|O\.\s?S\.?|O\.\s?C\.?|CONT['\u{2019}]?D|CONT\.)\)").unwrap()
    })
}

/// An element with the vertical position of its last line
struct Classified {
    element: ParsedElement,
    last_y: f32,
}

/// Classifies positioned lines against a [`ColumnLayout`]
#[derive(Debug, Clone, Default)]
pub struct LayoutClassifier {
    layout: ColumnLayout,
}

impl LayoutClassifier {
    pub fn new(layout: ColumnLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Classify and refine a page-ordered line stream
    pub fn classify(&self, lines: &[TextLine]) -> Vec<ParsedElement> {
        let mut items: Vec<Classified> = lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                self.classify_line(index, line).map(|element| Classified {
                    element,
                    last_y: line.y,
                })
            })
            .collect();

        mark_title_page(&mut items);
        let mut elements = self.merge(items);
        self.correct(&mut elements);
        elements
    }

    /// Type one line in isolation. Blank lines yield nothing.
    pub fn classify_line(&self, index: usize, line: &TextLine) -> Option<ParsedElement> {
        let text = line.text.trim();
        if text.is_empty() {
            return None;
        }

        let layout = &self.layout;
        let indent = line.left_indent;
        let all_caps = line.all_caps || is_all_caps(text);
        let upper = text.to_uppercase();

        let element = |element_type, confidence| {
            let mut element = ParsedElement::new(element_type, text, confidence)
                .on_page(line.page)
                .at_indent(indent)
                .from_line(index);
            element.original_text = line.text.clone();
            element
        };

        if layout.in_margin(line.y) && page_number_re().is_match(text) {
            return Some(element(ElementType::PageNumber, confidence::PAGE_NUMBER));
        }

        if is_scene_heading(text) {
            let (number, rest) = split_scene_number(text);
            let heading = match number.as_deref() {
                Some(n) => strip_trailing_number(rest, n),
                None => rest.trim(),
            };
            let mut heading_element = element(ElementType::SceneHeading, confidence::SCENE_HEADING);
            heading_element.text = heading.to_string();
            heading_element.scene_number = number;
            return Some(heading_element);
        }

        if TRANSITION_PHRASES.contains(&upper.as_str()) {
            return Some(element(ElementType::Transition, confidence::TRANSITION_PHRASE));
        }
        if all_caps && text.ends_with("TO:") {
            return Some(element(ElementType::Transition, confidence::TRANSITION_TO));
        }
        if all_caps && text.ends_with(':') {
            return Some(element(ElementType::Transition, confidence::TRANSITION_COLON));
        }

        if text.starts_with('(') && text.ends_with(')') {
            let confidence = if layout.is_at(indent, Column::Parenthetical) {
                confidence::PARENTHETICAL_AT_COLUMN
            } else {
                confidence::PARENTHETICAL
            };
            return Some(element(ElementType::Parenthetical, confidence));
        }

        if all_caps && text.chars().count() < MAX_CHARACTER_LEN {
            let at_column = layout.is_at(indent, Column::Character);
            let marked = character_marker_re().is_match(text);
            let confidence = match (at_column, marked) {
                (true, true) => Some(confidence::CHARACTER_AT_COLUMN_WITH_MARKER),
                (true, false) => Some(confidence::CHARACTER_AT_COLUMN),
                (false, true) => Some(confidence::CHARACTER_MARKER),
                (false, false) => None,
            };
            if let Some(confidence) = confidence {
                return Some(element(ElementType::Character, confidence));
            }
        }

        if layout.is_at(indent, Column::Dialogue) && !all_caps {
            return Some(element(ElementType::Dialogue, confidence::DIALOGUE));
        }

        if all_caps && SHOT_PREFIXES.iter().any(|prefix| starts_with_word(&upper, prefix)) {
            return Some(element(ElementType::Shot, confidence::SHOT));
        }

        Some(element(ElementType::Action, confidence::ACTION))
    }

    /// Join consecutive same-type lines of one paragraph
    fn merge(&self, items: Vec<Classified>) -> Vec<ParsedElement> {
        let mut merged: Vec<Classified> = Vec::with_capacity(items.len());

        for item in items {
            if let Some(prev) = merged.last_mut() {
                let element_type = item.element.element_type;
                let gap = item.last_y - prev.last_y;
                if prev.element.element_type == element_type
                    && element_type.merges_across_lines()
                    && prev.element.page_number == item.element.page_number
                    && gap > 0.0
                    && gap <= self.layout.max_line_gap
                {
                    let prev_el = &mut prev.element;
                    prev_el.text.push(' ');
                    prev_el.text.push_str(&item.element.text);
                    prev_el.original_text.push('\n');
                    prev_el.original_text.push_str(&item.element.original_text);
                    prev_el.confidence = prev_el.confidence.min(item.element.confidence);
                    prev_el.lines.extend(item.element.lines);
                    prev.last_y = item.last_y;
                    continue;
                }
            }
            merged.push(item);
        }

        merged.into_iter().map(|c| c.element).collect()
    }

    /// Fix types that only make sense in context: action under a character
    /// cue at the dialogue column, and a second parenthetical in a row
    fn correct(&self, elements: &mut [ParsedElement]) {
        for i in 1..elements.len() {
            let prev_type = elements[i - 1].element_type;
            let current = &mut elements[i];
            match (prev_type, current.element_type) {
                (ElementType::Character, ElementType::Action)
                    if self.layout.is_at(current.left_indent, Column::Dialogue) =>
                {
                    current.retype(ElementType::Dialogue, confidence::CORRECTED_DIALOGUE);
                }
                (ElementType::Parenthetical, ElementType::Parenthetical) => {
                    current.retype(ElementType::Dialogue, confidence::CORRECTED_DIALOGUE);
                }
                _ => {}
            }
        }
    }
}

/// Re-type page-1 material as title page when the script proper starts later
fn mark_title_page(items: &mut [Classified]) {
    let first_heading_page = items
        .iter()
        .find(|c| c.element.element_type == ElementType::SceneHeading)
        .map(|c| c.element.page_number);

    if let Some(page) = first_heading_page {
        if page > 1 {
            for item in items.iter_mut().filter(|c| c.element.page_number == 1) {
                item.element
                    .retype(ElementType::TitlePage, confidence::TITLE_PAGE);
            }
        }
    }
}

/// Drop a scene number repeated at the end of a heading ("12 INT. X - DAY 12")
fn strip_trailing_number<'a>(rest: &'a str, number: &str) -> &'a str {
    let trimmed = rest.trim();
    match trimmed.strip_suffix(number) {
        Some(head) if head.ends_with(char::is_whitespace) => head.trim_end(),
        _ => trimmed,
    }
}

fn starts_with_word(text: &str, prefix: &str) -> bool {
    text.strip_prefix(prefix)
        .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
        .unwrap_or(false)
}
