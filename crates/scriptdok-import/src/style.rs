//! Class-tagged HTML parsing
//!
//! HTML exports mark each block with a class naming its element type
//! (`<p class="sceneheading">`). Blocks are classified through the shared
//! style-name table and assembled into scenes. A document without a single
//! recognized class goes to the pattern scan.

use markup5ever_rcdom::{Handle, NodeData};
use scriptdok_ast::{ElementType, ParsedElement};
use scriptdok_core::{Diagnostic, STRIKE_CLOSE, STRIKE_OPEN};
use tracing::{debug, warn};

use crate::assembler::SceneAssembler;
use crate::error::Result;
use crate::fallback::scan_headings;
use crate::markup::{attribute, element_name, is_skipped, markup_to_text, parse_html};
use crate::strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};

/// Confidence of a block whose class names an element type
pub const CLASS_MATCH_CONFIDENCE: f32 = 0.9;
/// Confidence of a block read as action for lack of a known class
pub const UNMATCHED_CLASS_CONFIDENCE: f32 = 0.5;

/// A text block and the class it carried
#[derive(Debug, Clone, PartialEq)]
pub struct StyledBlock {
    pub class: Option<String>,
    pub text: String,
}

/// Split HTML into blocks.
///
/// Each `p`, `div` or heading element starts a block, and so does the end
/// of one: text a container holds between its child blocks is a block of
/// its own, carrying the container's class.
pub fn extract_blocks(html: &str) -> Vec<StyledBlock> {
    let dom = parse_html(html);
    let mut collector = BlockCollector::default();
    collector.walk(&dom.document);
    collector.flush();
    collector.blocks
}

fn is_block(name: &str) -> bool {
    matches!(name, "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<StyledBlock>,
    /// Classes of the open blocks, innermost last
    classes: Vec<Option<String>>,
    text: String,
}

impl BlockCollector {
    fn walk(&mut self, node: &Handle) {
        match node.data {
            NodeData::Text { ref contents } => self.text.push_str(&contents.borrow()),
            NodeData::Element { .. } => {
                let name = element_name(node).unwrap_or_default();
                if is_skipped(name) {
                    return;
                }
                if name == "br" {
                    self.text.push('\n');
                } else if is_block(name) {
                    self.flush();
                    self.classes.push(attribute(node, "class"));
                    self.walk_children(node);
                    self.flush();
                    self.classes.pop();
                } else if matches!(name, "s" | "del" | "strike") {
                    self.text.push_str(STRIKE_OPEN);
                    self.walk_children(node);
                    self.text.push_str(STRIKE_CLOSE);
                } else {
                    self.walk_children(node);
                }
            }
            NodeData::Document => self.walk_children(node),
            _ => {}
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.walk(child);
        }
    }

    /// Close the pending text as a block of the innermost open class
    fn flush(&mut self) {
        let text = normalize_lines(&std::mem::take(&mut self.text));
        if text.is_empty() {
            return;
        }
        let class = self.classes.last().cloned().flatten();
        self.blocks.push(StyledBlock { class, text });
    }
}

/// Collapse whitespace within lines and drop blank ones
fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Element type named by a class attribute; the first recognized class wins
pub fn class_element_type(class: &str) -> Option<ElementType> {
    class
        .split_whitespace()
        .find_map(ElementType::from_style_name)
}

/// Classify blocks into elements. Returns the elements and how many blocks
/// had a recognized class.
pub fn classify_blocks(blocks: &[StyledBlock]) -> (Vec<ParsedElement>, usize) {
    let mut matched = 0;
    let elements = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let known = block.class.as_deref().and_then(class_element_type);
            let element = match known {
                Some(element_type) => {
                    matched += 1;
                    ParsedElement::new(element_type, block.text.clone(), CLASS_MATCH_CONFIDENCE)
                }
                None => ParsedElement::new(
                    ElementType::Action,
                    block.text.clone(),
                    UNMATCHED_CLASS_CONFIDENCE,
                ),
            };
            element.from_line(index)
        })
        .collect();
    (elements, matched)
}

/// The class-tagged HTML strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleParser;

impl SceneParser for StyleParser {
    fn strategy(&self) -> Strategy {
        Strategy::StyleClasses
    }

    fn parse(&self, input: &ParseInput<'_>) -> Result<ParseOutcome> {
        let html = input.text();
        let blocks = extract_blocks(&html);
        let (elements, matched) = classify_blocks(&blocks);
        debug!("{} blocks, {} with a known class", blocks.len(), matched);

        if matched == 0 {
            warn!("No class-tagged blocks; scanning text for headings");
            let scenes = scan_headings(&markup_to_text(&html));
            return Ok(ParseOutcome::new(Strategy::PatternScan, scenes).with_warning(
                Diagnostic::warning("no class-tagged blocks found; headings recovered by pattern scan")
                    .with_code("W001")
                    .with_help("export with paragraph styles as classes to keep scene bodies"),
            ));
        }

        let scenes = SceneAssembler::new().assemble(&elements);
        Ok(ParseOutcome::new(Strategy::StyleClasses, scenes))
    }
}
