//! Markup to text
//!
//! HTML goes through an HTML5 parser, so entities, implied end tags and
//! raw-text elements read the way a browser reads them. Script markup is
//! read with a lenient XML reader instead: its `<style/>` and `<title>`
//! elements would be raw text under HTML rules.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::detect::{sniff_text, SourceFormat};

/// Elements whose end starts a new line of text
const LINE_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "paragraph", "para", "br",
];

/// Elements whose content is never script text
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template"];

/// Parse an HTML document or fragment into a DOM
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Local name of an element node
pub fn element_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Value of an element's attribute
pub fn attribute(node: &Handle, attr: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Whether an element's content is skipped when reading text
pub fn is_skipped(name: &str) -> bool {
    SKIPPED_ELEMENTS.contains(&name)
}

/// Reduce markup to text with one line per block.
///
/// Block ends and `<br>` become line breaks, other tags are dropped and
/// entities decoded.
pub fn markup_to_text(markup: &str) -> String {
    match sniff_text(markup, "") {
        SourceFormat::ScriptXml => xml_text(markup),
        _ => html_text(markup),
    }
}

fn html_text(html: &str) -> String {
    let dom = parse_html(html);
    let mut text = String::new();
    push_node_text(&dom.document, &mut text);
    text
}

fn push_node_text(node: &Handle, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } => {
            let name = element_name(node).unwrap_or_default();
            if is_skipped(name) {
                return;
            }
            for child in node.children.borrow().iter() {
                push_node_text(child, out);
            }
            if LINE_ELEMENTS.contains(&name) {
                out.push('\n');
            }
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                push_node_text(child, out);
            }
        }
        _ => {}
    }
}

/// Text of XML that may be malformed: end tags are not matched and reading
/// stops at the first syntax error, keeping what came before it
fn xml_text(markup: &str) -> String {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => match e.unescape() {
                Ok(t) => text.push_str(&t),
                Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
            },
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(e)) => {
                if is_line_element(e.local_name().as_ref()) {
                    text.push('\n');
                }
            }
            Ok(Event::Empty(e)) => {
                if is_line_element(e.local_name().as_ref()) {
                    text.push('\n');
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                debug!("Markup text stops at byte {}: {}", reader.error_position(), err);
                break;
            }
            _ => {}
        }
    }

    text
}

fn is_line_element(name: &[u8]) -> bool {
    LINE_ELEMENTS
        .iter()
        .any(|line| line.as_bytes().eq_ignore_ascii_case(name))
}
