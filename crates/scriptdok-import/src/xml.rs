//! Structured script XML parsing
//!
//! Reads Final Draft (`<Paragraph Type="...">`) and Open Screenplay Format
//! (`<para><style basestyle="..."/>`) documents in a single pass. The walk
//! is driven by an explicit [`ParseState`]; every scene leaves the machine
//! through one finalize transition.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scriptdok_ast::{ElementType, SceneDraft};
use scriptdok_core::{parse_eighths, STRIKE_CLOSE, STRIKE_OPEN};
use tracing::debug;

use crate::assembler::{OpenScene, SceneAssembler};
use crate::error::{ImportError, Result, XmlSyntaxError};
use crate::strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};

/// Where the walk stands relative to scenes
#[derive(Debug)]
enum ParseState {
    /// Before the first heading; title-page paragraphs are ignored
    Idle,
    /// Inside a scene heading paragraph
    InHeading(OpenScene),
    /// Collecting body paragraphs
    InBody(OpenScene),
}

/// A paragraph whose end tag has not been seen yet
#[derive(Debug, Default)]
struct ParagraphBuilder {
    element_type: Option<ElementType>,
    text: String,
    /// Byte offset of the opening tag
    start: usize,
    /// `Number` attribute on the paragraph itself
    number_attr: Option<String>,
    /// `Number` attribute on a nested properties block
    properties_number: Option<String>,
    /// Text of a nested number element
    number_element: Option<String>,
    length_eighths: Option<u32>,
    page: Option<u32>,
    /// Part of the script body rather than a title page, header or footer
    script: bool,
}

impl ParagraphBuilder {
    fn explicit_number(&mut self) -> Option<String> {
        [
            self.number_attr.take(),
            self.properties_number.take(),
            self.number_element.take(),
        ]
        .into_iter()
        .flatten()
        .map(|n| n.trim().to_string())
        .find(|n| !n.is_empty())
    }
}

/// Scenes recovered from a structured document
#[derive(Debug)]
pub struct XmlParse {
    pub scenes: Vec<SceneDraft>,
    /// Heading paragraphs seen
    pub heading_count: usize,
}

struct XmlWalker<'a> {
    source: &'a str,
    state: ParseState,
    /// Local names of the open elements, outermost first
    elements: Vec<Vec<u8>>,
    /// Open paragraphs; dual dialogue nests them
    paragraphs: Vec<ParagraphBuilder>,
    /// Inside a text run; `true` when the run is struck through
    run: Option<bool>,
    in_number_element: bool,
    assembler: SceneAssembler,
    scenes: Vec<SceneDraft>,
    heading_count: usize,
}

impl<'a> XmlWalker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            state: ParseState::Idle,
            elements: Vec::new(),
            paragraphs: Vec::new(),
            run: None,
            in_number_element: false,
            assembler: SceneAssembler::new(),
            scenes: Vec::new(),
            heading_count: 0,
        }
    }

    /// Whether paragraphs opened here belong to the script body.
    ///
    /// Final Draft keeps the script in the root's `Content` and puts title
    /// pages and headers in sibling blocks; Open Screenplay Format keeps it
    /// in the root's `paragraphs`. Markup under any other root is taken
    /// whole.
    fn in_script_body(&self) -> bool {
        let container: &[u8] = match self.elements.first().map(Vec::as_slice) {
            Some(b"FinalDraft") => b"Content",
            Some(b"document") => b"paragraphs",
            _ => return true,
        };
        self.elements.get(1).map(Vec::as_slice) == Some(container)
    }

    fn start(&mut self, e: &BytesStart, offset: usize, empty: bool) {
        let name = e.local_name();
        match name.as_ref() {
            b"Paragraph" => {
                self.paragraphs.push(ParagraphBuilder {
                    start: offset,
                    number_attr: get_attr(e, "Number"),
                    script: self.in_script_body(),
                    ..Default::default()
                });
                if let Some(kind) = get_attr(e, "Type") {
                    self.set_paragraph_type(&kind);
                }
            }
            b"para" => self.paragraphs.push(ParagraphBuilder {
                start: offset,
                script: self.in_script_body(),
                ..Default::default()
            }),
            // Style definitions outside a paragraph only describe styles
            b"style" if !self.paragraphs.is_empty() => {
                if let Some(kind) = get_attr(e, "basestyle") {
                    self.set_paragraph_type(&kind);
                }
            }
            b"Text" | b"text" if !empty && !self.paragraphs.is_empty() => {
                let struck = is_struck(e);
                if struck {
                    self.push_text(STRIKE_OPEN);
                }
                self.run = Some(struck);
            }
            b"SceneProperties" => {
                if let Some(p) = self.paragraphs.last_mut() {
                    p.properties_number = get_attr(e, "Number");
                    p.length_eighths = get_attr(e, "Length").map(|l| parse_eighths(&l));
                    p.page = get_attr(e, "Page").and_then(|p| p.trim().parse().ok());
                }
            }
            b"SceneNumber" | b"Number" if !empty && !self.paragraphs.is_empty() => {
                self.in_number_element = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8], offset: usize) {
        match name {
            b"Text" | b"text" => {
                if let Some(true) = self.run.take() {
                    self.push_text(STRIKE_CLOSE);
                }
            }
            b"SceneNumber" | b"Number" => self.in_number_element = false,
            b"Paragraph" | b"para" => {
                if let Some(paragraph) = self.paragraphs.pop() {
                    self.close_paragraph(paragraph, offset);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let Some(paragraph) = self.paragraphs.last_mut() else {
            return;
        };
        if self.in_number_element {
            paragraph
                .number_element
                .get_or_insert_with(String::new)
                .push_str(text.trim());
        } else if self.run.is_some() {
            paragraph.text.push_str(text);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.text.push_str(text);
        }
    }

    fn set_paragraph_type(&mut self, name: &str) {
        let element_type = ElementType::from_style_name(name).unwrap_or(ElementType::Action);
        let Some(paragraph) = self.paragraphs.last_mut() else {
            return;
        };
        paragraph.element_type = Some(element_type);
        if paragraph.script && element_type == ElementType::SceneHeading {
            self.enter_heading();
        }
    }

    /// Finalize any open scene and start a new one
    fn enter_heading(&mut self) {
        self.flush_scene();
        self.heading_count += 1;
        self.state = ParseState::InHeading(OpenScene::new(String::new()));
    }

    fn close_paragraph(&mut self, mut paragraph: ParagraphBuilder, end: usize) {
        if !paragraph.script {
            return;
        }
        match paragraph.element_type {
            Some(ElementType::SceneHeading) => {
                let state = std::mem::replace(&mut self.state, ParseState::Idle);
                self.state = match state {
                    ParseState::InHeading(mut scene) => {
                        scene.heading = collapse_whitespace(&paragraph.text);
                        scene.explicit_number = paragraph.explicit_number();
                        scene.length_eighths = paragraph.length_eighths;
                        scene.page_number = paragraph.page;
                        scene.raw_source = self.source.get(paragraph.start..end).map(str::to_string);
                        ParseState::InBody(scene)
                    }
                    other => other,
                };
            }
            element_type => {
                if let ParseState::InBody(ref mut scene) = self.state {
                    let element_type = element_type.unwrap_or(ElementType::Action);
                    scene.push_body(element_type, &collapse_whitespace(&paragraph.text));
                }
            }
        }
    }

    fn flush_scene(&mut self) {
        match std::mem::replace(&mut self.state, ParseState::Idle) {
            ParseState::InHeading(scene) | ParseState::InBody(scene) => {
                let draft = self.assembler.finalize(scene);
                self.scenes.push(draft);
            }
            ParseState::Idle => {}
        }
    }

    fn finish(mut self) -> XmlParse {
        self.flush_scene();
        XmlParse {
            scenes: self.scenes,
            heading_count: self.heading_count,
        }
    }
}

/// Parse a structured script document.
///
/// Malformed markup (mismatched or unclosed tags, bad escapes) fails with
/// [`ImportError::XmlParseFailed`].
pub fn parse_script_xml(source: &str) -> Result<XmlParse> {
    let mut reader = Reader::from_reader(source.as_bytes());
    // Keep whitespace inside text runs
    reader.config_mut().trim_text(false);

    let mut walker = XmlWalker::new(source);
    let mut buf = Vec::new();

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                walker.start(e, offset, false);
                walker.elements.push(e.local_name().as_ref().to_vec());
            }
            Ok(Event::Empty(ref e)) => {
                walker.start(e, offset, true);
                let end = reader.buffer_position() as usize;
                walker.end(e.local_name().as_ref(), end);
            }
            Ok(Event::End(ref e)) => {
                walker.elements.pop();
                let end = reader.buffer_position() as usize;
                walker.end(e.local_name().as_ref(), end);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(|err| {
                    ImportError::XmlParseFailed(XmlSyntaxError::at_offset(
                        err.to_string(),
                        source,
                        offset,
                    ))
                })?;
                walker.text(&text);
            }
            Ok(Event::CData(ref e)) => {
                walker.text(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ImportError::XmlParseFailed(XmlSyntaxError::at_offset(
                    err.to_string(),
                    source,
                    reader.error_position() as usize,
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !walker.elements.is_empty() || !walker.paragraphs.is_empty() {
        return Err(ImportError::XmlParseFailed(XmlSyntaxError::at_offset(
            "unexpected end of document inside an open element",
            source,
            source.len(),
        )));
    }

    let parse = walker.finish();
    debug!(
        "Structured parse: {} headings, {} scenes",
        parse.heading_count,
        parse.scenes.len()
    );
    Ok(parse)
}

/// Parser for structured script markup
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlSceneParser;

impl SceneParser for XmlSceneParser {
    fn strategy(&self) -> Strategy {
        Strategy::StructuredXml
    }

    fn parse(&self, input: &ParseInput<'_>) -> Result<ParseOutcome> {
        let text = input.text();
        let parse = parse_script_xml(&text)?;
        Ok(ParseOutcome::new(Strategy::StructuredXml, parse.scenes))
    }
}

/// Get an attribute value by name, ignoring case
fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Whether a text run is struck through: a Final Draft `Style` containing
/// "Strikeout", or an OSF `strikeout`/`strikethrough` flag
fn is_struck(e: &BytesStart) -> bool {
    let styled = get_attr(e, "Style")
        .map(|s| s.to_ascii_lowercase().contains("strike"))
        .unwrap_or(false);
    let flagged = ["strikeout", "strikethrough"].iter().any(|flag| {
        get_attr(e, flag)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    });
    styled || flagged
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fdx_document, fdx_paragraph};
    use scriptdok_ast::LocationType;
    use scriptdok_core::{has_struck_text, visible_text};

    #[test]
    fn test_kitchen_and_street() {
        let doc = fdx_document(&[
            fdx_paragraph("Scene Heading", "INT. KITCHEN - DAY"),
            fdx_paragraph("Action", "John enters."),
            fdx_paragraph("Scene Heading", "EXT. STREET - NIGHT"),
        ]
        .join("\n"));

        let parse = parse_script_xml(&doc).unwrap();
        assert_eq!(parse.heading_count, 2);
        assert_eq!(parse.scenes.len(), 2);

        let kitchen = &parse.scenes[0];
        assert_eq!(kitchen.ordinal, 1);
        assert_eq!(kitchen.number, "1");
        assert_eq!(kitchen.heading, "INT. KITCHEN - DAY");
        assert_eq!(kitchen.location_type, Some(LocationType::Int));
        assert_eq!(kitchen.location, "KITCHEN");
        assert_eq!(kitchen.time_of_day, "DAY");
        assert_eq!(kitchen.script_text.as_deref(), Some("John enters."));
        assert_eq!(kitchen.confidence, 1.0);

        let street = &parse.scenes[1];
        assert_eq!(street.ordinal, 2);
        assert_eq!(street.location_type, Some(LocationType::Ext));
        assert_eq!(street.time_of_day, "NIGHT");
        assert_eq!(street.script_text, None);
    }

    #[test]
    fn test_title_page_paragraphs_are_ignored() {
        let doc = fdx_document(&[
            fdx_paragraph("Action", "FADE IN:"),
            fdx_paragraph("Scene Heading", "INT. KITCHEN - DAY"),
        ]
        .join("\n"));
        let parse = parse_script_xml(&doc).unwrap();
        assert_eq!(parse.scenes.len(), 1);
        assert_eq!(parse.scenes[0].script_text, None);
    }

    #[test]
    fn test_body_formatting() {
        let doc = fdx_document(&[
            fdx_paragraph("Scene Heading", "INT. KITCHEN - DAY"),
            fdx_paragraph("Character", "John"),
            fdx_paragraph("Parenthetical", "quietly"),
            fdx_paragraph("Dialogue", "Morning."),
            fdx_paragraph("Transition", "cut to:"),
            fdx_paragraph("Cast List", "Unusual paragraph type."),
        ]
        .join("\n"));
        let parse = parse_script_xml(&doc).unwrap();
        assert_eq!(
            parse.scenes[0].script_text.as_deref(),
            Some("JOHN\n(quietly)\nMorning.\nCUT TO:\nUnusual paragraph type.")
        );
    }

    #[test]
    fn test_heading_across_runs_with_strikeout() {
        let doc = fdx_document(
            r#"    <Paragraph Type="Scene Heading">
      <Text>INT. </Text><Text Style="Bold+Strikeout">OLD </Text><Text>KITCHEN - DAY</Text>
    </Paragraph>"#,
        );
        let parse = parse_script_xml(&doc).unwrap();
        let scene = &parse.scenes[0];
        assert!(has_struck_text(&scene.heading));
        assert_eq!(visible_text(&scene.heading), "INT. KITCHEN - DAY");
        assert_eq!(scene.location, "KITCHEN");
    }

    #[test]
    fn test_scene_number_precedence() {
        let doc = fdx_document(
            r#"    <Paragraph Type="Scene Heading" Number="5">
      <SceneProperties Number="9" Length="1 3/8" Page="4"/>
      <Text>12 INT. HALL - DAY</Text>
    </Paragraph>
    <Paragraph Type="Scene Heading">
      <SceneProperties Number="9A"/>
      <Text>12 INT. HALL - NIGHT</Text>
    </Paragraph>
    <Paragraph Type="Scene Heading">
      <SceneNumber>14</SceneNumber>
      <Text>12 INT. HALL - DAWN</Text>
    </Paragraph>
    <Paragraph Type="Scene Heading">
      <Text>12 INT. HALL - DUSK</Text>
    </Paragraph>
    <Paragraph Type="Scene Heading">
      <Text>INT. HALL - LATER</Text>
    </Paragraph>"#,
        );
        let parse = parse_script_xml(&doc).unwrap();
        let numbers: Vec<&str> = parse.scenes.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["5", "9A", "14", "12", "5"]);

        let first = &parse.scenes[0];
        assert_eq!(first.page_length_eighths, 11);
        assert_eq!(first.page_number, Some(4));
        assert_eq!(first.location, "HALL");
    }

    #[test]
    fn test_raw_source_is_heading_markup() {
        let heading = r#"<Paragraph Type="Scene Heading"><Text>INT. KITCHEN - DAY</Text></Paragraph>"#;
        let doc = fdx_document(heading);
        let parse = parse_script_xml(&doc).unwrap();
        assert_eq!(parse.scenes[0].raw_source.as_deref(), Some(heading));
    }

    #[test]
    fn test_open_screenplay_format() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="Open Screenplay Format document" version="40">
  <paragraphs>
    <para><style basestyle="Scene Heading"/><text>EXT. </text><text strikeout="1">BEACH</text><text> PIER - DAWN</text></para>
    <para><style basestyle="Action"/><text>Gulls wheel overhead.</text></para>
    <para><style basestyle="Character"/><text>mara</text></para>
    <para><style basestyle="Dialogue"/><text>There it is.</text></para>
  </paragraphs>
</document>"#;
        let parse = parse_script_xml(doc).unwrap();
        assert_eq!(parse.scenes.len(), 1);
        let scene = &parse.scenes[0];
        assert_eq!(scene.location_type, Some(LocationType::Ext));
        assert_eq!(scene.location, "PIER");
        assert_eq!(scene.time_of_day, "DAWN");
        assert_eq!(
            scene.script_text.as_deref(),
            Some("Gulls wheel overhead.\nMARA\nThere it is.")
        );
    }

    #[test]
    fn test_title_page_and_header_paragraphs_stay_out_of_scenes() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<FinalDraft DocumentType="Script" Template="No" Version="5">
  <Content>
    <Paragraph Type="Scene Heading"><Text>INT. KITCHEN - DAY</Text></Paragraph>
    <Paragraph Type="Action"><Text>John enters.</Text></Paragraph>
  </Content>
  <TitlePage>
    <Content>
      <Paragraph Type="Action"><Text>THE HEIST</Text></Paragraph>
      <Paragraph Type="Action"><Text>Written by Jane Doe</Text></Paragraph>
    </Content>
  </TitlePage>
  <HeaderAndFooter FooterFirstPage="Yes" HeaderFirstPage="No">
    <Header>
      <Paragraph Type="Scene Heading"><Text>EXT. PAGE HEADER - DAY</Text></Paragraph>
    </Header>
    <Footer>
      <Paragraph Type="Action"><Text>Page footer</Text></Paragraph>
    </Footer>
  </HeaderAndFooter>
</FinalDraft>"#;
        let parse = parse_script_xml(doc).unwrap();
        assert_eq!(parse.heading_count, 1);
        assert_eq!(parse.scenes.len(), 1);
        assert_eq!(parse.scenes[0].heading, "INT. KITCHEN - DAY");
        assert_eq!(parse.scenes[0].script_text.as_deref(), Some("John enters."));
    }

    #[test]
    fn test_style_definitions_do_not_open_scenes() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<document type="Open Screenplay Format document" version="40">
  <styles>
    <style id="Scene Heading" basestyle="Scene Heading" allCaps="1"/>
    <style id="Action" basestyle="Action"/>
  </styles>
  <paragraphs>
    <para><style basestyle="Scene Heading"/><text>INT. KITCHEN - DAY</text></para>
    <para><style basestyle="Action"/><text>Kettle boils.</text></para>
  </paragraphs>
</document>"#;
        let parse = parse_script_xml(doc).unwrap();
        assert_eq!(parse.heading_count, 1);
        assert_eq!(parse.scenes.len(), 1);
        assert_eq!(parse.scenes[0].ordinal, 1);
        assert_eq!(parse.scenes[0].heading, "INT. KITCHEN - DAY");
        assert_eq!(parse.scenes[0].script_text.as_deref(), Some("Kettle boils."));
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = fdx_document(&[
            fdx_paragraph("Scene Heading", "INT. JOHN &amp; MARY&apos;S FLAT - DAY"),
            fdx_paragraph("Action", "A &lt;beep&gt;."),
        ]
        .join("\n"));
        let parse = parse_script_xml(&doc).unwrap();
        assert_eq!(parse.scenes[0].location, "JOHN & MARY'S FLAT");
        assert_eq!(parse.scenes[0].script_text.as_deref(), Some("A <beep>."));
    }

    #[test]
    fn test_malformed_markup_fails() {
        let doc = r#"<FinalDraft><Content><Paragraph Type="Scene Heading"><Text>INT. A - DAY</Content></FinalDraft>"#;
        assert!(matches!(
            parse_script_xml(doc),
            Err(ImportError::XmlParseFailed(_))
        ));

        let multiline = "<FinalDraft>\n<Content>\n<Paragraph Type=\"Action\">\n<Text>Hi</Paragraph>\n</Content>\n</FinalDraft>";
        match parse_script_xml(multiline) {
            Err(ImportError::XmlParseFailed(err)) => assert_eq!(err.line, Some(4)),
            other => panic!("expected a syntax error, got {:?}", other),
        }

        let truncated = r#"<FinalDraft><Content><Paragraph Type="Scene Heading"><Text>INT. A - DAY"#;
        assert!(matches!(
            parse_script_xml(truncated),
            Err(ImportError::XmlParseFailed(_))
        ));
    }

    #[test]
    fn test_n_headings_give_dense_ordinals() {
        let paragraphs: Vec<String> = (0..25)
            .map(|i| fdx_paragraph("Scene Heading", &format!("INT. ROOM {} - DAY", i)))
            .collect();
        let parse = parse_script_xml(&fdx_document(&paragraphs.join("\n"))).unwrap();
        let ordinals: Vec<u32> = parse.scenes.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_parser_outcome() {
        let doc = fdx_document(&fdx_paragraph("Scene Heading", "INT. A - DAY"));
        let outcome = XmlSceneParser.parse(&ParseInput::Text(&doc)).unwrap();
        assert_eq!(outcome.strategy, Strategy::StructuredXml);
        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.warnings.is_empty());
    }
}
