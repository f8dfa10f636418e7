//! Shared test utilities for scriptdok-import
//!
//! Fixtures for the import paths: in-memory archives, Final Draft documents
//! and positioned PDF lines laid out on the standard screenplay columns.

use std::io::{Cursor, Write};

use scriptdok_ast::TextLine;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

/// Build a ZIP archive in memory from `(path, contents)` pairs
pub fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (path, contents) in files {
        zip.start_file(*path, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

/// Wrap paragraphs in a Final Draft document
pub fn fdx_document(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<FinalDraft DocumentType="Script" Template="No" Version="5">
  <Content>
{}
  </Content>
</FinalDraft>"#,
        paragraphs
    )
}

/// A Final Draft paragraph with a single text run
pub fn fdx_paragraph(kind: &str, text: &str) -> String {
    format!(
        r#"    <Paragraph Type="{}"><Text>{}</Text></Paragraph>"#,
        kind, text
    )
}

/// Standard screenplay column positions, in points
pub mod columns {
    pub const ACTION: f32 = 108.0;
    pub const DIALOGUE: f32 = 180.0;
    pub const PARENTHETICAL: f32 = 223.0;
    pub const CHARACTER: f32 = 266.0;
    pub const TRANSITION: f32 = 396.0;
}

/// Lays out PDF lines top to bottom, 12pt apart, starting below the margin
pub struct PageWriter {
    page: u32,
    y: f32,
    pub lines: Vec<TextLine>,
}

impl PageWriter {
    pub fn new() -> Self {
        Self {
            page: 1,
            y: 72.0,
            lines: Vec::new(),
        }
    }

    /// Add a line at the given indent
    pub fn line(&mut self, text: &str, indent: f32) -> &mut Self {
        self.lines
            .push(TextLine::new(text, self.page, self.y, indent));
        self.y += 12.0;
        self
    }

    /// Leave a blank line
    pub fn gap(&mut self) -> &mut Self {
        self.y += 12.0;
        self
    }

    /// Start the next page, printing its number in the top margin
    pub fn next_page(&mut self) -> &mut Self {
        self.page += 1;
        self.lines.push(TextLine::new(
            format!("{}.", self.page),
            self.page,
            36.0,
            500.0,
        ));
        self.y = 72.0;
        self
    }

    pub fn finish(&mut self) -> Vec<TextLine> {
        std::mem::take(&mut self.lines)
    }
}
