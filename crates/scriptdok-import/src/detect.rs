//! Source format detection
//!
//! The format is sniffed from content. The file name is only a hint and is
//! consulted when the content is markup of no recognizable dialect.

use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use serde::Serialize;
use tracing::debug;

use crate::error::{ImportError, Result};

/// How many leading characters are inspected when sniffing markup
const SNIFF_WINDOW: usize = 4096;

/// Detected kind of source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// ZIP container (Celtx, Fade In, zipped exports)
    Archive,
    /// PDF; needs an external line extractor
    Pdf,
    /// Structured script markup (Final Draft, Open Screenplay Format)
    ScriptXml,
    /// HTML export with class-tagged paragraphs
    Html,
    /// Anything else that decodes as text
    PlainText,
}

impl SourceFormat {
    /// Short name for logs and CLI output
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Archive => "archive",
            SourceFormat::Pdf => "pdf",
            SourceFormat::ScriptXml => "script-xml",
            SourceFormat::Html => "html",
            SourceFormat::PlainText => "plain-text",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of sniffing a source
#[derive(Debug, Clone)]
pub struct Detection {
    pub format: SourceFormat,
    /// Decoded text, for text formats
    pub text: Option<String>,
}

/// Detect the format of raw source bytes.
///
/// Binary containers are recognized by their leading signature; everything
/// else is decoded as text and sniffed.
pub fn detect(bytes: &[u8], file_name: &str) -> Result<Detection> {
    if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06") {
        debug!("{}: ZIP signature", file_name);
        return Ok(Detection {
            format: SourceFormat::Archive,
            text: None,
        });
    }

    if bytes.starts_with(b"%PDF-") {
        debug!("{}: PDF signature", file_name);
        return Ok(Detection {
            format: SourceFormat::Pdf,
            text: None,
        });
    }

    let text = decode_text(bytes)?;
    let format = sniff_text(&text, file_name);
    debug!("{}: sniffed as {}", file_name, format);

    Ok(Detection {
        format,
        text: Some(text),
    })
}

/// Decode bytes as text.
///
/// A byte-order mark selects UTF-8 or UTF-16 and must then decode cleanly.
/// Without one the bytes are read as UTF-8, falling back to Windows-1252
/// (the Latin-1 superset that editors write curly quotes in). Content that
/// decodes only as control-character soup is rejected.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    let text = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .ok_or(ImportError::InvalidEncoding)?
            .into_owned(),
        None => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                debug!("Not UTF-8; decoding as {}", WINDOWS_1252.name());
                WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
            }
        },
    };

    if looks_binary(&text) {
        return Err(ImportError::InvalidEncoding);
    }
    Ok(text)
}

/// True when the text holds NULs or is more than 2% C0 controls other than
/// whitespace
fn looks_binary(text: &str) -> bool {
    if text.contains('\0') {
        return true;
    }
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let controls = text
        .chars()
        .filter(|c| c.is_ascii_control() && !matches!(c, '\n' | '\r' | '\t' | '\u{0C}'))
        .count();
    controls * 50 > total
}

/// Sniff decoded text for a markup dialect.
pub fn sniff_text(text: &str, file_name: &str) -> SourceFormat {
    let head: String = text
        .trim_start()
        .chars()
        .take(SNIFF_WINDOW)
        .collect::<String>()
        .to_lowercase();

    let is_html = head.starts_with("<!doctype html") || head.contains("<html");
    if head.starts_with("<?xml") {
        return if is_html {
            SourceFormat::Html
        } else {
            SourceFormat::ScriptXml
        };
    }
    if is_html {
        return SourceFormat::Html;
    }

    if head.contains("<finaldraft")
        || head.contains("<paragraph type=")
        || head.contains("<para>")
        || head.contains("<para ")
        || head.contains("open screenplay format")
    {
        return SourceFormat::ScriptXml;
    }

    if head.contains("<p class=") || head.contains("<div class=") {
        return SourceFormat::Html;
    }

    if head.starts_with('<') {
        return match extension(file_name).as_deref() {
            Some("html" | "htm" | "xhtml") => SourceFormat::Html,
            Some("fdx" | "xml" | "osf" | "fadein") => SourceFormat::ScriptXml,
            _ => SourceFormat::PlainText,
        };
    }

    SourceFormat::PlainText
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
