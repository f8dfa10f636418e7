//! Integration tests for the scriptdok CLI
//!
//! These drive the command functions against files in a temporary
//! directory, the way the binary does.

use std::fs;
use std::io::{Cursor, Write};

use scriptdok_ast::RevisionColor;
use scriptdok_cli::{
    detect_command, import_command, revisions_command, ImportOptions, OutputFormat, Settings,
};
use scriptdok_import::{JsonFileStore, SceneStore, SourceFormat, Strategy};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const PILOT_FDX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<FinalDraft DocumentType="Script" Version="5">
  <Content>
    <Paragraph Type="Scene Heading" Number="1"><Text>INT. KITCHEN - DAY</Text></Paragraph>
    <Paragraph Type="Action"><Text>John enters.</Text></Paragraph>
    <Paragraph Type="Scene Heading" Number="2"><Text>EXT. STREET - NIGHT</Text></Paragraph>
  </Content>
</FinalDraft>
"#;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_import_prints_and_returns_scenes() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.fdx", PILOT_FDX.as_bytes());

    let outcome = import_command(&ImportOptions::new(&input), &Settings::default()).unwrap();
    assert_eq!(outcome.format, SourceFormat::ScriptXml);
    assert_eq!(outcome.scenes.len(), 2);
    assert!(outcome.revision.is_none());
}

#[test]
fn test_import_into_store_rotates_colors() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.fdx", PILOT_FDX.as_bytes());
    let store_path = dir.path().join("project.json");
    let settings = Settings::default();

    let options = ImportOptions::new(&input)
        .with_store(&store_path)
        .with_format(OutputFormat::Json);
    import_command(&options, &settings).unwrap();
    import_command(&options, &settings).unwrap();

    let revisions = JsonFileStore::new(&store_path).revisions().unwrap();
    let colors: Vec<RevisionColor> = revisions.iter().map(|r| r.color).collect();
    assert_eq!(colors, vec![RevisionColor::White, RevisionColor::Blue]);
    assert_eq!(revisions[1].revision_name, "Blue Revision");
    assert_eq!(revisions[1].imported_by, "scriptdok");

    revisions_command(&store_path, OutputFormat::Text).unwrap();
    revisions_command(&store_path, OutputFormat::Json).unwrap();
}

#[test]
fn test_import_with_explicit_color_and_settings() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.fdx", PILOT_FDX.as_bytes());
    let settings = Settings::from_toml_str(
        "[import]\nimported_by = \"editor\"\n\n[revision]\ndefault_name = \"Draft\"\n",
    )
    .unwrap();

    let outcome = import_command(&ImportOptions::new(&input).with_color("pink"), &settings).unwrap();
    let revision = outcome.revision.unwrap();
    assert_eq!(revision.color, RevisionColor::Pink);
    assert_eq!(revision.revision_name, "Pink Draft");
    assert_eq!(revision.imported_by, "editor");
}

#[test]
fn test_import_rejects_unknown_color() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.fdx", PILOT_FDX.as_bytes());
    let result = import_command(
        &ImportOptions::new(&input).with_color("mauve"),
        &Settings::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_import_pdf_with_lines_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.pdf", b"%PDF-1.7\n");
    let lines = write_file(
        &dir,
        "pilot-lines.json",
        br#"[
  {"text": "INT. KITCHEN - DAY", "page": 1, "y": 72.0, "left_indent": 108.0, "all_caps": true},
  {"text": "JOHN", "page": 1, "y": 96.0, "left_indent": 266.0, "all_caps": true},
  {"text": "Where is everyone?", "page": 1, "y": 108.0, "left_indent": 180.0}
]"#,
    );

    let outcome = import_command(
        &ImportOptions::new(&input).with_lines(&lines),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(outcome.strategy, Strategy::PdfLayout);
    assert_eq!(outcome.scenes.len(), 1);
}

#[test]
fn test_import_pdf_without_lines_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "pilot.pdf", b"%PDF-1.7\n");
    let err = import_command(&ImportOptions::new(&input), &Settings::default()).unwrap_err();
    assert!(err.to_string().contains("Failed to import"));
}

#[test]
fn test_import_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = import_command(
        &ImportOptions::new(dir.path().join("missing.fdx")),
        &Settings::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_detect_archive_reports_inner_document() {
    let dir = TempDir::new().unwrap();
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("project.rdf", options).unwrap();
        zip.write_all(b"<rdf/>").unwrap();
        zip.start_file("screenplay.fdx", options).unwrap();
        zip.write_all(PILOT_FDX.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    let input = write_file(&dir, "pilot.celtx", &buffer.into_inner());

    detect_command(&input, OutputFormat::Text, &Settings::default()).unwrap();
    detect_command(&input, OutputFormat::Json, &Settings::default()).unwrap();
}

#[test]
fn test_revisions_missing_store() {
    let dir = TempDir::new().unwrap();
    let err = revisions_command(&dir.path().join("none.json"), OutputFormat::Text).unwrap_err();
    assert!(err.to_string().contains("Store not found"));
}
