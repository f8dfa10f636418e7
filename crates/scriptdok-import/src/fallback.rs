//! Pattern-scan fallback
//!
//! The lowest-fidelity strategy: every line that reads as a scene heading
//! becomes a heading-only scene. Always available; the other strategies
//! fall back to it.

use scriptdok_ast::SceneDraft;
use scriptdok_core::is_scene_heading;
use tracing::debug;

use crate::assembler::SceneAssembler;
use crate::error::Result;
use crate::markup::markup_to_text;
use crate::strategy::{ParseInput, ParseOutcome, SceneParser, Strategy};

/// Confidence of scenes found by the pattern scan
pub const PATTERN_SCAN_CONFIDENCE: f32 = 0.6;

/// Scan text line by line for scene headings
pub fn scan_headings(text: &str) -> Vec<SceneDraft> {
    let mut assembler = SceneAssembler::new();
    let scenes: Vec<SceneDraft> = text
        .lines()
        .map(str::trim)
        .filter(|line| is_scene_heading(line))
        .map(|line| {
            let heading = line.split_whitespace().collect::<Vec<_>>().join(" ");
            let mut scene = assembler.heading_only(&heading, PATTERN_SCAN_CONFIDENCE);
            scene.raw_source = Some(line.to_string());
            scene
        })
        .collect();
    debug!("Pattern scan found {} headings", scenes.len());
    scenes
}

/// The pattern-scan strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternScanner;

impl SceneParser for PatternScanner {
    fn strategy(&self) -> Strategy {
        Strategy::PatternScan
    }

    fn parse(&self, input: &ParseInput<'_>) -> Result<ParseOutcome> {
        let text = input.text();
        let text = if text.trim_start().starts_with('<') {
            markup_to_text(&text)
        } else {
            text.into_owned()
        };
        Ok(ParseOutcome::new(Strategy::PatternScan, scan_headings(&text)))
    }
}
