//! Scene assembly
//!
//! Turns open-scene accumulators and classified element streams into
//! ordered [`SceneDraft`]s. The ordinal counter lives in the assembler, and
//! each import owns its own assembler, so ordinals are dense per import.

use scriptdok_ast::{ElementType, ParsedElement, SceneDraft};
use scriptdok_core::{leading_scene_number, parse_heading_components, EIGHTHS_PER_PAGE};

/// A scene that has been opened by a heading and is still collecting body
#[derive(Debug, Clone)]
pub struct OpenScene {
    /// Heading text; may carry strike sentinels
    pub heading: String,
    /// Scene number given explicitly by the source
    pub explicit_number: Option<String>,
    pub page_number: Option<u32>,
    /// Length given explicitly by the source
    pub length_eighths: Option<u32>,
    /// Formatted body lines
    pub body: Vec<String>,
    pub raw_source: Option<String>,
    pub confidence: f32,
}

impl OpenScene {
    /// Open a scene with the given heading text
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            explicit_number: None,
            page_number: None,
            length_eighths: None,
            body: Vec::new(),
            raw_source: None,
            confidence: 1.0,
        }
    }

    /// Append a body paragraph, formatted for its element type
    pub fn push_body(&mut self, element_type: ElementType, text: &str) {
        let line = format_body_line(element_type, text);
        if !line.trim().is_empty() {
            self.body.push(line);
        }
    }
}

/// Format one body paragraph the way it reads in a script.
///
/// Character cues and transitions are upper-cased, parentheticals are
/// wrapped in parentheses, everything else passes through.
pub fn format_body_line(element_type: ElementType, text: &str) -> String {
    let text = text.trim();
    match element_type {
        ElementType::Character | ElementType::Transition => text.to_uppercase(),
        ElementType::Parenthetical => {
            if text.starts_with('(') && text.ends_with(')') {
                text.to_string()
            } else {
                format!("({})", text.trim_matches(|c| c == '(' || c == ')').trim())
            }
        }
        _ => text.to_string(),
    }
}

/// Page-length estimate for paged sources without explicit lengths.
///
/// Placeholder heuristic: half a page for every page the scene touches.
/// It is an approximation, not a measurement.
pub fn estimate_eighths(first_page: u32, last_page: u32) -> u32 {
    let pages_touched = last_page.saturating_sub(first_page).saturating_add(1);
    pages_touched.saturating_mul(EIGHTHS_PER_PAGE) / 2
}

/// Per-import scene builder
#[derive(Debug)]
pub struct SceneAssembler {
    next_ordinal: u32,
}

impl Default for SceneAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneAssembler {
    pub fn new() -> Self {
        Self { next_ordinal: 1 }
    }

    /// Number of scenes finalized so far
    pub fn scenes_emitted(&self) -> u32 {
        self.next_ordinal - 1
    }

    /// Close an open scene and assign it the next ordinal.
    ///
    /// Number precedence: explicit source number, then a leading number in
    /// the heading text, then the ordinal. An empty heading is replaced by
    /// `"SCENE {number}"`.
    pub fn finalize(&mut self, scene: OpenScene) -> SceneDraft {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        let heading = scene.heading.trim().to_string();
        let number = scene
            .explicit_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| leading_scene_number(&heading))
            .unwrap_or_else(|| ordinal.to_string());
        let heading = if heading.is_empty() {
            format!("SCENE {}", number)
        } else {
            heading
        };

        let components = parse_heading_components(&heading);
        let body = scene.body.join("\n");

        SceneDraft {
            ordinal,
            number,
            heading,
            location_type: components.location_type,
            location: components.location,
            time_of_day: components.time_of_day,
            page_number: scene.page_number,
            page_length_eighths: scene.length_eighths.unwrap_or(0),
            script_text: if body.trim().is_empty() { None } else { Some(body) },
            raw_source: scene.raw_source,
            confidence: scene.confidence.clamp(0.0, 1.0),
        }
    }

    /// Build a heading-only scene
    pub fn heading_only(&mut self, heading: &str, confidence: f32) -> SceneDraft {
        let mut scene = OpenScene::new(heading);
        scene.confidence = confidence;
        scene.raw_source = Some(heading.to_string());
        self.finalize(scene)
    }

    /// Walk a classified element stream into scenes.
    ///
    /// Each scene heading finalizes the scene before it. Material before the
    /// first heading, page numbers and title-page elements never reach a
    /// body. For paged elements the page length is estimated with
    /// [`estimate_eighths`]; scene confidence is the mean element confidence.
    pub fn assemble(&mut self, elements: &[ParsedElement]) -> Vec<SceneDraft> {
        let mut scenes = Vec::new();
        let mut current: Option<PendingScene> = None;

        for element in elements {
            match element.element_type {
                ElementType::SceneHeading => {
                    if let Some(pending) = current.take() {
                        scenes.push(self.finalize(pending.close()));
                    }
                    current = Some(PendingScene::open(element));
                }
                ElementType::PageNumber | ElementType::TitlePage => {}
                element_type => {
                    if let Some(ref mut pending) = current {
                        pending.scene.push_body(element_type, &element.text);
                        pending.track(element);
                    }
                }
            }
        }

        if let Some(pending) = current.take() {
            scenes.push(self.finalize(pending.close()));
        }

        scenes
    }
}

/// Scene being built from elements, with the page span and confidence
/// samples needed at close
struct PendingScene {
    scene: OpenScene,
    first_page: u32,
    last_page: u32,
    confidence_sum: f32,
    samples: u32,
}

impl PendingScene {
    fn open(heading: &ParsedElement) -> Self {
        let mut scene = OpenScene::new(heading.text.clone());
        scene.explicit_number = heading.scene_number.clone();
        scene.raw_source = Some(heading.original_text.clone());
        if heading.page_number > 0 {
            scene.page_number = Some(heading.page_number);
        }
        Self {
            scene,
            first_page: heading.page_number,
            last_page: heading.page_number,
            confidence_sum: heading.confidence,
            samples: 1,
        }
    }

    fn track(&mut self, element: &ParsedElement) {
        self.last_page = self.last_page.max(element.page_number);
        self.confidence_sum += element.confidence;
        self.samples += 1;
    }

    fn close(mut self) -> OpenScene {
        if self.first_page > 0 {
            self.scene.length_eighths = Some(estimate_eighths(self.first_page, self.last_page));
        }
        self.scene.confidence = self.confidence_sum / self.samples as f32;
        self.scene
    }
}
