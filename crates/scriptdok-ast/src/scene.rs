//! Scene drafts
//!
//! A [`SceneDraft`] is the canonical, format-independent record every import
//! path produces. Drafts are transient: they are created and consumed within
//! one import call and handed to the persistence layer at the end.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interior/exterior designation from a scene heading prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    /// `INT.`
    #[serde(rename = "INT")]
    Int,
    /// `EXT.`
    #[serde(rename = "EXT")]
    Ext,
    /// `INT./EXT.`, `EXT./INT.`, `I/E.`
    #[serde(rename = "INT/EXT")]
    IntExt,
}

impl LocationType {
    /// Canonical short label ("INT", "EXT", "INT/EXT")
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Int => "INT",
            LocationType::Ext => "EXT",
            LocationType::IntExt => "INT/EXT",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scene as recovered from a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDraft {
    /// 1-based position in the import, dense and strictly increasing
    pub ordinal: u32,
    /// Scene number, explicit from the source or generated from the ordinal
    pub number: String,
    /// Heading text (never empty)
    pub heading: String,
    /// Interior/exterior designation, if the heading carried one
    pub location_type: Option<LocationType>,
    /// Location part of the heading
    pub location: String,
    /// Time-of-day part of the heading
    pub time_of_day: String,
    /// Page the scene starts on, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Scene length in eighths of a page
    pub page_length_eighths: u32,
    /// Body text (action, dialogue, ...) newline-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_text: Option<String>,
    /// Verbatim excerpt of the source the scene was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
    /// Parser certainty, 0.0 to 1.0
    pub confidence: f32,
}

impl SceneDraft {
    /// Page length as a fractional page count
    pub fn pages(&self) -> f64 {
        f64::from(self.page_length_eighths) / 8.0
    }

    /// Whether the scene carries any body text
    pub fn has_body(&self) -> bool {
        self.script_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}
