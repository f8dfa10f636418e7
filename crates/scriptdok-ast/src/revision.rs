//! Revision records
//!
//! A [`RevisionRecord`] is the durable summary of one tracked import. It
//! outlives the scene drafts it summarizes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Industry revision color, in the order colors are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionColor {
    White,
    Blue,
    Pink,
    Yellow,
    Green,
    Goldenrod,
    Buff,
    Salmon,
    Cherry,
}

impl RevisionColor {
    /// The full palette, in issue order
    pub const PALETTE: [RevisionColor; 9] = [
        RevisionColor::White,
        RevisionColor::Blue,
        RevisionColor::Pink,
        RevisionColor::Yellow,
        RevisionColor::Green,
        RevisionColor::Goldenrod,
        RevisionColor::Buff,
        RevisionColor::Salmon,
        RevisionColor::Cherry,
    ];

    /// The color issued after this one; wraps from Cherry back to White
    pub fn next(self) -> Self {
        let index = Self::PALETTE
            .iter()
            .position(|c| *c == self)
            .unwrap_or(0);
        Self::PALETTE[(index + 1) % Self::PALETTE.len()]
    }

    /// Suggest a color for a new revision given the prior one
    pub fn suggest(prior: Option<RevisionColor>) -> Self {
        prior.map(RevisionColor::next).unwrap_or(RevisionColor::White)
    }

    /// Color name as printed on revision pages
    pub fn name(self) -> &'static str {
        match self {
            RevisionColor::White => "White",
            RevisionColor::Blue => "Blue",
            RevisionColor::Pink => "Pink",
            RevisionColor::Yellow => "Yellow",
            RevisionColor::Green => "Green",
            RevisionColor::Goldenrod => "Goldenrod",
            RevisionColor::Buff => "Buff",
            RevisionColor::Salmon => "Salmon",
            RevisionColor::Cherry => "Cherry",
        }
    }

    /// Parse a color name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PALETTE
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for RevisionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scene-level change counts against the prior revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevisionDelta {
    pub added: u32,
    pub modified: u32,
    pub removed: u32,
}

/// Durable record of one tracked import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Unique identity of this import
    pub id: Uuid,
    /// Source file name as given by the caller
    pub file_name: String,
    /// Content hash of the raw source bytes (SHA-256, lower-case hex)
    pub file_hash: String,
    /// Display name ("Blue Draft", "Revision 3", ...)
    pub revision_name: String,
    /// Revision color tag
    pub color: RevisionColor,
    /// Who ran the import
    pub imported_by: String,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
    /// Number of scenes in the import
    pub scene_count: u32,
    /// Total length in pages (sum of eighths / 8)
    pub page_count: f64,
    /// Changes against the prior revision
    pub delta: RevisionDelta,
}
