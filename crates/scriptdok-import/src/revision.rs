//! Revision and provenance tracking
//!
//! A tracked import gets a [`RevisionRecord`] and every scene a provenance
//! key built from the source hash and the scene ordinal. Byte-identical
//! sources always produce the same keys.

use chrono::Utc;
use scriptdok_ast::{RevisionColor, RevisionDelta, RevisionRecord, SceneDraft};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// SHA-256 of the raw source bytes, lower-case hex
pub fn hash_source(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Provenance key of a scene: `{file_hash}-{ordinal}`
pub fn provenance_key(file_hash: &str, ordinal: u32) -> String {
    format!("{}-{}", file_hash, ordinal)
}

/// A scene paired with its provenance key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedScene {
    pub provenance_key: String,
    pub scene: SceneDraft,
}

/// Pair every scene with its provenance key
pub fn tag_scenes(file_hash: &str, scenes: Vec<SceneDraft>) -> Vec<TaggedScene> {
    scenes
        .into_iter()
        .map(|scene| TaggedScene {
            provenance_key: provenance_key(file_hash, scene.ordinal),
            scene,
        })
        .collect()
}

/// What the caller asks of a tracked import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionRequest {
    /// Display name; generated from the color when absent
    pub revision_name: Option<String>,
    pub imported_by: String,
    /// Explicit color; suggested from the prior revision when absent
    pub color: Option<RevisionColor>,
}

impl RevisionRequest {
    pub fn new(imported_by: impl Into<String>) -> Self {
        Self {
            imported_by: imported_by.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.revision_name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: RevisionColor) -> Self {
        self.color = Some(color);
        self
    }
}

/// Creates revision records
#[derive(Debug, Clone)]
pub struct RevisionTracker {
    /// Suffix of generated revision names ("Blue Revision")
    default_name: String,
}

impl Default for RevisionTracker {
    fn default() -> Self {
        Self::new("Revision")
    }
}

impl RevisionTracker {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
        }
    }

    /// Create the record for one import.
    ///
    /// Every scene counts as added; there is no comparison against the
    /// prior revision's scenes.
    pub fn create_record(
        &self,
        file_name: &str,
        file_hash: &str,
        scenes: &[SceneDraft],
        request: &RevisionRequest,
        prior_color: Option<RevisionColor>,
    ) -> RevisionRecord {
        let color = request
            .color
            .unwrap_or_else(|| RevisionColor::suggest(prior_color));
        let revision_name = request
            .revision_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} {}", color, self.default_name));
        let total_eighths: u64 = scenes
            .iter()
            .map(|s| u64::from(s.page_length_eighths))
            .sum();

        RevisionRecord {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            file_hash: file_hash.to_string(),
            revision_name,
            color,
            imported_by: request.imported_by.clone(),
            timestamp: Utc::now(),
            scene_count: scenes.len() as u32,
            page_count: total_eighths as f64 / 8.0,
            delta: RevisionDelta {
                added: scenes.len() as u32,
                modified: 0,
                removed: 0,
            },
        }
    }
}
