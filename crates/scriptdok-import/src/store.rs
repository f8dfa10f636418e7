//! Persistence adapter
//!
//! An import hands its results to a [`SceneStore`] as one [`ImportBatch`].
//! Nothing from a batch is visible before `commit` returns.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use scriptdok_ast::RevisionRecord;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::revision::TaggedScene;

/// Errors from a scene store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store refused the batch
    #[error("Commit rejected: {0}")]
    Rejected(String),
}

/// Everything one import commits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub scenes: Vec<TaggedScene>,
    pub revision: Option<RevisionRecord>,
}

/// Where imported scenes are kept
pub trait SceneStore {
    /// All revisions, oldest first
    fn revisions(&self) -> Result<Vec<RevisionRecord>, StoreError>;

    /// The most recent revision, used to suggest the next color
    fn latest_revision(&self) -> Result<Option<RevisionRecord>, StoreError> {
        Ok(self.revisions()?.pop())
    }

    /// Commit a batch as one unit
    fn commit(&mut self, batch: ImportBatch) -> Result<(), StoreError>;
}

/// On-disk shape of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub revisions: Vec<RevisionRecord>,
    #[serde(default)]
    pub scenes: Vec<TaggedScene>,
}

impl ProjectData {
    /// Apply a batch: scenes replace those with the same provenance key,
    /// the revision is appended
    fn apply(&mut self, batch: ImportBatch) {
        for tagged in batch.scenes {
            match self
                .scenes
                .iter_mut()
                .find(|s| s.provenance_key == tagged.provenance_key)
            {
                Some(existing) => *existing = tagged,
                None => self.scenes.push(tagged),
            }
        }
        if let Some(revision) = batch.revision {
            self.revisions.push(revision);
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: ProjectData,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every commit
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    pub fn data(&self) -> &ProjectData {
        &self.data
    }
}

impl SceneStore for MemoryStore {
    fn revisions(&self) -> Result<Vec<RevisionRecord>, StoreError> {
        Ok(self.data.revisions.clone())
    }

    fn commit(&mut self, batch: ImportBatch) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Rejected("store is read-only".to_string()));
        }
        self.data.apply(batch);
        Ok(())
    }
}

/// A project kept in one JSON file.
///
/// Commits rewrite the whole file through a temporary file in the same
/// directory which is then renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the project; a missing file is an empty project
    pub fn load(&self) -> Result<ProjectData, StoreError> {
        if !self.path.exists() {
            return Ok(ProjectData::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ProjectData::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, data: &ProjectData) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!("Saved project to {}", self.path.display());
        Ok(())
    }
}

impl SceneStore for JsonFileStore {
    fn revisions(&self) -> Result<Vec<RevisionRecord>, StoreError> {
        Ok(self.load()?.revisions)
    }

    fn commit(&mut self, batch: ImportBatch) -> Result<(), StoreError> {
        let mut data = self.load()?;
        data.apply(batch);
        self.save(&data)
    }
}
