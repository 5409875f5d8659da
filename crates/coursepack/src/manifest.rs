//! # Course Manifest
//!
//! The fixed universe of documents one course expects to have available
//! offline. A manifest is authored at build time (typically as a bundled
//! JSON file), is never mutated at runtime, and is the sole source of
//! truth for "which documents should exist" when the preloader and the
//! startup gate reason about cache completeness.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Classification of a course document, used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lecture,
    Tutorial,
    Exam,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Lecture => "lecture",
            Category::Tutorial => "tutorial",
            Category::Exam => "exam",
            Category::Other => "other",
        }
    }
}

/// One document the course expects to be available offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Stable identifier used for cross-referencing from course content.
    pub id: String,
    /// Human-readable title for listings.
    pub title: String,
    /// Document filename. Doubles as the store key and as the path
    /// segment appended to the document root when fetching.
    pub file: String,
    pub category: Category,
    /// Chapter or unit the document belongs to, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

/// A course's document universe plus where those documents live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Course name for display.
    pub course: String,
    /// Default document root URL. Callers may override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub documents: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and parse a manifest file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&raw)
    }

    /// Document filenames in manifest order with duplicates removed.
    /// This is the universe the preloader diffs the store against.
    pub fn filenames(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.documents
            .iter()
            .filter(|entry| seen.insert(entry.file.as_str()))
            .map(|entry| entry.file.clone())
            .collect()
    }

    /// Number of unique document filenames.
    pub fn len(&self) -> usize {
        self.filenames().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
