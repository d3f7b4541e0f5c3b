//! The parsed build book: ordered sections plus the package list.
//!
//! Extracting sections from the book's markup happens elsewhere; this is the
//! JSON form handed to the generator.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::section::Section;

#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("failed to read document {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse document: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("duplicate section id {0}")]
  DuplicateSection(String),
}

/// A package listed by the book, with the archive it is distributed as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
  pub name: String,
  pub version: String,
  pub filename: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub md5: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  /// Book version, e.g. `9.1`. Names the state directory.
  pub version: String,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub published: Option<String>,
  #[serde(default)]
  pub packages: Vec<Package>,
  /// Archives not extracting into their own stripped file name.
  #[serde(default)]
  pub archive_subdirs: BTreeMap<String, String>,
  pub sections: Vec<Section>,
}

impl Document {
  pub fn load(path: &Path) -> Result<Self, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let doc = Self::from_json(&content)?;
    debug!(path = %path.display(), version = %doc.version, sections = doc.sections.len(), "loaded document");
    Ok(doc)
  }

  /// Parse and validate a document.
  pub fn from_json(json: &str) -> Result<Self, DocumentError> {
    let doc: Document = serde_json::from_str(json)?;
    doc.validate()?;
    Ok(doc)
  }

  /// Section ids must be unique. Their order is the document's and is never
  /// checked: numbering restarts across parts of the book.
  pub fn validate(&self) -> Result<(), DocumentError> {
    let mut seen = HashSet::new();
    for section in &self.sections {
      if !seen.insert(section.id) {
        return Err(DocumentError::DuplicateSection(section.id.to_string()));
      }
    }
    Ok(())
  }

  /// Human readable label, as written in script headers.
  pub fn label(&self) -> String {
    let title = if self.title.is_empty() { "LFS" } else { &self.title };
    match &self.published {
      Some(date) => format!("{title} version {} published {date}", self.version),
      None => format!("{title} version {}", self.version),
    }
  }

  /// Version of the kernel package, if the book lists one.
  pub fn kernel_version(&self) -> Option<&str> {
    self
      .packages
      .iter()
      .find(|p| p.name == "Linux")
      .map(|p| p.version.as_str())
  }
}
