use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snippet::Snippet;

/// Errors parsing a section id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionIdError {
  #[error("invalid section id: '{0}' (expected <major>.<minor>)")]
  Invalid(String),
}

/// Normalized section id, displayed as `major.minor` with a two-digit minor.
///
/// `"5.4"`, `"5.4."` and `"5.04"` all designate section `5.04`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId {
  major: u32,
  minor: u32,
}

impl SectionId {
  pub fn new(major: u32, minor: u32) -> Self {
    Self { major, minor }
  }

  pub fn major(&self) -> u32 {
    self.major
  }

  pub fn minor(&self) -> u32 {
    self.minor
  }
}

impl FromStr for SectionId {
  type Err = SectionIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || SectionIdError::Invalid(s.to_string());
    let trimmed = s.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);

    let (major, minor) = trimmed.split_once('.').ok_or_else(invalid)?;
    let digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
    if !digits(major) || !digits(minor) || minor.len() > 2 {
      return Err(invalid());
    }

    Ok(Self {
      major: major.parse().map_err(|_| invalid())?,
      minor: minor.parse().map_err(|_| invalid())?,
    })
  }
}

impl TryFrom<String> for SectionId {
  type Error = SectionIdError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<SectionId> for String {
  fn from(id: SectionId) -> Self {
    id.to_string()
  }
}

impl fmt::Display for SectionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.major, self.minor)
  }
}

/// A resolved package archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
  /// Archive file name, relative to the sources directory.
  pub filename: String,
  /// Directory the archive extracts into.
  pub subdir: String,
}

/// Estimates published by the document for a package section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
  /// Approximate build time in SBUs.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sbu: Option<f64>,
  /// Approximate disk usage in GB.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub disk_gb: Option<f64>,
}

/// One section of the build document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
  pub id: SectionId,
  pub name: String,
  /// Package version, for sections building a package.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  /// Whether the section extracts, builds and cleans up a package archive.
  #[serde(default)]
  pub builds_package: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub archive: Option<Archive>,
  #[serde(default)]
  pub estimate: Estimate,
  #[serde(default)]
  pub snippets: Vec<Snippet>,
}

impl Section {
  /// Create a section holding configuration commands only.
  pub fn new(id: SectionId, name: &str) -> Self {
    Self {
      id,
      name: name.to_string(),
      version: None,
      builds_package: false,
      archive: None,
      estimate: Estimate::default(),
      snippets: Vec::new(),
    }
  }

  /// Create a package-building section.
  pub fn package(id: SectionId, name: &str, version: &str) -> Self {
    Self {
      version: Some(version.to_string()),
      builds_package: true,
      ..Self::new(id, name)
    }
  }

  pub fn with_snippets(mut self, snippets: Vec<Snippet>) -> Self {
    self.snippets = snippets;
    self
  }

  pub fn with_archive(mut self, filename: &str, subdir: &str) -> Self {
    self.archive = Some(Archive {
      filename: filename.to_string(),
      subdir: subdir.to_string(),
    });
    self
  }

  pub fn with_sbu(mut self, sbu: f64) -> Self {
    self.estimate.sbu = Some(sbu);
    self
  }

  /// `id name [version]`, as printed in the section header.
  pub fn title(&self) -> String {
    match (&self.version, self.builds_package) {
      (Some(version), true) => format!("{} {} {}", self.id, self.name, version),
      _ => format!("{} {}", self.id, self.name),
    }
  }
}
