//! Adjustments file: the directives and placeholder values adapting the
//! generated scripts to one version of the book.
//!
//! # Format
//!
//! ```toml
//! # Skip a section entirely
//! [sections."1.05"]
//! ignore = true
//!
//! # From position 4.5 on, write code to script_01.sh
//! [[sections."4.03".directives]]
//! at = 4.5
//! command = "push"
//! arg = "script_01.sh"
//!
//! # Values for the markers of snippet 4
//! [[sections."4.03".params]]
//! at = 4
//! values = ["lfs_mount_point"]
//! ```
//!
//! `command` is one of `ignore`, `replace`, `push`, `pop` and `add`. Other
//! names are kept and reported when generating, so one typo does not stop a
//! whole build. `replace`, `push` and `add` require `arg`; `push` also
//! accepts a `context` (`host` or `chroot`) for the new script.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::directive::{Directive, DirectiveCommand, DirectiveTable, ExecContext, Position, SectionDirectives};
use crate::params::{ParamEntry, ParameterMap};
use crate::section::{SectionId, SectionIdError};

#[derive(Debug, Error)]
pub enum AdjustError {
  #[error("failed to read adjustments file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse adjustments file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error(transparent)]
  SectionId(#[from] SectionIdError),

  #[error("section {section}, position {position}: '{command}' requires an argument")]
  MissingArgument {
    section: String,
    position: String,
    command: String,
  },

  #[error("section {section}: directive at {position} follows one at {previous}, directives must be sorted")]
  Unordered {
    section: String,
    position: String,
    previous: String,
  },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdjustFile {
  #[serde(default)]
  sections: BTreeMap<String, SectionAdjust>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionAdjust {
  #[serde(default)]
  ignore: bool,
  #[serde(default)]
  directives: Vec<RawDirective>,
  #[serde(default)]
  params: Vec<RawParams>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDirective {
  at: Position,
  command: String,
  arg: Option<String>,
  context: Option<ExecContext>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParams {
  at: Position,
  values: Vec<String>,
}

/// Directives and placeholder values for one book version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjustments {
  pub directives: DirectiveTable,
  pub params: ParameterMap,
}

impl Adjustments {
  pub fn load(path: &Path) -> Result<Self, AdjustError> {
    let content = fs::read_to_string(path).map_err(|source| AdjustError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loading adjustments");
    content.parse()
  }
}

impl std::str::FromStr for Adjustments {
  type Err = AdjustError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let file: AdjustFile = toml::from_str(s)?;
    let mut adjustments = Adjustments::default();

    for (key, section) in file.sections {
      let id: SectionId = key.parse()?;

      if !section.params.is_empty() {
        let entries = section
          .params
          .into_iter()
          .map(|p| ParamEntry {
            at: p.at,
            values: p.values,
          })
          .collect();
        adjustments.params.insert(id, entries);
      }

      if section.ignore {
        if !section.directives.is_empty() {
          warn!(section = %id, "section is ignored, its directives are dropped");
        }
        adjustments.directives.ignore_section(id);
        continue;
      }

      if section.directives.is_empty() {
        continue;
      }

      let directives = section
        .directives
        .into_iter()
        .map(|raw| to_directive(&id, raw))
        .collect::<Result<Vec<_>, _>>()?;
      adjustments
        .directives
        .insert(id, SectionDirectives::Patches(directives))?;
    }

    Ok(adjustments)
  }
}

fn to_directive(section: &SectionId, raw: RawDirective) -> Result<Directive, AdjustError> {
  let missing = || AdjustError::MissingArgument {
    section: section.to_string(),
    position: raw.at.to_string(),
    command: raw.command.clone(),
  };

  let command = match raw.command.as_str() {
    "ignore" => DirectiveCommand::Ignore,
    "pop" => DirectiveCommand::Pop,
    "replace" => DirectiveCommand::Replace(raw.arg.clone().ok_or_else(missing)?),
    "add" => DirectiveCommand::Add(raw.arg.clone().ok_or_else(missing)?),
    "push" => DirectiveCommand::Push {
      path: raw.arg.clone().ok_or_else(missing)?,
      context: raw.context,
    },
    other => DirectiveCommand::Unrecognized(other.to_string()),
  };

  Ok(Directive::new(raw.at, command))
}
