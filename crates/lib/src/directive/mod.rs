//! Directives: authored patches applied to a section's snippets while
//! generating, without touching the document itself.
//!
//! A section is either ignored as a whole or carries a list of directives
//! sorted by [`Position`]. Directives at a snippet's own position act on that
//! snippet (replace it, ignore it); directives between snippets insert code
//! (add) or redirect the code that follows into another script (push, pop).

mod position;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use position::{Position, PositionError};

use crate::adjust::AdjustError;
use crate::section::SectionId;

/// Where a generated script runs.
///
/// The context decides the runtime locations generated code refers to:
/// the state directory and the package sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecContext {
  /// On the build host, as root or as the unprivileged build user.
  #[default]
  Host,
  /// Inside the chroot of the system being built.
  Chroot,
}

impl fmt::Display for ExecContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExecContext::Host => write!(f, "host"),
      ExecContext::Chroot => write!(f, "chroot"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveCommand {
  /// Skip the snippet at this position.
  Ignore,
  /// Overwrite the text of the snippet at this position.
  Replace(String),
  /// Send the code that follows to a new script.
  Push {
    path: String,
    /// Context of the new script; inherited when `None`.
    context: Option<ExecContext>,
  },
  /// Finalize the current script and resume the one below it.
  Pop,
  /// Insert a new command snippet.
  Add(String),
  /// A command name nothing knows how to apply.
  Unrecognized(String),
}

impl DirectiveCommand {
  pub fn name(&self) -> &str {
    match self {
      DirectiveCommand::Ignore => "ignore",
      DirectiveCommand::Replace(_) => "replace",
      DirectiveCommand::Push { .. } => "push",
      DirectiveCommand::Pop => "pop",
      DirectiveCommand::Add(_) => "add",
      DirectiveCommand::Unrecognized(name) => name,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
  pub at: Position,
  pub command: DirectiveCommand,
}

impl Directive {
  pub fn new(at: Position, command: DirectiveCommand) -> Self {
    Self { at, command }
  }
}

/// Directives targeting one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionDirectives {
  /// Generate nothing for the section.
  IgnoreSection,
  /// Apply these directives, sorted by position.
  Patches(Vec<Directive>),
}

/// Directives for every adjusted section of one book version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveTable {
  sections: BTreeMap<SectionId, SectionDirectives>,
}

impl DirectiveTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register directives for a section, replacing any previous entry.
  ///
  /// # Errors
  ///
  /// Returns [`AdjustError::Unordered`] when the directives are not sorted
  /// by position. Equal positions are allowed and keep their order.
  pub fn insert(&mut self, section: SectionId, directives: SectionDirectives) -> Result<(), AdjustError> {
    if let SectionDirectives::Patches(list) = &directives {
      if let Some(pair) = list.windows(2).find(|pair| pair[1].at < pair[0].at) {
        return Err(AdjustError::Unordered {
          section: section.to_string(),
          position: pair[1].at.to_string(),
          previous: pair[0].at.to_string(),
        });
      }
    }
    self.sections.insert(section, directives);
    Ok(())
  }

  pub fn ignore_section(&mut self, section: SectionId) {
    self.sections.insert(section, SectionDirectives::IgnoreSection);
  }

  pub fn get(&self, section: &SectionId) -> Option<&SectionDirectives> {
    self.sections.get(section)
  }

  pub fn is_ignored(&self, section: &SectionId) -> bool {
    matches!(self.sections.get(section), Some(SectionDirectives::IgnoreSection))
  }

  /// Directives for a section, empty when it has none or is ignored.
  pub fn patches(&self, section: &SectionId) -> &[Directive] {
    match self.sections.get(section) {
      Some(SectionDirectives::Patches(list)) => list,
      _ => &[],
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&SectionId, &SectionDirectives)> {
    self.sections.iter()
  }

  pub fn len(&self) -> usize {
    self.sections.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }
}
