//! Placeholder values per snippet.
//!
//! An adjustments file names, for a snippet, the values replacing its
//! markers. A value naming a configuration variable stands for that
//! variable's value; anything else is used literally.

use std::collections::BTreeMap;

use crate::directive::Position;
use crate::section::SectionId;

/// Values for the markers of the snippet (or add/push directive) at `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
  pub at: Position,
  pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
  sections: BTreeMap<SectionId, Vec<ParamEntry>>,
}

impl ParameterMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, section: SectionId, entries: Vec<ParamEntry>) {
    self.sections.insert(section, entries);
  }

  /// Values for the snippet at `at` in `section`, first matching entry.
  pub fn lookup(&self, section: &SectionId, at: Position) -> Option<&[String]> {
    self
      .sections
      .get(section)?
      .iter()
      .find(|entry| entry.at == at)
      .map(|entry| entry.values.as_slice())
  }

  /// Replace every value naming a variable with the variable's value.
  pub fn resolve(&mut self, variables: &BTreeMap<String, String>) {
    for entry in self.sections.values_mut().flatten() {
      for value in &mut entry.values {
        if let Some(resolved) = variables.get(value.as_str()) {
          *value = resolved.clone();
        }
      }
    }
  }

  pub fn len(&self) -> usize {
    self.sections.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }
}
