//! The book: a document together with the adjustments and configuration
//! it is generated with.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adjust::Adjustments;
use crate::config::Config;
use crate::directive::{DirectiveTable, SectionDirectives};
use crate::document::Document;
use crate::generate::{GenContext, GenerateError, GenerationReport};
use crate::layout::Layout;
use crate::params::ParameterMap;
use crate::sbu::SbuPlan;
use crate::section::{SectionId, archive::resolve_archive};

/// One line of a generation plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutline {
  pub id: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  pub ignored: bool,
  pub directives: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub archive: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected_sbu: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Book {
  document: Document,
  directives: DirectiveTable,
  params: ParameterMap,
  reference: SectionId,
  variables: BTreeMap<String, String>,
}

impl Book {
  /// Prepare a document for generation: resolve package archives and the
  /// placeholder values named after variables.
  pub fn new(mut document: Document, adjustments: Adjustments, config: &Config) -> Self {
    let package_dir = config.package_dir.as_deref();
    for section in &mut document.sections {
      if !resolve_archive(section, &document.packages, &document.archive_subdirs, package_dir) {
        debug!(section = %section.id, "archive not resolved");
      }
    }

    let mut variables = config.variables.clone();
    variables.insert("lfs_version".to_string(), document.version.clone());
    if let Some(kernel) = document.kernel_version() {
      variables.insert("kernel_version".to_string(), kernel.to_string());
    }
    if let Some(dir) = package_dir {
      variables.insert("pkg_repository".to_string(), dir.display().to_string());
    }

    let Adjustments { directives, mut params } = adjustments;
    params.resolve(&variables);

    Self {
      document,
      directives,
      params,
      reference: config.reference_section,
      variables,
    }
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  pub fn directives(&self) -> &DirectiveTable {
    &self.directives
  }

  pub fn variables(&self) -> &BTreeMap<String, String> {
    &self.variables
  }

  pub fn plan(&self) -> SbuPlan {
    SbuPlan::new(&self.document.sections, &self.directives, self.reference)
  }

  /// What generating would do, section by section.
  pub fn outline(&self) -> Vec<SectionOutline> {
    let plan = self.plan();
    self
      .document
      .sections
      .iter()
      .map(|section| {
        let ignored = self.directives.is_ignored(&section.id);
        SectionOutline {
          id: section.id.to_string(),
          name: section.name.clone(),
          version: section.version.clone(),
          ignored,
          directives: self.directives.patches(&section.id).len(),
          archive: section.archive.as_ref().map(|a| a.filename.clone()),
          expected_sbu: (section.builds_package && !ignored).then(|| plan.expectation(&section.id).sbu),
        }
      })
      .collect()
  }

  /// Generate every script of the build into the layout's state directory.
  ///
  /// Nothing is rolled back on error: scripts finalized by a pop before the
  /// failure stay, and are overwritten by the next successful run.
  pub fn generate(&self, layout: &Layout) -> Result<GenerationReport, GenerateError> {
    layout.ensure_state_dir().map_err(|source| GenerateError::Write {
      path: layout.state_dir().to_path_buf(),
      source,
    })?;

    let plan = self.plan();
    let label = self.document.label();
    let mut ctx = GenContext::new(layout, &label, &plan, &self.params);

    let has_packages = self.document.sections.iter().any(|s| s.builds_package);
    if has_packages && !plan.has_reference() {
      warn!(reference = %self.reference, "reference section is not generated, SBUs will not be measured");
      ctx.warning(format!(
        "reference section {} is not generated, SBUs will not be measured",
        self.reference
      ));
    }

    info!(version = %self.document.version, sections = self.document.sections.len(), "generating scripts");
    for section in &self.document.sections {
      let directives: Option<&SectionDirectives> = self.directives.get(&section.id);
      ctx.section(section, directives)?;
    }

    ctx.finish()
  }
}
