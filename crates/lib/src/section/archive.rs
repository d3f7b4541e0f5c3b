//! Resolving the archive a package section extracts.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use super::{Archive, Section};
use crate::document::Package;

const ARCHIVE_SUFFIXES: [&str; 3] = [".tar.gz", ".tar.xz", ".tar.bz2"];

/// Directory an archive extracts into, derived from its file name.
///
/// `overrides` maps file names to non-standard directory names; other
/// archives extract into their file name stripped of the compression suffix.
pub fn archive_subdir(filename: &str, overrides: &BTreeMap<String, String>) -> Option<String> {
  if let Some(subdir) = overrides.get(filename) {
    return Some(subdir.clone());
  }

  ARCHIVE_SUFFIXES
    .iter()
    .find_map(|suffix| filename.strip_suffix(suffix))
    .map(str::to_string)
}

/// Find the archive file name for a package section.
///
/// The package list is searched first, by equal name and version. Failing
/// that, `package_dir` is scanned for a file named `<name>-<version>.tar.*`
/// with the name lowercased.
pub fn find_archive_filename(section: &Section, packages: &[Package], package_dir: Option<&Path>) -> Option<String> {
  let version = section.version.as_deref()?;

  if let Some(pkg) = packages
    .iter()
    .find(|p| p.name == section.name && p.version == version)
  {
    return Some(pkg.filename.clone());
  }

  let dir = package_dir?;
  let prefix = format!("{}-{}.tar.", section.name.to_lowercase(), version);
  let entries = match std::fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) => {
      warn!(dir = %dir.display(), error = %e, "cannot read package directory");
      return None;
    }
  };

  let mut names: Vec<String> = entries
    .filter_map(|entry| entry.ok())
    .filter_map(|entry| entry.file_name().into_string().ok())
    .filter(|name| name.starts_with(&prefix))
    .collect();
  names.sort();
  names.into_iter().next()
}

/// Resolve the archive of a package section, leaving an already set
/// archive untouched.
///
/// Returns `false` when the section builds a package whose archive could
/// not be determined.
pub fn resolve_archive(
  section: &mut Section,
  packages: &[Package],
  overrides: &BTreeMap<String, String>,
  package_dir: Option<&Path>,
) -> bool {
  if !section.builds_package || section.archive.is_some() {
    return true;
  }

  let Some(filename) = find_archive_filename(section, packages, package_dir) else {
    return false;
  };

  match archive_subdir(&filename, overrides) {
    Some(subdir) => {
      debug!(section = %section.id, filename = %filename, subdir = %subdir, "resolved archive");
      section.archive = Some(Archive { filename, subdir });
      true
    }
    None => {
      warn!(section = %section.id, filename = %filename, "unrecognized archive suffix");
      false
    }
  }
}
