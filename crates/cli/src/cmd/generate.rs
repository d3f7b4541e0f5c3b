//! Implementation of the `lfscript generate` command.
//!
//! Loads a book document and its adjustments, then writes every build script
//! and check file into the state directory of the book version.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use lfscript_lib::Layout;

use super::{load_book, load_config};
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, print_warning};

pub struct GenerateArgs<'a> {
  pub document: &'a Path,
  pub adjust: &'a Path,
  pub state_root: Option<&'a Path>,
  pub config: Option<&'a Path>,
}

pub fn cmd_generate(args: GenerateArgs<'_>, output: OutputFormat) -> Result<()> {
  let mut config = load_config(args.config)?;
  if let Some(root) = args.state_root {
    config.state_root = root.to_path_buf();
  }

  let book = load_book(args.document, args.adjust, &config)?;
  let version = &book.document().version;
  let layout = Layout::from_config(&config, version);
  info!(state_dir = %layout.state_dir().display(), "generating");

  if !output.is_json() {
    print_info(&format!("Generating {}", book.document().label()));
  }

  let report = book
    .generate(&layout)
    .with_context(|| format!("Failed to generate scripts for version {}", version))?;

  if output.is_json() {
    return print_json(&report);
  }

  for warning in &report.warnings {
    print_warning(warning);
  }
  for script in &report.scripts {
    print_success(&format!("Wrote {}", script.display()));
  }

  println!();
  print_stat("Sections", &report.sections.len().to_string());
  print_stat("Ignored", &report.ignored.len().to_string());
  print_stat("Checks", &report.checks.len().to_string());
  print_stat("Scripts", &report.scripts.len().to_string());
  println!();
  print_info(&format!(
    "Start the build as root with {}",
    layout.root_script().display()
  ));

  Ok(())
}
