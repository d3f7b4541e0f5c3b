//! Implementation of the `lfscript plan` command.
//!
//! Lists what generating a book would do without writing anything: which
//! sections are generated or ignored, how many directives adjust them, and
//! the archive and documented SBUs of package sections.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use lfscript_lib::SectionOutline;

use super::{load_book, load_config};
use crate::output::{OutputFormat, format_sbu, print_json, print_stat, symbols};

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
  version: &'a str,
  reference_section: String,
  target_sbu: f64,
  sections: &'a [SectionOutline],
}

pub fn cmd_plan(document: &Path, adjust: &Path, config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let book = load_book(document, adjust, &config)?;
  let outline = book.outline();
  let plan = book.plan();

  if output.is_json() {
    return print_json(&PlanOutput {
      version: &book.document().version,
      reference_section: plan.reference().to_string(),
      target_sbu: plan.target(),
      sections: &outline,
    });
  }

  println!("{}", book.document().label());
  println!();
  for section in &outline {
    print_section(section);
  }

  let generated = outline.iter().filter(|s| !s.ignored).count();
  println!();
  print_stat("Sections", &format!("{} generated, {} ignored", generated, outline.len() - generated));
  print_stat("Reference", &plan.reference().to_string());
  print_stat("Target", &format_sbu(plan.target()));

  Ok(())
}

fn print_section(section: &SectionOutline) {
  let title = match &section.version {
    Some(version) => format!("{} {} {}", section.id, section.name, version),
    None => format!("{} {}", section.id, section.name),
  };

  if section.ignored {
    println!(
      "  {} {}",
      symbols::MINUS.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      format!("{} (ignored)", title).if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
    return;
  }

  let mut details = Vec::new();
  if section.directives > 0 {
    details.push(format!("{} directive(s)", section.directives));
  }
  if let Some(archive) = &section.archive {
    details.push(archive.clone());
  }
  if let Some(sbu) = section.expected_sbu {
    details.push(format_sbu(sbu));
  }

  let symbol = symbols::PLUS.if_supports_color(Stream::Stdout, |s| s.green());
  if details.is_empty() {
    println!("  {} {}", symbol, title);
  } else {
    println!("  {} {} ({})", symbol, title, details.join(", "));
  }
}
