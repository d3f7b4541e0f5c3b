mod generate;
mod plan;
mod reset;
mod status;

use std::path::Path;

use anyhow::{Context, Result};
use lfscript_lib::{Adjustments, Book, Config, Document};

pub use generate::{GenerateArgs, cmd_generate};
pub use plan::cmd_plan;
pub use reset::cmd_reset;
pub use status::cmd_status;

fn load_config(path: Option<&Path>) -> Result<Config> {
  Config::load(path).context("Failed to load configuration")
}

/// Load a document and its adjustments into a book ready to generate.
fn load_book(document: &Path, adjust: &Path, config: &Config) -> Result<Book> {
  let document =
    Document::load(document).with_context(|| format!("Failed to load document: {}", document.display()))?;
  let adjustments =
    Adjustments::load(adjust).with_context(|| format!("Failed to load adjustments: {}", adjust.display()))?;
  Ok(Book::new(document, adjustments, config))
}
