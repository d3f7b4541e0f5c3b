use std::path::Path;

use anyhow::{Context, Result};

use lfscript_lib::{Layout, SbuLedger};

use super::load_config;
use crate::output::{print_info, print_success};

/// Remove the SBU ledger of a book version.
pub fn cmd_reset(version: &str, config: Option<&Path>) -> Result<()> {
  let config = load_config(config)?;
  let layout = Layout::from_config(&config, version);

  let removed = SbuLedger::reset(layout.state_dir())
    .with_context(|| format!("Failed to reset SBU ledger in {}", layout.state_dir().display()))?;

  if removed.is_empty() {
    print_info("Nothing to reset");
  }
  for path in removed {
    print_success(&format!("Removed {}", path.display()));
  }

  Ok(())
}
