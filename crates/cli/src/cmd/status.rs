//! Status command implementation.
//!
//! Displays the build time accounting the generated scripts keep in the
//! state directory of a book version. Once the build has entered the chroot
//! the ledger lives below the LFS mount point, and that copy is shown.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use lfscript_lib::{Config, Layout, SbuLedger};

use super::load_config;
use crate::output::{
  OutputFormat, format_duration, format_sbu, print_error, print_info, print_json, print_stat, print_success,
};

pub fn cmd_status(version: &str, config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let layout = Layout::from_config(&config, version);
  let state_dir = layout.state_dir();
  let root_script = layout.root_script();

  let (ledger, ledger_dir) = load_ledger(&config, state_dir)?;

  if output.is_json() {
    let json_output = serde_json::json!({
      "version": version,
      "state_dir": state_dir,
      "ledger_dir": ledger_dir,
      "generated": root_script.is_file(),
      "seconds_per_sbu": ledger.seconds_per_sbu,
      "total_sbu": ledger.total,
    });
    return print_json(&json_output);
  }

  if root_script.is_file() {
    print_success(&format!("Scripts generated in {}", state_dir.display()));
  } else {
    print_info(&format!("No scripts generated in {}", state_dir.display()));
  }

  match ledger.seconds_per_sbu {
    Some(secs) => {
      print_stat("Ledger", &ledger_dir.display().to_string());
      print_stat("SBU", &format_duration(Duration::from_secs(secs)));
      print_stat("Built", &format_sbu(ledger.total.unwrap_or(0.0)));
    }
    None => {
      print_info("No SBU measured yet");
      if let Some(total) = ledger.total {
        print_stat("Built", &format_sbu(total));
      }
    }
  }

  Ok(())
}

/// The host ledger, or the chroot copy once the build has handed it over.
fn load_ledger(config: &Config, state_dir: &Path) -> Result<(SbuLedger, PathBuf)> {
  let host =
    SbuLedger::load(state_dir).with_context(|| format!("Failed to read SBU ledger in {}", state_dir.display()))?;

  let chroot_dir = match config.chroot_state_dir_on_host() {
    Some(dir) if dir.is_dir() => dir,
    _ => return Ok((host, state_dir.to_path_buf())),
  };

  match SbuLedger::load(&chroot_dir) {
    Ok(chroot) if chroot.seconds_per_sbu.is_some() || chroot.total.is_some() => Ok((chroot, chroot_dir)),
    Ok(_) => Ok((host, state_dir.to_path_buf())),
    Err(e) => {
      print_error(&format!("Error loading chroot SBU ledger: {}", e));
      Err(e).with_context(|| format!("Failed to read SBU ledger in {}", chroot_dir.display()))
    }
  }
}
