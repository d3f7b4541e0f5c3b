//! Fixed parts of generated scripts.

use std::path::Path;

use chrono::{DateTime, Local};

use crate::consts::{SBU_SECONDS_FILE, SBU_TOTAL_FILE};
use crate::section::Section;
use crate::snippet::rule;

/// Opening lines of every script: provenance, a banner identifying the run,
/// the SBU ledger if a previous script left one, and the `elapsed` helper.
pub fn file_header(path: &Path, label: &str, state_dir: &str, now: DateTime<Local>) -> String {
  let rule = rule('=');
  let path = path.display();
  let dt = now.format("%Y-%m-%d %H:%M:%S");
  format!(
    r##"
# {path} generated on {dt}
# from {label}
echo "{rule}"
echo "# $0 user \"$USER\" pid $$"
echo "{rule}"
date

# If SBU values have been calculated, get them
if [ -f {state_dir}/{SBU_SECONDS_FILE} ]; then
    sbu_in_secs=$(cat {state_dir}/{SBU_SECONDS_FILE})
fi
if [ -f {state_dir}/{SBU_TOTAL_FILE} ]; then
    sbu_total=$(cat {state_dir}/{SBU_TOTAL_FILE})
fi

# Display elapsed seconds as hh:mm:ss
function elapsed {{
    local duration=$1
    local minutes=$(( duration / 60 ))
    local secs=$(( duration % 60 ))
    printf "%02d:%02d:%02d" $(( minutes / 60 )) $(( minutes % 60 )) $secs
}}

"##
  )
}

pub fn file_footer(path: &Path) -> String {
  let rule = rule('=');
  format!("\necho \"{rule}\"\necho \"# End of {}\"\necho \"{rule}\"\n", path.display())
}

/// Checks specific to the root script, which runs first.
///
/// The ledger is kept across runs so an interrupted build resumes its
/// accounting; `--reset` starts it over.
pub fn root_prologue(state_dir: &str) -> String {
  format!(
    r#"
# Checking effective user, must be root to build LFS
if [ $EUID -ne 0 ]; then
    echo "This script requires root privileges"
    exit 1
fi

# Clearing SBU values from previous runs on request
if [ "$1" = "--reset" ]; then
    rm -f {state_dir}/{SBU_SECONDS_FILE}
    rm -f {state_dir}/{SBU_TOTAL_FILE}
fi
"#
  )
}

pub fn section_header(section: &Section) -> String {
  let rule = rule('=');
  format!(
    "# Section header\necho \"{rule}\"\necho \"# {}\"\necho \"{rule}\"\necho\n",
    section.title()
  )
}

/// A complete script file.
pub fn assemble(prologue: Option<&str>, header: &str, body: &str, footer: &str) -> String {
  let mut out = String::with_capacity(header.len() + body.len() + footer.len() + 64);
  out.push_str("#!/bin/bash\n");
  if let Some(prologue) = prologue {
    out.push_str(prologue);
  }
  out.push_str(header);
  out.push_str(body);
  out.push_str(footer);
  out
}
