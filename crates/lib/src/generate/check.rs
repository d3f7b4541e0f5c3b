//! Checking a command's output against the output the book shows for it.
//!
//! Two files are written next to the scripts when generating: the command
//! with its banner, and the expected output. The generated code runs the
//! first, trims every output line and diffs the result against the second.
//! The banner is part of what the command prints, so the expected file
//! starts with it.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::layout::write_file;
use crate::snippet::{Snippet, banner, banner_output, trim_lines};

/// Files backing one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFiles {
  pub stem: String,
  pub script: PathBuf,
  pub expected: PathBuf,
}

/// A command snippet waiting to learn whether expected output follows it.
#[derive(Debug, Clone)]
pub struct PendingCommand {
  pub index: usize,
  pub snippet: Snippet,
}

/// Commands buffered until an expected output or a directive interrupts
/// them.
#[derive(Debug, Default)]
pub struct Pending {
  commands: Vec<PendingCommand>,
}

impl Pending {
  pub fn push(&mut self, index: usize, snippet: Snippet) {
    self.commands.push(PendingCommand { index, snippet });
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  /// Every buffered command, emptying the buffer.
  pub fn drain(&mut self) -> Vec<PendingCommand> {
    std::mem::take(&mut self.commands)
  }

  /// Split off the command to check against expected output: the last one.
  /// Returns the others, to be emitted unchecked, and the last.
  pub fn take_for_check(&mut self) -> Option<(Vec<PendingCommand>, PendingCommand)> {
    let last = self.commands.pop()?;
    Some((self.drain(), last))
  }
}

/// Write the fragment and the expected output of a check into `dir`.
pub fn write_check_files(
  dir: &Path,
  stem: &str,
  label: &str,
  snippet: &Snippet,
  expected: &str,
) -> io::Result<CheckFiles> {
  let script = dir.join(format!("{stem}_script.sh"));
  let expected_path = dir.join(format!("{stem}_expected.txt"));

  write_file(&script, &snippet.fragment(label))?;
  let mut content = banner_output(label, &snippet.text);
  content.push_str(&trim_lines(expected));
  write_file(&expected_path, &content)?;

  Ok(CheckFiles {
    stem: stem.to_string(),
    script,
    expected: expected_path,
  })
}

/// Code running a check from `runtime_dir`, where its files are found when
/// the script runs.
///
/// A mismatch is reported, never fatal: the build goes on and the operator
/// reads the log.
pub fn checked_code(stem: &str, label: &str, snippet: &Snippet, runtime_dir: &str) -> String {
  let mut out = banner(label, &snippet.text);
  out.push_str(&format!(
    r#"output_filename=$(mktemp {runtime_dir}/{stem}_output.XXXXXX)
bash {runtime_dir}/{stem}_script.sh 2>&1 | sed -e "s/^\s\+\|\s\+$//g" > $output_filename
diff $output_filename {runtime_dir}/{stem}_expected.txt
err=$?
if [ $err -eq 0 ]; then
    echo "Check: {stem}: output is as expected."
elif [ $err -eq 1 ]; then
    echo "Check: {stem}: unexpected output"
else
    echo "Check: {stem}: diff failed with exit code $err"
fi
rm -f $output_filename

"#
  ));
  out
}
