//! Output checks: commands followed by the output the book expects.

use std::process::Command;

use lfscript_lib::generate::{checked_code, write_check_files};
use lfscript_lib::snippet::{Snippet, rule};
use tempfile::TempDir;

use super::common::{TestEnv, cmd, expected, have_shell_tools, section, snippet_labels};

// =============================================================================
// Pairing
// =============================================================================

#[test]
fn command_followed_by_output_is_checked() {
  let env = TestEnv::new();
  let report = env
    .generate(vec![section("6.10", vec![cmd("echo hi"), expected("hi")])], "")
    .unwrap();

  assert_eq!(report.checks.len(), 1);
  let check = &report.checks[0];
  assert_eq!(check.stem, "6.10_00");
  assert!(env.exists("6.10_00_script.sh"));
  assert!(env.exists("6.10_00_expected.txt"));

  let fragment = env.read("6.10_00_script.sh");
  assert!(fragment.ends_with("\necho hi\n"));
  assert!(!fragment.contains("err=$?"));

  let expected = env.read("6.10_00_expected.txt");
  assert!(expected.contains("# Snippet 6.10_00\n"));
  assert!(expected.ends_with(&format!("# echo hi\n{}\nhi\n", rule('-'))));

  let script = env.root_script();
  assert_eq!(script.matches("diff $output_filename").count(), 1);
  assert!(script.contains("Check: 6.10_00: output is as expected."));
  assert!(!script.contains("Error: 6.10_00 returned"));
}

#[test]
fn expected_output_alone_is_skipped() {
  let env = TestEnv::new();
  let report = env
    .generate(vec![section("6.10", vec![expected("hi"), cmd("echo bye")])], "")
    .unwrap();

  assert!(report.checks.is_empty());
  let script = env.root_script();
  assert!(!script.contains("diff $output_filename"));
  assert_eq!(snippet_labels(&script), ["6.10_01"]);
}

#[test]
fn only_last_command_before_output_is_checked() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![section("6.10", vec![cmd("echo setup"), cmd("echo hi"), expected("hi")])],
      "",
    )
    .unwrap();

  assert_eq!(report.checks.len(), 1);
  assert_eq!(report.checks[0].stem, "6.10_01");

  let script = env.root_script();
  assert!(script.contains("\necho setup\nerr=$?"));
  assert!(script.contains("Check: 6.10_01: unexpected output"));
  assert_eq!(snippet_labels(&script), ["6.10_00", "6.10_01"]);
}

#[test]
fn directive_between_command_and_output_prevents_check() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![section("6.10", vec![cmd("echo hi"), expected("hi")])],
      r#"
[[sections."6.10".directives]]
at = 0.5
command = "add"
arg = "echo between"
"#,
    )
    .unwrap();

  assert!(report.checks.is_empty());
  let script = env.root_script();
  assert!(script.contains("\necho hi\nerr=$?"));
  assert!(script.find("\necho hi\n").unwrap() < script.find("\necho between\n").unwrap());
}

#[test]
fn replaced_command_is_checked_with_its_new_text() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![section("6.10", vec![cmd("echo hello"), expected("hi")])],
      r#"
[[sections."6.10".directives]]
at = 0
command = "replace"
arg = "echo hi"
"#,
    )
    .unwrap();

  assert_eq!(report.checks.len(), 1);
  assert!(env.read("6.10_00_script.sh").ends_with("\necho hi\n"));
  assert!(env.read("6.10_00_expected.txt").contains("# Snippet 6.10_00 [replace]\n"));
}

// =============================================================================
// Running checks
// =============================================================================

fn run_check(command: &str, expected_output: &str) -> String {
  let dir = TempDir::new().unwrap();
  let snippet = Snippet::command(command);
  write_check_files(dir.path(), "7.02_00", "7.02_00", &snippet, expected_output).unwrap();

  let runtime_dir = dir.path().display().to_string();
  let code = checked_code("7.02_00", "7.02_00", &snippet, &runtime_dir);
  let output = Command::new("bash").arg("-c").arg(&code).output().unwrap();

  let leftovers: Vec<_> = std::fs::read_dir(dir.path())
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .filter(|name| name.contains("_output."))
    .collect();
  assert!(leftovers.is_empty(), "captured output left behind: {leftovers:?}");

  String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn matching_output_passes() {
  if !have_shell_tools() {
    return;
  }
  let stdout = run_check("echo '   hi   '\necho there", "hi\n  there");
  assert!(stdout.contains("Check: 7.02_00: output is as expected."), "{stdout}");
}

#[test]
fn differing_output_is_reported() {
  if !have_shell_tools() {
    return;
  }
  let stdout = run_check("echo hi", "bye");
  assert!(stdout.contains("Check: 7.02_00: unexpected output"), "{stdout}");
}
