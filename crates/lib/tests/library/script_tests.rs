//! Script files: the push/pop code stack and what every script contains.

use lfscript_lib::GenerateError;
use lfscript_lib::section::Section;
use tempfile::TempDir;

use super::common::{TestEnv, cmd, expected, id, section};

const PUSH_POP: &str = r#"
[[sections."4.03".directives]]
at = 0.5
command = "push"
arg = "script_01.sh"

[[sections."4.03".directives]]
at = 1.5
command = "pop"
"#;

// =============================================================================
// Push and pop
// =============================================================================

#[test]
fn pushed_code_goes_to_its_own_script() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1"), cmd("echo A2")])],
      PUSH_POP,
    )
    .unwrap();

  let pushed = env.read("script_01.sh");
  assert!(pushed.contains("\necho A1\n"));
  assert!(!pushed.contains("\necho A0\n"));
  assert!(!pushed.contains("\necho A2\n"));

  let root = env.root_script();
  assert!(root.contains("\necho A0\n"));
  assert!(root.contains("\necho A2\n"));
  assert!(!root.contains("\necho A1\n"));

  let state_dir = env.state_dir();
  assert_eq!(
    report.scripts,
    [state_dir.join("script_01.sh"), state_dir.join("script_00.sh")]
  );
}

#[test]
fn pop_at_index_in_section_without_snippets() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![
        section("4.02", vec![cmd("echo A0")]),
        section("4.03", Vec::new()),
        section("4.04", vec![cmd("echo B0")]),
      ],
      r#"
[[sections."4.02".directives]]
at = 0.5
command = "push"
arg = "script_01.sh"

[[sections."4.03".directives]]
at = 0
command = "pop"
"#,
    )
    .unwrap();

  let root = env.root_script();
  assert!(root.contains("\necho A0\n"));
  assert!(root.contains("\necho B0\n"));
  assert!(env.read("script_01.sh").contains("# 4.03"));

  let state_dir = env.state_dir();
  assert_eq!(
    report.scripts,
    [state_dir.join("script_01.sh"), state_dir.join("script_00.sh")]
  );
}

#[test]
fn every_script_is_complete_and_executable() {
  let env = TestEnv::new();
  env
    .generate(vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1")])], PUSH_POP)
    .unwrap();

  for name in ["script_00.sh", "script_01.sh"] {
    let script = env.read(name);
    assert!(script.starts_with("#!/bin/bash\n"), "{name}");
    assert!(script.contains("function elapsed {"), "{name}");
    assert!(script.contains(&format!("# End of {}", env.state_dir().join(name).display())));

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      let mode = std::fs::metadata(env.state_dir().join(name)).unwrap().permissions().mode();
      assert_eq!(mode & 0o777, 0o755, "{name}");
    }
  }
}

#[test]
fn only_root_script_checks_privileges() {
  let env = TestEnv::new();
  env
    .generate(vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1")])], PUSH_POP)
    .unwrap();

  let root = env.root_script();
  assert!(root.contains("if [ $EUID -ne 0 ]; then"));
  assert!(root.contains("if [ \"$1\" = \"--reset\" ]; then"));
  assert!(root.find("$EUID").unwrap() < root.find("# Section header").unwrap());

  let pushed = env.read("script_01.sh");
  assert!(!pushed.contains("$EUID"));
  assert!(!pushed.contains("--reset"));
}

#[test]
fn push_spans_sections() {
  let env = TestEnv::new();
  env
    .generate(
      vec![
        section("4.03", vec![cmd("echo A0"), cmd("echo A1")]),
        section("4.04", vec![cmd("echo B0"), cmd("echo B1")]),
      ],
      r#"
[[sections."4.03".directives]]
at = 0.5
command = "push"
arg = "script_01.sh"

[[sections."4.04".directives]]
at = 0.5
command = "pop"
"#,
    )
    .unwrap();

  let pushed = env.read("script_01.sh");
  assert!(pushed.contains("\necho A1\n"));
  assert!(pushed.contains("echo \"# 4.04 Test Section\""));
  assert!(pushed.contains("\necho B0\n"));
  assert!(!pushed.contains("\necho B1\n"));

  let root = env.root_script();
  assert!(root.contains("\necho A0\n"));
  assert!(root.contains("\necho B1\n"));
}

#[test]
fn nested_pushes_finish_innermost_first() {
  let env = TestEnv::new();
  let report = env
    .generate(
      vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1"), cmd("echo A2")])],
      r#"
[[sections."4.03".directives]]
at = 0.5
command = "push"
arg = "script_01.sh"

[[sections."4.03".directives]]
at = 1.5
command = "push"
arg = "script_02.sh"

[[sections."4.03".directives]]
at = 2.1
command = "pop"

[[sections."4.03".directives]]
at = 2.2
command = "pop"
"#,
    )
    .unwrap();

  let names: Vec<_> = report
    .scripts
    .iter()
    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, ["script_02.sh", "script_01.sh", "script_00.sh"]);
  assert!(env.read("script_01.sh").contains("\necho A1\n"));
  assert!(env.read("script_02.sh").contains("\necho A2\n"));
}

#[test]
fn push_path_can_be_absolute_or_parameterized() {
  let env = TestEnv::new();
  let elsewhere = TempDir::new().unwrap();
  let absolute = elsewhere.path().join("chapter4.sh");

  env
    .generate(
      vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1"), cmd("echo A2")])],
      &format!(
        r#"
[[sections."4.03".directives]]
at = 0.5
command = "push"
arg = "{}"

[[sections."4.03".directives]]
at = 0.6
command = "pop"

[[sections."4.03".directives]]
at = 1.5
command = "push"
arg = "script_<code>nn</code>.sh"

[[sections."4.03".directives]]
at = 1.6
command = "pop"

[[sections."4.03".params]]
at = 1.5
values = ["07"]
"#,
        absolute.display()
      ),
    )
    .unwrap();

  assert!(absolute.exists());
  assert!(env.exists("script_07.sh"));
}

// =============================================================================
// Execution context
// =============================================================================

#[test]
fn chroot_scripts_use_chroot_paths() {
  let env = TestEnv::new();
  let bash = Section::package(id("6.35"), "Bash", "5.0")
    .with_archive("bash-5.0.tar.gz", "bash-5.0")
    .with_sbu(2.1)
    .with_snippets(vec![cmd("make")]);

  let report = env
    .generate(
      vec![
        section("6.04", vec![cmd("chroot \"$LFS\" /tools/bin/bash")]),
        bash,
        section("6.10", vec![cmd("echo hi"), expected("hi")]),
      ],
      r#"
[[sections."6.04".directives]]
at = 0.5
command = "push"
arg = "script_03.sh"
context = "chroot"

[[sections."6.10".directives]]
at = 1.5
command = "push"
arg = "script_04.sh"

[[sections."6.10".directives]]
at = 1.6
command = "pop"

[[sections."6.10".directives]]
at = 1.7
command = "pop"
"#,
    )
    .unwrap();

  let chroot = env.read("script_03.sh");
  assert!(chroot.contains("if [ -f /pkg_lfs/sbu_in_secs.txt ]; then"));
  assert!(chroot.contains("cd /sources\ntar xvf bash-5.0.tar.gz"));
  assert!(chroot.contains("echo $sbu_total > /pkg_lfs/sbu_total.txt"));
  assert!(chroot.contains("mktemp /pkg_lfs/6.10_00_output.XXXXXX"));

  // Check files are written on the host, the chroot sees them under /pkg_lfs.
  assert_eq!(report.checks[0].script, env.state_dir().join("6.10_00_script.sh"));
  assert!(env.exists("6.10_00_expected.txt"));

  // Nested pushes inherit the context.
  assert!(env.read("script_04.sh").contains("if [ -f /pkg_lfs/sbu_in_secs.txt ]; then"));

  let root = env.root_script();
  let state_dir = env.state_dir().display().to_string();
  assert!(root.contains(&format!("if [ -f {state_dir}/sbu_in_secs.txt ]; then")));
  assert!(!root.contains("/pkg_lfs"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn unmatched_push_fails_without_root_script() {
  let env = TestEnv::new();
  let err = env
    .generate(
      vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1")])],
      r#"
[[sections."4.03".directives]]
at = 0.5
command = "push"
arg = "script_01.sh"
"#,
    )
    .unwrap_err();

  match err {
    GenerateError::UnmatchedPush { dest } => assert_eq!(dest, env.state_dir().join("script_01.sh")),
    other => panic!("expected an unmatched push, got {other:?}"),
  }
  assert!(!env.exists("script_00.sh"));
  assert!(!env.exists("script_01.sh"));
}

#[test]
fn pop_without_push_fails() {
  let env = TestEnv::new();
  let err = env
    .generate(
      vec![section("4.03", vec![cmd("echo A0"), cmd("echo A1")])],
      r#"
[[sections."4.03".directives]]
at = 0.5
command = "pop"
"#,
    )
    .unwrap_err();

  let message = err.to_string();
  assert!(matches!(err, GenerateError::Configuration { .. }));
  assert!(message.contains("4.03"));
  assert!(message.contains("0.5"));
  assert!(message.contains("pop without a pushed script"));
}
