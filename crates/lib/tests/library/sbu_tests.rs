//! SBU accounting, as generated and as run.

use std::path::Path;
use std::process::Command;

use chrono::{Local, TimeZone};
use lfscript_lib::SbuLedger;
use lfscript_lib::generate::file_header;
use lfscript_lib::sbu::{Epilogue, SbuExpectation};
use lfscript_lib::section::{Archive, Section, SectionId};
use tempfile::TempDir;

use super::common::{TestEnv, cmd, have_shell_tools, id};

fn binutils() -> Section {
  Section::package(id("5.04"), "Binutils", "2.34")
    .with_archive("binutils-2.34.tar.xz", "binutils-2.34")
    .with_sbu(1.0)
    .with_snippets(vec![cmd("make")])
}

fn bash() -> Section {
  Section::package(id("6.35"), "Bash", "5.0")
    .with_archive("bash-5.0.tar.gz", "bash-5.0")
    .with_sbu(2.1)
    .with_snippets(vec![cmd("make")])
}

// =============================================================================
// Generated accounting
// =============================================================================

#[test]
fn package_sections_are_wrapped() {
  let env = TestEnv::new();
  let report = env.generate(vec![binutils(), bash()], "").unwrap();
  assert!(report.warnings.is_empty());

  let script = env.root_script();
  assert!(script.contains("cd $LFS/sources\ntar xvf binutils-2.34.tar.xz > /dev/null\ncd binutils-2.34\nstart=$SECONDS\n"));
  assert!(script.contains("rm -rf binutils-2.34\n"));
  assert!(script.contains("rm -rf bash-5.0\n"));

  // Reference section defines the SBU, later ones are measured against it.
  let reference = script.find("# Finish section 5.04").unwrap();
  let later = script.find("# Finish section 6.35").unwrap();
  assert!(script[reference..later].contains("sbu_in_secs=$duration\n"));
  assert!(!script[later..].contains("sbu_in_secs=$duration\n"));
  assert!(script[later..].contains("(expected %03.1f), total: %03.1f (expected %03.1f), target %03.1f\\n\" $elapsed_txt $sbu 2.1 $sbu_total 3.1 3.1\n"));
}

#[test]
fn ignored_packages_do_not_count() {
  let env = TestEnv::new();
  env
    .generate(
      vec![binutils(), bash()],
      r#"
[sections."6.35"]
ignore = true
"#,
    )
    .unwrap();

  let script = env.root_script();
  assert!(script.contains("$sbu 1.0 $sbu_total 1.0 1.0\n"));
}

#[test]
fn missing_reference_is_reported() {
  let env = TestEnv::new();
  let report = env.generate(vec![bash()], "").unwrap();

  assert_eq!(report.warnings.len(), 1);
  assert!(report.warnings[0].contains("reference section 5.04"));
  assert!(env.root_script().contains("6.35: SBU not measured yet, counting 0.0"));
}

#[test]
fn package_without_archive_is_generated_bare() {
  let env = TestEnv::new();
  let section = Section::package(id("6.20"), "Unknown", "1.0").with_snippets(vec![cmd("make")]);
  let report = env.generate(vec![binutils(), section], "").unwrap();

  assert_eq!(report.warnings.len(), 1);
  assert!(report.warnings[0].contains("6.20 Unknown"));
  let script = env.root_script();
  assert!(!script.contains("# Finish section 6.20"));
  assert_eq!(script.matches("tar xvf").count(), 1);
}

// =============================================================================
// Running the accounting
// =============================================================================

/// Run the close of a package section as if its build took `duration`
/// seconds, with the ledger in `state` and the sources in `sources`.
fn run_epilogue(section: SectionId, reference: bool, duration: u64, state: &Path, sources: &Path) -> String {
  let archive = Archive {
    filename: "pkg-1.0.tar.xz".to_string(),
    subdir: "pkg-1.0".to_string(),
  };
  let state_dir = state.display().to_string();
  let sources_dir = sources.display().to_string();
  let epilogue = Epilogue {
    section,
    archive: &archive,
    expected: SbuExpectation {
      sbu: 1.0,
      running_total: 1.0,
    },
    target: 3.1,
    is_reference: reference,
    state_dir: &state_dir,
    sources_dir: &sources_dir,
  };

  let now = Local.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap();
  let mut code = file_header(&state.join("script_00.sh"), "LFS version 9.1", &state_dir, now);
  code.push_str("start=0\n");
  code.push_str(&epilogue.render().replace("end=$SECONDS", &format!("end={duration}")));

  std::fs::create_dir_all(sources.join("pkg-1.0")).unwrap();
  let output = Command::new("bash")
    .arg("-c")
    .arg(&code)
    .env("LC_ALL", "C")
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn ledger_persists_across_scripts() {
  if !have_shell_tools() {
    return;
  }
  let state = TempDir::new().unwrap();
  let sources = TempDir::new().unwrap();

  let stdout = run_epilogue(id("5.04"), true, 100, state.path(), sources.path());
  assert!(stdout.contains("5.04: 00:01:40 = 1.0 SBUs"), "{stdout}");
  assert!(!sources.path().join("pkg-1.0").exists());

  let ledger = SbuLedger::load(state.path()).unwrap();
  assert_eq!(ledger.seconds_per_sbu, Some(100));
  assert_eq!(ledger.total, Some(1.0));

  let stdout = run_epilogue(id("6.35"), false, 250, state.path(), sources.path());
  assert!(stdout.contains("6.35: 00:04:10 = 2.5 SBUs"), "{stdout}");
  assert!(stdout.contains("total: 3.5"), "{stdout}");

  let ledger = SbuLedger::load(state.path()).unwrap();
  assert_eq!(ledger.seconds_per_sbu, Some(100));
  assert_eq!(ledger.total, Some(3.5));
}

#[test]
fn builds_before_reference_count_zero() {
  if !have_shell_tools() {
    return;
  }
  let state = TempDir::new().unwrap();
  let sources = TempDir::new().unwrap();

  let stdout = run_epilogue(id("5.02"), false, 30, state.path(), sources.path());
  assert!(stdout.contains("5.02: SBU not measured yet, counting 0.0"), "{stdout}");
  assert!(stdout.contains("= 0.0 SBUs"), "{stdout}");

  let ledger = SbuLedger::load(state.path()).unwrap();
  assert_eq!(ledger.seconds_per_sbu, None);
  assert_eq!(ledger.total, Some(0.0));
}

#[test]
fn instant_reference_build_counts_one_second() {
  if !have_shell_tools() {
    return;
  }
  let state = TempDir::new().unwrap();
  let sources = TempDir::new().unwrap();

  run_epilogue(id("5.04"), true, 0, state.path(), sources.path());
  assert_eq!(SbuLedger::load(state.path()).unwrap().seconds_per_sbu, Some(1));
}
