//! The demo book, adjustments and configuration shipped with the workspace.

use lfscript_lib::directive::{DirectiveCommand, ExecContext};
use lfscript_lib::{Adjustments, Book, Config, Document, Layout};
use tempfile::TempDir;

use super::common::{demo_path, id};

fn demo_config(state_root: &std::path::Path) -> Config {
  let mut config = Config::load_file(&demo_path("lfscript.toml")).unwrap();
  config.state_root = state_root.to_path_buf();
  config
}

#[test]
fn demo_config_parses() {
  let config = Config::load_file(&demo_path("lfscript.toml")).unwrap();
  assert_eq!(config.reference_section, id("5.04"));
  assert_eq!(config.variables["linux_partition"], "sda3");
  assert_eq!(config.variables["grub_cfg_path"], "/boot/grub");
}

#[test]
fn demo_adjustments_parse() {
  let adjustments = Adjustments::load(&demo_path("adjust-9.1.toml")).unwrap();
  let directives = &adjustments.directives;

  assert!(directives.is_ignored(&id("1.05")));
  assert!(directives.is_ignored(&id("6.80")));
  assert!(!directives.is_ignored(&id("4.03")));

  let adding_user = directives.patches(&id("4.03"));
  assert_eq!(adding_user.len(), 3);
  assert_eq!(adding_user[0].command, DirectiveCommand::Ignore);
  assert!(matches!(adding_user[2].command, DirectiveCommand::Push { .. }));

  let chroot = directives.patches(&id("6.04"));
  match &chroot[1].command {
    DirectiveCommand::Push { path, context } => {
      assert_eq!(path, "script_03.sh");
      assert_eq!(*context, Some(ExecContext::Chroot));
    }
    other => panic!("expected a push, got {other:?}"),
  }

  assert!(!adjustments.params.is_empty());
}

#[test]
fn demo_book_generates_build() {
  let temp = TempDir::new().unwrap();
  let config = demo_config(temp.path());
  let document = Document::load(&demo_path("book-sample.json")).unwrap();
  let adjustments = Adjustments::load(&demo_path("adjust-9.1.toml")).unwrap();

  let book = Book::new(document, adjustments, &config);
  let layout = Layout::from_config(&config, "9.1");
  let report = book.generate(&layout).unwrap();

  let names: Vec<_> = report
    .scripts
    .iter()
    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
    .collect();
  assert_eq!(
    names,
    ["script_02.sh", "script_01.sh", "script_04.sh", "script_03.sh", "script_05.sh", "script_00.sh"]
  );
  assert!(report.warnings.is_empty(), "{:?}", report.warnings);

  let state_dir = config.state_dir("9.1");
  let read = |name: &str| std::fs::read_to_string(state_dir.join(name)).unwrap();

  let root = read("script_00.sh");
  assert!(root.contains("\nmount -v -t ext4 /dev/sda3 $LFS\n"));
  assert!(root.contains("\nsu - lfs /var/tmp/lfs/9.1/script_01.sh\n"));
  assert!(root.contains("cp $LFS/pkg_lfs/config.5.5.3 /var/tmp/lfs/9.1"));
  assert!(root.contains("set root=(hd0,3)"));
  assert!(!root.contains("passwd lfs"));

  let lfs_env = read("script_02.sh");
  assert!(lfs_env.contains("\nsource ~/.bashrc\n"));
  assert!(lfs_env.contains("tar xvf binutils-2.34.tar.xz"));
  assert!(lfs_env.contains("sbu_in_secs=$duration"));

  let chroot = read("script_03.sh");
  assert!(chroot.contains("mktemp /pkg_lfs/6.10_00_output.XXXXXX"));
  assert_eq!(report.checks.len(), 1);
  assert!(state_dir.join("6.10_00_expected.txt").exists());

  let after_bash = read("script_04.sh");
  assert!(after_bash.contains("cd /sources\nrm -rf bash-5.0\n"));

  let outline = book.outline();
  assert_eq!(outline.len(), 10);
  let bash = outline.iter().find(|s| s.id == "6.35").unwrap();
  assert_eq!(bash.archive.as_deref(), Some("bash-5.0.tar.gz"));
  assert_eq!(bash.expected_sbu, Some(2.1));
}
