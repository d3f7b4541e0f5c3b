//! Where generated files go, and where generated code looks at run time.
//!
//! Scripts are generated into the host state directory of a book version.
//! Code running inside the chroot sees that directory at another path, so
//! every runtime path depends on the [`ExecContext`] of the script.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::consts::{CHROOT_SOURCES_DIR, HOST_SOURCES_DIR, ROOT_SCRIPT};
use crate::directive::ExecContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  state_dir: PathBuf,
  chroot_state_dir: PathBuf,
}

impl Layout {
  pub fn new(state_dir: impl Into<PathBuf>, chroot_state_dir: impl Into<PathBuf>) -> Self {
    Self {
      state_dir: state_dir.into(),
      chroot_state_dir: chroot_state_dir.into(),
    }
  }

  pub fn from_config(config: &Config, version: &str) -> Self {
    Self::new(config.state_dir(version), config.chroot_state_dir.clone())
  }

  pub fn state_dir(&self) -> &Path {
    &self.state_dir
  }

  pub fn root_script(&self) -> PathBuf {
    self.state_dir.join(ROOT_SCRIPT)
  }

  /// Destination of a pushed script; relative paths land in the state
  /// directory.
  pub fn resolve(&self, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.state_dir.join(path)
    }
  }

  /// The state directory as seen by a script running in `context`.
  pub fn runtime_state_dir(&self, context: ExecContext) -> String {
    match context {
      ExecContext::Host => self.state_dir.display().to_string(),
      ExecContext::Chroot => self.chroot_state_dir.display().to_string(),
    }
  }

  /// The package sources directory as seen by a script running in `context`.
  pub fn sources_dir(&self, context: ExecContext) -> &'static str {
    match context {
      ExecContext::Host => HOST_SOURCES_DIR,
      ExecContext::Chroot => CHROOT_SOURCES_DIR,
    }
  }

  /// Create the state directory, writable by everyone: scripts running as
  /// the unprivileged build user update the SBU files in it.
  pub fn ensure_state_dir(&self) -> io::Result<()> {
    fs::create_dir_all(&self.state_dir)?;
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&self.state_dir, fs::Permissions::from_mode(0o777))?;
    }
    Ok(())
  }
}

/// Write a file atomically: the content goes to a temporary file in the
/// destination directory, which is then renamed over `path`.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
  write_atomic(path, content, None)
}

/// Write an executable script atomically.
pub fn write_script(path: &Path, content: &str) -> io::Result<()> {
  write_atomic(path, content, Some(0o755))
}

fn write_atomic(path: &Path, content: &str, mode: Option<u32>) -> io::Result<()> {
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  fs::create_dir_all(parent)?;

  let mut tmp = NamedTempFile::new_in(parent)?;
  tmp.write_all(content.as_bytes())?;
  tmp.as_file().sync_all()?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = mode.unwrap_or(0o644);
    fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
  }
  #[cfg(not(unix))]
  let _ = mode;

  tmp.persist(path).map_err(|e| e.error)?;
  Ok(())
}
