//! Generator configuration.
//!
//! The configuration file is looked up, in order, at the path given on the
//! command line, at `$LFSCRIPT_CONFIG`, then at
//! `$XDG_CONFIG_HOME/lfscript/config.toml` (`~/.config/...` when unset).
//! A missing default file is not an error: every setting has a default.
//!
//! ```toml
//! state_root = "/var/tmp/lfs"
//! chroot_state_dir = "/pkg_lfs"
//! reference_section = "5.04"
//! package_dir = "/home/lfs/pkgs"
//!
//! [variables]
//! linux_partition = "sda3"
//! lfs_mount_point = "/mnt/lfs"
//! time_zone = "Europe/Paris"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  APP_NAME, DEFAULT_CHROOT_STATE_DIR, DEFAULT_REFERENCE_SECTION, DEFAULT_STATE_ROOT, LFS_MOUNT_VARIABLE,
};
use crate::section::SectionId;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "LFSCRIPT_CONFIG";

/// Environment variable overriding `state_root`.
pub const STATE_ROOT_ENV: &str = "LFSCRIPT_STATE_ROOT";

/// Configuration file name inside the configuration directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Directory holding one state directory per book version.
  pub state_root: PathBuf,
  /// The state directory as seen from inside the chroot.
  pub chroot_state_dir: PathBuf,
  /// Section whose package build time defines one SBU.
  pub reference_section: SectionId,
  /// Directory of downloaded package archives.
  pub package_dir: Option<PathBuf>,
  /// Values available to placeholder substitution, by name.
  pub variables: BTreeMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      state_root: PathBuf::from(DEFAULT_STATE_ROOT),
      chroot_state_dir: PathBuf::from(DEFAULT_CHROOT_STATE_DIR),
      reference_section: DEFAULT_REFERENCE_SECTION
        .parse()
        .unwrap_or(SectionId::new(5, 4)),
      package_dir: None,
      variables: BTreeMap::new(),
    }
  }
}

/// Returns the directory for configuration files for the application
pub fn config_dir() -> Option<PathBuf> {
  let config_home = std::env::var_os("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
  Some(config_home.join(APP_NAME))
}

impl Config {
  /// Load the configuration, then apply environment overrides.
  ///
  /// An explicit path, or one from `$LFSCRIPT_CONFIG`, must exist.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let required = explicit.map(Path::to_path_buf).or(from_env);

    let mut config = match required {
      Some(path) => Self::load_file(&path)?,
      None => match config_dir().map(|dir| dir.join(CONFIG_FILENAME)) {
        Some(path) if path.is_file() => Self::load_file(&path)?,
        _ => {
          debug!("no config file, using defaults");
          Self::default()
        }
      },
    };

    config.apply_env();
    Ok(config)
  }

  pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loading config");
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  fn apply_env(&mut self) {
    if let Some(root) = std::env::var_os(STATE_ROOT_ENV) {
      self.state_root = PathBuf::from(root);
    }
  }

  /// Host state directory for one book version.
  pub fn state_dir(&self, version: &str) -> PathBuf {
    self.state_root.join(version)
  }

  /// The chroot state directory as seen from the host, below the LFS mount
  /// point. `None` without an `lfs_mount_point` variable.
  pub fn chroot_state_dir_on_host(&self) -> Option<PathBuf> {
    let mount = self.variables.get(LFS_MOUNT_VARIABLE)?;
    let inside = self
      .chroot_state_dir
      .strip_prefix("/")
      .unwrap_or(&self.chroot_state_dir);
    Some(Path::new(mount).join(inside))
  }
}
