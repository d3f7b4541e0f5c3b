//! Well-known names and default locations.

/// Application name, used for configuration directories.
pub const APP_NAME: &str = "lfscript";

/// Default root under which per-version state directories are created.
pub const DEFAULT_STATE_ROOT: &str = "/var/tmp/lfs";

/// Default state directory as seen from inside the chroot.
pub const DEFAULT_CHROOT_STATE_DIR: &str = "/pkg_lfs";

/// Configuration variable holding the mount point of the LFS partition.
pub const LFS_MOUNT_VARIABLE: &str = "lfs_mount_point";

/// Section whose package build defines one SBU.
pub const DEFAULT_REFERENCE_SECTION: &str = "5.04";

/// The first script to run, written once every section has been generated.
pub const ROOT_SCRIPT: &str = "script_00.sh";

/// Persisted number of seconds in one SBU.
pub const SBU_SECONDS_FILE: &str = "sbu_in_secs.txt";

/// Persisted running total of SBUs measured so far.
pub const SBU_TOTAL_FILE: &str = "sbu_total.txt";

/// Package sources as seen from the host (the user building the toolchain).
pub const HOST_SOURCES_DIR: &str = "$LFS/sources";

/// Package sources as seen from inside the chroot.
pub const CHROOT_SOURCES_DIR: &str = "/sources";

/// Width of the `#====` rules printed by generated scripts.
pub const RULE_WIDTH: usize = 79;

/// Opening and closing placeholder markers in snippet text.
pub const MARKER_OPEN: &str = "<code>";
pub const MARKER_CLOSE: &str = "</code>";
