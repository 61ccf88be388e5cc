//! Shared limits and defaults for the staging guard.

/// Minimum length of a project identifier.
pub const PROJECT_ID_MIN_LEN: usize = 3;

/// Maximum length of a project identifier.
pub const PROJECT_ID_MAX_LEN: usize = 64;

/// Maximum length of a vendor identifier (in characters).
pub const VENDOR_ID_MAX_LEN: usize = 64;

/// Maximum length of a relative filename, including subdirectories.
pub const MAX_FILENAME_LEN: usize = 255;

/// The only remote host repositories may be fetched from.
pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

/// Dotfiles accepted even though they have no extension.
///
/// Every other component that starts with `.` and contains no further `.`
/// is treated as a hidden directory and rejected.
pub const ALLOWED_DOTFILES: &[&str] = &[".gitignore", ".gitattributes"];

/// Default upload size limit (2 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Upload sizes above this produce a configuration warning.
pub const MAX_FILE_BYTES_WARN_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "snap.toml";

/// Prefix used when reporting staging locations back to callers.
///
/// Callers never see the absolute staging root.
pub const STAGING_DISPLAY_PREFIX: &str = "staging";
