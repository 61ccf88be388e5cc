//! Reserved device names.
//!
//! Project identifiers become directory names and filename components become
//! file or directory names, so both are checked against the DOS device set
//! on every platform: staged trees are routinely copied to Windows hosts.
//!
//! # Examples
//!
//! ```
//! use snap_staging::security::{is_reserved_device_name, has_reserved_stem};
//!
//! assert!(is_reserved_device_name("NUL"));
//! assert!(!is_reserved_device_name("nul.txt"));
//!
//! // Windows treats `COM1.txt` as the COM1 device.
//! assert!(has_reserved_stem("COM1.txt"));
//! assert!(!has_reserved_stem("CONSOLE.txt"));
//! ```

/// Reserved device names, lowercase.
///
/// - `con`, `prn`, `aux`, `nul`
/// - `com1` through `com9`
/// - `lpt1` through `lpt9`
pub const RESERVED_DEVICE_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Case-insensitive exact match against [`RESERVED_DEVICE_NAMES`].
#[must_use]
pub fn is_reserved_device_name(name: &str) -> bool {
    RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Like [`is_reserved_device_name`], but compares the part before the first `.`.
#[must_use]
pub fn has_reserved_stem(component: &str) -> bool {
    let stem = component.split('.').next().unwrap_or(component);
    is_reserved_device_name(stem)
}
