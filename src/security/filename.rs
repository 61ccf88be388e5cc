//! Filename sanitization for staged uploads.
//!
//! Turns an untrusted relative filename into a [`RelativeFilename`]: forward
//! slashes only, no leading or trailing slash, no `..`, no null byte, no
//! hidden directories, nothing matching a secret pattern.

use std::fmt;

use serde::Serialize;
use tracing::error;

use super::error::ValidationError;
use super::ignore::IgnorePatterns;
use super::reserved::has_reserved_stem;
use crate::constants::{ALLOWED_DOTFILES, MAX_FILENAME_LEN};

/// Substrings rejected anywhere in a filename.
pub const FORBIDDEN_PATTERNS: &[&str] = &["..", "\0", "~", ":", "*", "?", "\"", "<", ">", "|"];

/// A sanitized, slash-separated relative filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RelativeFilename(String);

impl RelativeFilename {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, in order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The final segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl AsRef<str> for RelativeFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativeFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_leading_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn is_filename_char(c: char) -> bool {
    is_leading_char(c) || c == '/'
}

/// `[A-Za-z0-9._-][A-Za-z0-9._/-]{0,254}`
fn matches_filename_format(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(is_leading_char)
        && chars.all(is_filename_char)
        && value.len() <= MAX_FILENAME_LEN
}

/// Sanitize an untrusted relative filename.
///
/// Steps, each short-circuiting:
/// 1. Reject empty input, trim whitespace
/// 2. Convert `\` to `/`, strip leading/trailing slashes
/// 3. Reject `..`, null bytes and `~ : * ? " < > |` (security)
/// 4. Enforce the filename charset and length (format)
/// 5. Per component: no empty segment, no reserved device name (security),
///    no hidden directory outside [`ALLOWED_DOTFILES`] (format)
/// 6. Reject anything matching `ignore` (format)
///
/// The result is a fixed point: sanitizing it again returns it unchanged.
///
/// # Errors
///
/// Returns the [`ValidationError`] for the first rule violated.
///
/// # Examples
///
/// ```
/// use snap_staging::security::{IgnorePatterns, sanitize_filename};
///
/// let ignore = IgnorePatterns::default();
/// let name = sanitize_filename("\\src\\utils.py", &ignore).unwrap();
/// assert_eq!(name.as_str(), "src/utils.py");
///
/// assert!(sanitize_filename("../../etc/passwd", &ignore).unwrap_err().is_security());
/// assert!(sanitize_filename("keys/id_rsa", &ignore).is_err());
/// ```
pub fn sanitize_filename(
    raw: &str,
    ignore: &IgnorePatterns,
) -> Result<RelativeFilename, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required { field: "filename" });
    }

    let normalized = raw.trim().replace('\\', "/");
    let filename = normalized.trim_matches('/');

    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if let Some(&pattern) = FORBIDDEN_PATTERNS.iter().find(|p| filename.contains(**p)) {
        error!(
            security_event = "path_traversal_attempt",
            filename = %filename.escape_debug(),
            pattern = %pattern.escape_debug(),
            reason = "forbidden_pattern",
            "Blocked filename with forbidden pattern"
        );
        return Err(ValidationError::ForbiddenPattern { pattern });
    }

    if !matches_filename_format(filename) {
        return Err(ValidationError::FilenameFormat {
            value: filename.to_string(),
        });
    }

    for part in filename.split('/') {
        if part.is_empty() {
            return Err(ValidationError::EmptyComponent);
        }

        if has_reserved_stem(part) {
            error!(
                security_event = "path_traversal_attempt",
                filename = %filename,
                component = %part,
                reason = "reserved_device_name",
                "Blocked filename with reserved device name"
            );
            return Err(ValidationError::ReservedName {
                component: part.to_string(),
            });
        }

        if let Some(rest) = part.strip_prefix('.')
            && !rest.contains('.')
            && !ALLOWED_DOTFILES.contains(&part)
        {
            return Err(ValidationError::HiddenComponent {
                component: part.to_string(),
            });
        }
    }

    if let Some(pattern) = ignore.find_match(filename) {
        return Err(ValidationError::IgnoredPattern {
            value: filename.to_string(),
            pattern: pattern.to_string(),
        });
    }

    Ok(RelativeFilename(filename.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ErrorKind;

    fn sanitize(raw: &str) -> Result<RelativeFilename, ValidationError> {
        sanitize_filename(raw, &IgnorePatterns::default())
    }

    // =========================================================================
    // NORMALIZATION
    // =========================================================================

    #[test]
    fn test_accepts_plain_names() {
        assert_eq!(sanitize("main.py").unwrap().as_str(), "main.py");
        assert_eq!(sanitize("src/utils.py").unwrap().as_str(), "src/utils.py");
        assert_eq!(sanitize("_build-1/a.b.c").unwrap().as_str(), "_build-1/a.b.c");
    }

    #[test]
    fn test_normalizes_separators_and_slashes() {
        assert_eq!(sanitize("src\\lib\\mod.rs").unwrap().as_str(), "src/lib/mod.rs");
        assert_eq!(sanitize("/src/main.rs/").unwrap().as_str(), "src/main.rs");
        assert_eq!(sanitize("  main.py  ").unwrap().as_str(), "main.py");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(
            sanitize(""),
            Err(ValidationError::Required { field: "filename" })
        );
        assert_eq!(sanitize("///"), Err(ValidationError::EmptyFilename));
        assert_eq!(sanitize("\\\\"), Err(ValidationError::EmptyFilename));
    }

    #[test]
    fn test_file_name_accessor() {
        let name = sanitize("src/pkg/mod.py").unwrap();
        assert_eq!(name.file_name(), "mod.py");
        assert_eq!(name.components().collect::<Vec<_>>(), ["src", "pkg", "mod.py"]);
    }

    // =========================================================================
    // FORBIDDEN PATTERNS (SECURITY)
    // =========================================================================

    #[test]
    fn test_traversal_rejected_as_security() {
        for attack in [
            "../../etc/passwd",
            "a/../../b",
            "..\\..\\windows\\system32\\x",
            "..",
            "src/..",
        ] {
            let err = sanitize(attack).unwrap_err();
            assert_eq!(
                err,
                ValidationError::ForbiddenPattern { pattern: ".." },
                "{attack}"
            );
            assert_eq!(err.kind(), ErrorKind::Security);
        }
    }

    #[test]
    fn test_metacharacters_rejected() {
        for (input, pattern) in [
            ("a\0b", "\0"),
            ("~/x", "~"),
            ("C:/x", ":"),
            ("file.txt:stream", ":"),
            ("*.py", "*"),
            ("a?.py", "?"),
            ("a\".py", "\""),
            ("<a>.py", "<"),
            ("a>.py", ">"),
            ("a|b", "|"),
        ] {
            assert_eq!(
                sanitize(input),
                Err(ValidationError::ForbiddenPattern { pattern }),
                "{input:?}"
            );
        }
    }

    // =========================================================================
    // FORMAT
    // =========================================================================

    #[test]
    fn test_charset_rejected_as_format() {
        for bad in ["a b.py", "ü.py", "a$b", "a#b", "a\tb"] {
            let err = sanitize(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::FilenameFormat { .. }),
                "{bad:?}: {err:?}"
            );
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn test_max_length() {
        let max = format!("{}.py", "a".repeat(MAX_FILENAME_LEN - 3));
        assert_eq!(sanitize(&max).unwrap().as_str().len(), MAX_FILENAME_LEN);

        let too_long = format!("{}.py", "a".repeat(MAX_FILENAME_LEN - 2));
        assert!(matches!(
            sanitize(&too_long),
            Err(ValidationError::FilenameFormat { .. })
        ));
    }

    #[test]
    fn test_empty_component() {
        assert_eq!(sanitize("src//main.py"), Err(ValidationError::EmptyComponent));
    }

    // =========================================================================
    // COMPONENT RULES
    // =========================================================================

    #[test]
    fn test_reserved_names_rejected_as_security() {
        for bad in ["con", "CON", "COM1.txt", "src/nul", "lpt3.log", "docs/Aux.md"] {
            let err = sanitize(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::ReservedName { .. }),
                "{bad}: {err:?}"
            );
            assert!(err.is_security());
        }
        assert!(sanitize("console.py").is_ok());
        assert!(sanitize("com10.txt").is_ok());
    }

    #[test]
    fn test_hidden_directories_rejected() {
        for bad in [".git/config", ".venv", "src/.cache/x.py", ".env"] {
            assert!(
                matches!(sanitize(bad), Err(ValidationError::HiddenComponent { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_allowlisted_dotfiles() {
        assert!(sanitize(".gitignore").is_ok());
        assert!(sanitize("sub/.gitattributes").is_ok());
        // A further dot makes it a file, not a hidden directory
        assert!(sanitize(".eslintrc.json").is_ok());
    }

    // =========================================================================
    // IGNORE PATTERNS
    // =========================================================================

    #[test]
    fn test_secret_files_rejected() {
        for bad in ["id_rsa", "secret.pem", "keys/id_rsa", "deploy/server.key", ".env.local"] {
            let err = sanitize(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::IgnoredPattern { .. }),
                "{bad}: {err:?}"
            );
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn test_ignore_error_names_pattern() {
        let err = sanitize("secret.pem").unwrap_err();
        assert_eq!(
            err,
            ValidationError::IgnoredPattern {
                value: "secret.pem".into(),
                pattern: "*.pem".into(),
            }
        );
    }

    #[test]
    fn test_custom_ignore_set() {
        let ignore = IgnorePatterns::new(["vendor", "build/*"]).unwrap();
        assert!(sanitize_filename("vendor/lib.py", &ignore).is_err());
        assert!(sanitize_filename("build/out.js", &ignore).is_err());
        // Default set is not consulted
        assert!(sanitize_filename("id_rsa", &ignore).is_ok());
    }

    // =========================================================================
    // IDEMPOTENCE
    // =========================================================================

    #[test]
    fn test_idempotent() {
        for raw in ["main.py", "\\src\\a.py\\", " /x/y/z.txt ", ".gitignore"] {
            let once = sanitize(raw).unwrap();
            let twice = sanitize(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }
}
