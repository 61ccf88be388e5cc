//! Secret and credential filename patterns.
//!
//! The pattern set is owned by whoever configures the ingestion side; the
//! guard only matches against it. Patterns use shell-glob semantics: `*`
//! also matches `/`, and matching is case-sensitive.

use glob::{Pattern, PatternError};

/// Patterns used when the configuration does not supply its own.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Environment files
    ".env",
    ".env.*",
    "*.env",
    // Private keys and keystores
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.jks",
    "*.keystore",
    "*.kdbx",
    "id_rsa",
    "id_rsa.*",
    "id_dsa",
    "id_dsa.*",
    "id_ecdsa",
    "id_ecdsa.*",
    "id_ed25519",
    "id_ed25519.*",
    // Credential stores
    "credentials",
    "credentials.json",
    "secrets.json",
    "secrets.yaml",
    "secrets.yml",
    "secrets.toml",
    "*.secret",
    ".netrc",
    ".npmrc",
    ".pypirc",
    ".htpasswd",
    ".aws",
    ".ssh",
    // VCS metadata
    ".git",
    ".svn",
    ".hg",
];

/// A compiled set of ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    /// Compiles a pattern set.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] if any pattern is not a valid glob.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// An empty set. Nothing is ignored.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first pattern matching `filename`, if any.
    ///
    /// Each pattern is tried against every `/`-separated segment, the full
    /// relative path, and the final segment, since a pattern may target a
    /// directory (`.ssh`), a path (`config/*.pem`), or a bare name (`id_rsa`).
    #[must_use]
    pub fn find_match(&self, filename: &str) -> Option<&str> {
        let name = filename.rsplit('/').next().unwrap_or(filename);

        self.patterns
            .iter()
            .find(|pattern| {
                filename.split('/').any(|part| pattern.matches(part))
                    || pattern.matches(filename)
                    || pattern.matches(name)
            })
            .map(Pattern::as_str)
    }

    #[must_use]
    pub fn is_match(&self, filename: &str) -> bool {
        self.find_match(filename).is_some()
    }
}

impl Default for IgnorePatterns {
    /// Compiles [`DEFAULT_IGNORE_PATTERNS`].
    fn default() -> Self {
        Self {
            patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_all_compile() {
        assert_eq!(
            IgnorePatterns::default().len(),
            DEFAULT_IGNORE_PATTERNS.len()
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(IgnorePatterns::new(["[unclosed"]).is_err());
    }

    #[test]
    fn test_bare_filename_pattern() {
        let patterns = IgnorePatterns::new(["id_rsa"]).unwrap();
        assert_eq!(patterns.find_match("id_rsa"), Some("id_rsa"));
        assert_eq!(patterns.find_match("keys/id_rsa"), Some("id_rsa"));
        assert!(!patterns.is_match("id_rsa_helper.py"));
    }

    #[test]
    fn test_directory_segment_pattern() {
        let patterns = IgnorePatterns::new(["secrets"]).unwrap();
        assert!(patterns.is_match("secrets/db.yaml"));
        assert!(patterns.is_match("deploy/secrets/db.yaml"));
        assert!(!patterns.is_match("deploy/secrets_doc.md"));
    }

    #[test]
    fn test_full_path_pattern() {
        let patterns = IgnorePatterns::new(["config/prod/*"]).unwrap();
        assert!(patterns.is_match("config/prod/settings.yaml"));
        assert!(!patterns.is_match("settings.yaml"));
        assert!(!patterns.is_match("config/dev/settings.yaml"));
    }

    #[test]
    fn test_star_crosses_separator() {
        // fnmatch semantics: `*` is not stopped by `/`
        let patterns = IgnorePatterns::new(["config/*.pem"]).unwrap();
        assert!(patterns.is_match("config/nested/server.pem"));
    }

    #[test]
    fn test_default_secret_corpus() {
        let patterns = IgnorePatterns::default();
        for name in [".env", ".env.local", "id_rsa", "secret.pem", "certs/server.key"] {
            assert!(patterns.is_match(name), "Should match {name}");
        }
        for name in ["main.py", "src/utils.py", "README.md", ".gitignore"] {
            assert!(!patterns.is_match(name), "Should not match {name}");
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let patterns = IgnorePatterns::new(["*.pem"]).unwrap();
        assert!(!patterns.is_match("cert.PEM"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        assert!(!IgnorePatterns::empty().is_match(".env"));
    }
}
