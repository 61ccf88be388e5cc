//! Fuzz target for `sanitize_filename` - filename normalization.
//!
//! This fuzzer tests that:
//! 1. No input causes a panic
//! 2. Accepted outputs contain no traversal, null byte, or backslash
//! 3. Accepted outputs are a fixed point of the sanitizer
//! 4. Injected traversal is always rejected as a security error
//!
//! Run with: `cargo +nightly fuzz run fuzz_sanitize_filename`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snap_staging::security::{IgnorePatterns, sanitize_filename};
use std::sync::LazyLock;

static IGNORE: LazyLock<IgnorePatterns> = LazyLock::new(IgnorePatterns::default);

#[derive(Arbitrary, Debug)]
struct FilenameInput {
    name: String,
    use_backslashes: bool,
    inject_traversal: bool,
    traversal_depth: u8,
}

impl FilenameInput {
    fn build(&self) -> String {
        let mut result = self.name.clone();

        if self.use_backslashes {
            result = result.replace('/', "\\");
        }

        if self.inject_traversal {
            let depth = usize::from(self.traversal_depth).max(1);
            result = format!("{}{result}", "../".repeat(depth));
        }

        result
    }
}

fuzz_target!(|data: FilenameInput| {
    let raw = data.build();

    match sanitize_filename(&raw, &IGNORE) {
        Ok(name) => {
            let s = name.as_str();
            assert!(!s.is_empty(), "empty output for {raw:?}");
            assert!(!s.contains(".."), "traversal in output {s:?} from {raw:?}");
            assert!(!s.contains('\0'), "null byte in output {s:?}");
            assert!(!s.contains('\\'), "backslash in output {s:?}");
            assert!(!s.starts_with('/'), "absolute output {s:?}");
            assert!(s.len() <= 255, "overlong output from {raw:?}");

            let again = sanitize_filename(s, &IGNORE).expect("accepted name must be re-accepted");
            assert_eq!(again, name, "sanitizer is not idempotent for {raw:?}");
        },
        Err(e) => {
            if data.inject_traversal {
                assert!(e.is_security(), "traversal {raw:?} rejected as {e:?}");
            }
        },
    }
});
