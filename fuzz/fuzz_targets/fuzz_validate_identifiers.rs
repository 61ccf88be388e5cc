//! Fuzz target for the identifier validators.
//!
//! This fuzzer tests that:
//! 1. No input causes a panic
//! 2. Accepted project ids are safe directory names
//! 3. Accepted repository URLs stay on the trusted host
//!
//! Run with: `cargo +nightly fuzz run fuzz_validate_identifiers`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snap_staging::security::{
    is_reserved_device_name, validate_project_id, validate_repo_url, validate_snapshot_type,
    validate_vendor_id,
};

#[derive(Arbitrary, Debug)]
struct IdentifierInput {
    project_id: String,
    vendor_id: String,
    repo_url: String,
    snapshot_type: String,
}

fuzz_target!(|data: IdentifierInput| {
    if let Ok(id) = validate_project_id(&data.project_id) {
        let s = id.as_str();
        assert!((3..=64).contains(&s.len()), "bad length: {s:?}");
        assert!(
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "bad character in {s:?}"
        );
        assert!(!s.starts_with('-'), "leading hyphen: {s:?}");
        assert!(!is_reserved_device_name(s), "reserved name: {s:?}");
    }

    if let Ok(vendor) = validate_vendor_id(&data.vendor_id) {
        assert_eq!(vendor.as_str(), vendor.as_str().trim());
    }

    if let Ok(url) = validate_repo_url(&data.repo_url) {
        assert!(url.as_str().starts_with("https://github.com/"));
        assert!(!url.owner().is_empty() && !url.repo().is_empty());
    }

    if let Ok(kind) = validate_snapshot_type(&data.snapshot_type) {
        assert_eq!(kind.as_str(), data.snapshot_type.trim().to_lowercase());
    }
});
