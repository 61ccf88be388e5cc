//! Fuzz target for the full staging path pipeline.
//!
//! This fuzzer tests that:
//! 1. No input causes a panic
//! 2. Every accepted path lies inside the project's resolved directory
//! 3. A neighbouring tenant's directory is never reachable
//!
//! Run with: `cargo +nightly fuzz run fuzz_resolve_staging_path`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snap_staging::security::{IgnorePatterns, StagingGuard};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    guard: StagingGuard,
    root: PathBuf,
}

static FIXTURE: LazyLock<Fixture> = LazyLock::new(|| {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().canonicalize().expect("canonical root");
    fs::create_dir_all(root.join("tenant-a/src")).expect("tenant-a");
    fs::create_dir_all(root.join("tenant-b")).expect("tenant-b");
    fs::write(root.join("tenant-b/secret.txt"), "b").expect("secret");

    Fixture {
        guard: StagingGuard::new(&root, IgnorePatterns::default()),
        root,
        _dir: dir,
    }
});

#[derive(Arbitrary, Debug)]
struct PathInput {
    project_id: String,
    filename: String,
}

fuzz_target!(|data: PathInput| {
    let fixture = &*FIXTURE;

    if let Ok(path) = fixture.guard.safe_path(&data.project_id, &data.filename) {
        let project_dir = fixture.root.join(data.project_id.trim());
        assert!(
            path.as_path().starts_with(&project_dir),
            "{:?} escaped {:?}",
            path.as_path(),
            project_dir
        );

        if data.project_id.trim() != "tenant-b" {
            assert!(
                !path.as_path().starts_with(fixture.root.join("tenant-b")),
                "cross-tenant path {:?}",
                path.as_path()
            );
        }
    }
});
