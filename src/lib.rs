//! Staging-area guard for the SNAP code-analysis service.
//!
//! Tenants upload source files into a shared staging root before analysis.
//! This crate turns their untrusted identifiers and filenames into paths
//! that provably stay inside `<root>/<project_id>/`, and runs the staging
//! operations (upload, info, clear, delete) on top of those paths.
//!
//! - [`security`] - identifier validation, filename sanitizing, the path guard
//! - [`staging`] - per-project staging operations
//! - [`request`] - validated requests for the fetcher and query engine
//! - [`config`] - `snap.toml` loading and validation
//! - [`audit`] - audit events on the `audit` tracing target

pub mod audit;
pub mod config;
pub mod constants;
pub mod logging;
pub mod request;
pub mod security;
pub mod staging;
