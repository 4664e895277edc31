//! Five - a manifest compiler and runner for `.app` bundles
//!
//! This crate provides the library behind the `five` binary: the `.five`
//! manifest front end, the bundle format, and the compile/run operations.

pub mod bundle;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Five unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use bundle::{AppSettings, BundleBuilder, LoadedBundle};
pub use core::{parse_manifest, validate, Manifest, Platform, ValidManifest};
pub use util::context::GlobalContext;
pub use util::diagnostic::{FiveError, FiveResult};
