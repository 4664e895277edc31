//! The `.app` bundle format.
//!
//! A bundle is the 8-byte magic `LOVE-APP` followed by a deflate zip archive
//! holding `settings.json`, `code.five-code` (the payload) and the declared
//! folders and files. Entries are looked up by name, never by position.

pub mod dispatch;
pub mod format;
pub mod reader;
pub mod writer;

pub use dispatch::{DispatchCommand, DispatchError, DispatchOutput, Executor, SystemExecutor};
pub use format::{
    AppSettings, BundleError, BUNDLE_EXTENSION, CODE_ENTRY, MAGIC, SETTINGS_ENTRY,
    SOURCE_EXTENSION,
};
pub use reader::LoadedBundle;
pub use writer::BundleBuilder;
