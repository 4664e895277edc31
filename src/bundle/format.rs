//! Constants and records shared by the bundle writer and reader.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::platform::Platform;

/// Marker written before the zip archive.
pub const MAGIC: &[u8; 8] = b"LOVE-APP";

/// Archive entry holding the [`AppSettings`] record.
pub const SETTINGS_ENTRY: &str = "settings.json";

/// Archive entry holding the payload.
pub const CODE_ENTRY: &str = "code.five-code";

/// Extension of manifest sources.
pub const SOURCE_EXTENSION: &str = "five";

/// Extension of built bundles.
pub const BUNDLE_EXTENSION: &str = "app";

/// The `settings.json` record stored in every bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Project name.
    pub project: String,
    /// Platform the bundle may run on; `all` when absent.
    #[serde(default)]
    pub platform: Platform,
    /// Interpreter command line the payload is handed to.
    pub run: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

/// Error reading or writing the bundle container.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("invalid bundle header")]
    InvalidHeader,

    #[error("corrupted bundle")]
    Corrupted(#[source] zip::result::ZipError),

    #[error("corrupted bundle configuration: missing settings.json")]
    MissingSettings,

    #[error("corrupted bundle configuration")]
    CorruptedSettings(#[source] serde_json::Error),

    #[error("invalid bundle path `{path}`")]
    InvalidEntryPath { path: String },

    #[error("`{path}` is reserved for the bundle's own metadata")]
    ReservedEntry { path: String },

    #[error("failed to write bundle archive")]
    Archive(#[source] zip::result::ZipError),

    #[error("failed to encode settings.json")]
    EncodeSettings(#[source] serde_json::Error),
}

/// Normalize a declared bundle path to a relative, `/`-separated entry name.
///
/// Absolute paths and `..` components are rejected so nothing can be placed
/// outside the bundle root.
pub fn entry_name(declared: &str) -> Result<String, BundleError> {
    let invalid = || BundleError::InvalidEntryPath {
        path: declared.to_string(),
    };

    let unified = declared.replace('\\', "/");
    if unified.starts_with('/') || unified.contains(':') {
        return Err(invalid());
    }

    let mut parts = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(invalid()),
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}

/// Whether a declared folder names the bundle root itself (`""`, `"."`,
/// `"./"`). Creating it is a no-op.
pub fn is_root_folder(declared: &str) -> bool {
    let unified = declared.replace('\\', "/");
    !unified.starts_with('/') && unified.split('/').all(|part| part.is_empty() || part == ".")
}

/// Whether `name` collides with one of the bundle's metadata entries.
pub fn is_reserved(name: &str) -> bool {
    name == SETTINGS_ENTRY || name == CODE_ENTRY
}
