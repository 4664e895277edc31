//! Loads `.app` bundles into a scratch workspace.
//!
//! Loading checks the magic header before anything touches the disk, then
//! extracts the archive into a fresh temporary directory owned by the returned
//! [`LoadedBundle`]. The directory is deleted when the bundle is dropped, so
//! every exit path releases it.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use super::format::{AppSettings, BundleError, CODE_ENTRY, MAGIC, SETTINGS_ENTRY};
use crate::util::diagnostic::{FiveError, FiveResult};
use crate::util::fs;

/// A bundle extracted into its scratch workspace.
#[derive(Debug)]
pub struct LoadedBundle {
    settings: AppSettings,
    workspace: TempDir,
}

/// Split the magic header off a bundle, returning the archive bytes.
pub fn split_header(bytes: &[u8]) -> Result<&[u8], BundleError> {
    match bytes.strip_prefix(MAGIC.as_slice()) {
        Some(archive) => Ok(archive),
        None => Err(BundleError::InvalidHeader),
    }
}

impl LoadedBundle {
    /// Load the bundle at `path`, extracting it under the system temp dir.
    pub fn open(path: &Path) -> FiveResult<Self> {
        Self::open_in(path, &std::env::temp_dir())
    }

    /// Load the bundle at `path`, extracting it under `scratch_parent`.
    pub fn open_in(path: &Path, scratch_parent: &Path) -> FiveResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes, scratch_parent)
    }

    /// Load a bundle from memory.
    pub fn from_bytes(bytes: &[u8], scratch_parent: &Path) -> FiveResult<Self> {
        let archive = split_header(bytes)?;
        let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(BundleError::Corrupted)?;

        fs::ensure_dir(scratch_parent)?;
        let workspace = tempfile::Builder::new()
            .prefix("five-run-")
            .tempdir_in(scratch_parent)
            .map_err(|e| FiveError::io("create scratch directory in", scratch_parent, e))?;
        debug!(path = %workspace.path().display(), entries = zip.len(), "extracting bundle");

        zip.extract(workspace.path())
            .map_err(BundleError::Corrupted)?;

        let settings_path = workspace.path().join(SETTINGS_ENTRY);
        if !settings_path.is_file() {
            return Err(BundleError::MissingSettings.into());
        }
        let raw = fs::read(&settings_path)?;
        let settings = serde_json::from_slice(&raw).map_err(BundleError::CorruptedSettings)?;

        Ok(LoadedBundle {
            settings,
            workspace,
        })
    }

    /// The bundle's `settings.json` record.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Root of the scratch workspace.
    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    /// Path of the extracted payload.
    pub fn code_path(&self) -> PathBuf {
        self.root().join(CODE_ENTRY)
    }

    /// Read the extracted payload.
    pub fn read_payload(&self) -> FiveResult<String> {
        fs::read_to_string(&self.code_path())
    }

    /// Remove the scratch workspace, reporting any failure.
    pub fn close(self) -> FiveResult<()> {
        let root = self.workspace.path().to_path_buf();
        self.workspace
            .close()
            .map_err(|e| FiveError::io("remove", &root, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use crate::bundle::BundleBuilder;
    use crate::core::platform::Platform;
    use crate::core::{parse_manifest, validate};
    use crate::test_support::ManifestFixture;

    fn bundle_bytes(fixture: ManifestFixture) -> Vec<u8> {
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();
        BundleBuilder::new(&valid).to_bytes().unwrap()
    }

    /// Bundle with arbitrary entries, bypassing the builder.
    fn raw_bundle(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        let mut bytes = MAGIC.to_vec();
        bytes.extend(zip.finish().unwrap().into_inner());
        bytes
    }

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_round_trip() {
        let scratch = TempDir::new().unwrap();
        let fixture = ManifestFixture::hello()
            .platform("linux")
            .version("2.0")
            .description("round trip")
            .body("line one\n    line two");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();
        let bytes = BundleBuilder::new(&valid).to_bytes().unwrap();

        let bundle = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap();
        assert_eq!(bundle.settings(), valid.settings());
        assert_eq!(bundle.settings().platform, Platform::Linux);
        let payload = bundle.read_payload().unwrap();
        assert_eq!(payload, manifest.payload);
        assert!(payload.starts_with("line one\n"));
        assert!(payload.ends_with("    line two"));
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let scratch = TempDir::new().unwrap();
        let bundle =
            LoadedBundle::from_bytes(&bundle_bytes(ManifestFixture::hello()), scratch.path())
                .unwrap();
        let root = bundle.root().to_path_buf();
        assert!(root.join("code.five-code").is_file());

        drop(bundle);
        assert!(!root.exists());
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_close_removes_scratch() {
        let scratch = TempDir::new().unwrap();
        let bundle =
            LoadedBundle::from_bytes(&bundle_bytes(ManifestFixture::hello()), scratch.path())
                .unwrap();
        bundle.close().unwrap();
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_bad_magic_fails_before_extraction() {
        let scratch = TempDir::new().unwrap();
        let good = bundle_bytes(ManifestFixture::hello());

        for i in 0..MAGIC.len() {
            let mut bytes = good.clone();
            bytes[i] ^= 0x20;
            let err = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap_err();
            assert!(matches!(err, FiveError::Bundle(BundleError::InvalidHeader)));
            assert_eq!(err.message(), "invalid bundle header");
        }
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_short_file() {
        let scratch = TempDir::new().unwrap();
        let err = LoadedBundle::from_bytes(b"LOVE", scratch.path()).unwrap_err();
        assert!(matches!(err, FiveError::Bundle(BundleError::InvalidHeader)));
    }

    #[test]
    fn test_corrupted_archive() {
        let scratch = TempDir::new().unwrap();
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(b"definitely not a zip archive");

        let err = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap_err();
        assert_eq!(err.message(), "corrupted bundle");
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_corrupted_settings() {
        let scratch = TempDir::new().unwrap();
        let bytes = raw_bundle(&[("settings.json", "{not json"), ("code.five-code", "x")]);

        let err = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap_err();
        assert_eq!(err.message(), "corrupted bundle configuration");
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_missing_settings() {
        let scratch = TempDir::new().unwrap();
        let bytes = raw_bundle(&[("code.five-code", "x")]);

        let err = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap_err();
        assert!(matches!(err, FiveError::Bundle(BundleError::MissingSettings)));
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_settings_lookup_is_by_name() {
        let scratch = TempDir::new().unwrap();
        let bytes = raw_bundle(&[
            ("code.five-code", "payload"),
            ("extra/readme.txt", "hello"),
            ("settings.json", r#"{"project": "x", "run": "sh", "platform": "windows"}"#),
        ]);

        let bundle = LoadedBundle::from_bytes(&bytes, scratch.path()).unwrap();
        assert_eq!(bundle.settings().platform, Platform::Windows);
        assert_eq!(bundle.read_payload().unwrap(), "payload");
        assert!(bundle.root().join("extra/readme.txt").is_file());
    }

    #[test]
    fn test_open_missing_bundle() {
        let err = LoadedBundle::open(Path::new("/no/such/dir/hi.app")).unwrap_err();
        assert_eq!(err.message(), "file /no/such/dir/hi.app not found");
    }
}
