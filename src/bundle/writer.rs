//! Builds `.app` bundles from validated manifests.
//!
//! The bundle contents are staged in a temporary directory first, then packed
//! into a deflate zip behind the magic header. The staging directory is
//! removed on every exit path.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::format::{entry_name, is_reserved, is_root_folder, BundleError, BUNDLE_EXTENSION, CODE_ENTRY, MAGIC, SETTINGS_ENTRY};
use crate::core::validate::ValidManifest;
use crate::util::diagnostic::{FiveError, FiveResult};
use crate::util::fs;

/// Writer for a single bundle.
pub struct BundleBuilder<'a> {
    manifest: &'a ValidManifest<'a>,
    base_dir: PathBuf,
}

impl<'a> BundleBuilder<'a> {
    /// Create a builder. Declared file sources resolve against the current
    /// directory until [`BundleBuilder::base_dir`] is set.
    pub fn new(manifest: &'a ValidManifest<'a>) -> Self {
        BundleBuilder {
            manifest,
            base_dir: PathBuf::from("."),
        }
    }

    /// Directory that `files.add("file", src, ...)` source paths are relative to.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// File name of the bundle, `<project.name>.app`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.manifest.name(), BUNDLE_EXTENSION)
    }

    /// Write the bundle into `out_dir`, returning its path.
    pub fn write_to(&self, out_dir: &Path) -> FiveResult<PathBuf> {
        let bytes = self.to_bytes()?;
        let path = out_dir.join(self.file_name());
        fs::write_atomic(&path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "bundle written");
        Ok(path)
    }

    /// Encode the complete bundle: magic header followed by the zip archive.
    pub fn to_bytes(&self) -> FiveResult<Vec<u8>> {
        let staging = tempfile::Builder::new()
            .prefix("five-build-")
            .tempdir()
            .map_err(|e| FiveError::io("create staging directory in", &std::env::temp_dir(), e))?;

        self.stage(staging.path())?;
        let archive = pack_dir(staging.path())?;

        let mut bytes = Vec::with_capacity(MAGIC.len() + archive.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&archive);
        Ok(bytes)
    }

    /// Lay out the bundle contents under `root`.
    fn stage(&self, root: &Path) -> FiveResult<()> {
        let manifest = self.manifest.manifest();

        let settings = serde_json::to_string_pretty(self.manifest.settings())
            .map_err(BundleError::EncodeSettings)?;
        fs::write_string(&root.join(SETTINGS_ENTRY), &settings)?;
        fs::write_string(&root.join(CODE_ENTRY), &manifest.payload)?;

        for folder in &manifest.files.folders {
            if is_root_folder(folder) {
                debug!(folder = %folder, "folder is the bundle root, skipped");
                continue;
            }
            let name = checked_entry(folder)?;
            fs::ensure_dir(&root.join(&name))?;
        }

        // A later mapping to the same destination replaces the earlier one.
        let mut files = BTreeMap::new();
        for mapping in &manifest.files.files {
            files.insert(checked_entry(&mapping.dest)?, &mapping.source);
        }
        for (dest, source) in files {
            let src = self.base_dir.join(source);
            let copied = fs::copy_file(&src, &root.join(&dest))?;
            debug!(source = %src.display(), dest = %dest, bytes = copied, "file staged");
        }

        Ok(())
    }
}

fn checked_entry(declared: &str) -> Result<String, BundleError> {
    let name = entry_name(declared)?;
    if is_reserved(&name) {
        return Err(BundleError::ReservedEntry { path: name });
    }
    Ok(name)
}

/// Zip every file and directory under `root`, using `/`-separated names.
fn pack_dir(root: &Path) -> FiveResult<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            FiveError::io("read", &path, io::Error::from(e))
        })?;

        let name = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)
                .map_err(BundleError::Archive)?;
        } else {
            zip.start_file(name, options).map_err(BundleError::Archive)?;
            let mut file =
                File::open(entry.path()).map_err(|e| FiveError::io("read", entry.path(), e))?;
            io::copy(&mut file, &mut zip).map_err(|e| FiveError::io("read", entry.path(), e))?;
        }
    }

    let cursor = zip.finish().map_err(BundleError::Archive)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use tempfile::TempDir;
    use zip::ZipArchive;

    use crate::core::{parse_manifest, validate};
    use crate::test_support::ManifestFixture;

    fn archive(bytes: &[u8]) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes[MAGIC.len()..].to_vec())).unwrap()
    }

    fn entry_text(zip: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_bundle_layout() {
        let manifest = parse_manifest(&ManifestFixture::hello().source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let bytes = BundleBuilder::new(&valid).to_bytes().unwrap();
        assert_eq!(&bytes[..8], b"LOVE-APP");

        let mut zip = archive(&bytes);
        assert_eq!(entry_text(&mut zip, "code.five-code"), "print hello");

        let settings: serde_json::Value =
            serde_json::from_str(&entry_text(&mut zip, "settings.json")).unwrap();
        assert_eq!(settings["project"], "hi");
        assert_eq!(settings["platform"], "all");
        assert_eq!(settings["run"], "echo");
        assert_eq!(settings["version"], "1.0");
    }

    #[test]
    fn test_entries_are_deflated() {
        let manifest = parse_manifest(&ManifestFixture::hello().source()).unwrap();
        let valid = validate(&manifest).unwrap();
        let bytes = BundleBuilder::new(&valid).to_bytes().unwrap();

        let mut zip = archive(&bytes);
        let entry = zip.by_name("settings.json").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_folders_and_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("logo.png"), [1u8, 2, 3, 255]).unwrap();

        let fixture = ManifestFixture::hello()
            .folder("empty")
            .folder("empty")
            .file("logo.png", "assets/logo.png");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let bytes = BundleBuilder::new(&valid)
            .base_dir(tmp.path())
            .to_bytes()
            .unwrap();
        let mut zip = archive(&bytes);

        assert!(zip.by_name("empty/").unwrap().is_dir());
        let mut logo = Vec::new();
        zip.by_name("assets/logo.png")
            .unwrap()
            .read_to_end(&mut logo)
            .unwrap();
        assert_eq!(logo, vec![1u8, 2, 3, 255]);
    }

    #[test]
    fn test_later_mapping_wins() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "first").unwrap();
        std::fs::write(tmp.path().join("b.txt"), "second").unwrap();

        let fixture = ManifestFixture::hello()
            .file("a.txt", "data/out.txt")
            .file("b.txt", "./data/out.txt");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let bytes = BundleBuilder::new(&valid)
            .base_dir(tmp.path())
            .to_bytes()
            .unwrap();
        assert_eq!(entry_text(&mut archive(&bytes), "data/out.txt"), "second");
    }

    #[test]
    fn test_missing_source_file() {
        let tmp = TempDir::new().unwrap();
        let fixture = ManifestFixture::hello().file("missing.txt", "missing.txt");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let err = BundleBuilder::new(&valid)
            .base_dir(tmp.path())
            .to_bytes()
            .unwrap_err();
        assert!(err.message().contains("missing.txt not found"));
    }

    #[test]
    fn test_reserved_destination() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("evil.json"), "{}").unwrap();

        let fixture = ManifestFixture::hello().file("evil.json", "settings.json");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let err = BundleBuilder::new(&valid)
            .base_dir(tmp.path())
            .to_bytes()
            .unwrap_err();
        assert!(matches!(
            err,
            FiveError::Bundle(BundleError::ReservedEntry { .. })
        ));
    }

    #[test]
    fn test_escaping_destination() {
        let fixture = ManifestFixture::hello().folder("../outside");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let err = BundleBuilder::new(&valid).to_bytes().unwrap_err();
        assert_eq!(err.message(), "invalid bundle path `../outside`");
    }

    #[test]
    fn test_root_folder_is_a_no_op() {
        let fixture = ManifestFixture::hello().folder("").folder(".").folder("logs");
        let manifest = parse_manifest(&fixture.source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let bytes = BundleBuilder::new(&valid).to_bytes().unwrap();
        let zip = archive(&bytes);
        let mut names: Vec<_> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["code.five-code", "logs/", "settings.json"]);
    }

    #[test]
    fn test_write_to_names_bundle_after_project() {
        let out = TempDir::new().unwrap();
        let manifest = parse_manifest(&ManifestFixture::hello().source()).unwrap();
        let valid = validate(&manifest).unwrap();

        let path = BundleBuilder::new(&valid).write_to(out.path()).unwrap();
        assert_eq!(path, out.path().join("hi.app"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"LOVE-APP"));
    }
}
