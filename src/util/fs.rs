//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::util::diagnostic::{FiveError, FiveResult};

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> FiveResult<String> {
    fs::read_to_string(path).map_err(|e| FiveError::io("read", path, e))
}

/// Read a file's bytes, with nice error messages.
pub fn read(path: &Path) -> FiveResult<Vec<u8>> {
    fs::read(path).map_err(|e| FiveError::io("read", path, e))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> FiveResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| FiveError::io("create directory", path, e))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> FiveResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| FiveError::io("write", path, e))
}

/// Copy a file, creating the destination's parent directories if needed.
pub fn copy_file(src: &Path, dst: &Path) -> FiveResult<u64> {
    if !src.is_file() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "not a file");
        return Err(FiveError::io("copy", src, err));
    }
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).map_err(|e| FiveError::io("copy", src, e))
}

/// Write bytes to `path` through a temporary file in the same directory, so
/// readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> FiveResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FiveError::io("write", path, e))?;
    tmp.write_all(contents)
        .map_err(|e| FiveError::io("write", path, e))?;
    tmp.persist(path)
        .map_err(|e| FiveError::io("write", path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("logo.png");
        fs::write(&src, [0u8, 159, 146, 150]).unwrap();

        let dst = tmp.path().join("out/assets/logo.png");
        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn test_copy_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&tmp.path().join("nope.txt"), &tmp.path().join("x")).unwrap_err();
        assert!(err.message().contains("nope.txt not found"));
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hi.app");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_to_string(Path::new("/definitely/missing/app.five")).unwrap_err();
        assert_eq!(err.message(), "file /definitely/missing/app.five not found");
    }
}
