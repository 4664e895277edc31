//! Implementation of `five compile`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bundle::{BundleBuilder, BUNDLE_EXTENSION, SOURCE_EXTENSION};
use crate::core::manifest::is_source_path;
use crate::core::{parse_manifest, validate};
use crate::util::diagnostic::{FiveError, FiveResult};
use crate::util::fs;
use crate::util::shell::{Shell, Status};

/// Options for compiling a manifest.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// The `.five` manifest to compile
    pub source: PathBuf,

    /// Directory the bundle is written to
    pub out_dir: PathBuf,
}

/// Result of a successful compile.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Project name declared by the manifest
    pub name: String,

    /// Path of the written `.app` bundle
    pub bundle_path: PathBuf,
}

/// Compile a `.five` manifest into a `.app` bundle.
pub fn compile(opts: &CompileOptions, shell: &Shell) -> FiveResult<CompileResult> {
    if !is_source_path(&opts.source) {
        return Err(FiveError::WrongExtension {
            expected: SOURCE_EXTENSION,
        });
    }

    let source = fs::read_to_string(&opts.source)?;

    shell.status(
        Status::Compiling,
        format!(
            "{} to {}.{}",
            opts.source.display(),
            source_stem(&opts.source),
            BUNDLE_EXTENSION
        ),
    );

    let manifest = parse_manifest(&source)?;
    let valid = validate(&manifest)?;

    if manifest.payload.is_empty() {
        shell.warn(format!(
            "function \"main\" in {} has an empty body",
            opts.source.display()
        ));
    }

    let base_dir = match opts.source.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    debug!(base_dir = %base_dir.display(), "resolving declared files");

    let bundle_path = BundleBuilder::new(&valid)
        .base_dir(base_dir)
        .write_to(&opts.out_dir)?;

    Ok(CompileResult {
        name: valid.name().to_string(),
        bundle_path,
    })
}

fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
