//! Checks a parsed manifest before a bundle may be built from it.

use thiserror::Error;

use super::manifest::{Manifest, SHELL_MODULE};
use super::platform::Platform;
use crate::bundle::AppSettings;

/// A violated manifest rule. Only the first violation is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing project.name declaration")]
    MissingName,

    #[error("missing project.platform declaration")]
    MissingPlatform,

    #[error("missing require \"shell\"")]
    MissingShellRequire,

    #[error("missing shell.set configuration")]
    MissingShellSet,

    #[error("missing define class \"shell\"")]
    MissingShellClass,

    #[error("missing function \"main\" inside shell class")]
    MissingMainFunction,

    #[error("platform '{platform}' is not valid. Use: linux, windows, all")]
    InvalidPlatform { platform: String },

    #[error("project name '{name}' cannot be used as a bundle file name")]
    InvalidName { name: String },
}

/// A manifest that passed validation, with its settings record resolved.
#[derive(Debug, Clone)]
pub struct ValidManifest<'a> {
    manifest: &'a Manifest,
    settings: AppSettings,
}

impl<'a> ValidManifest<'a> {
    pub fn manifest(&self) -> &'a Manifest {
        self.manifest
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// The project name; always present once validated.
    pub fn name(&self) -> &str {
        &self.settings.project
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// The bundle is written as `<name>.app` directly inside the output directory.
fn is_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Validate `manifest`, checking rules in a fixed order.
pub fn validate(manifest: &Manifest) -> Result<ValidManifest<'_>, ValidationError> {
    let name = non_empty(manifest.project.name.as_ref()).ok_or(ValidationError::MissingName)?;
    let platform = non_empty(manifest.project.platform.as_ref())
        .ok_or(ValidationError::MissingPlatform)?;

    if !manifest.requires_module(SHELL_MODULE) {
        return Err(ValidationError::MissingShellRequire);
    }

    let run = non_empty(manifest.shell.interpreter.as_ref())
        .ok_or(ValidationError::MissingShellSet)?;

    if !manifest.declarations.shell_class {
        return Err(ValidationError::MissingShellClass);
    }
    if !manifest.declarations.main_function {
        return Err(ValidationError::MissingMainFunction);
    }

    let platform = platform
        .parse::<Platform>()
        .map_err(|_| ValidationError::InvalidPlatform {
            platform: platform.to_string(),
        })?;

    if !is_file_name(name) {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
        });
    }

    Ok(ValidManifest {
        manifest,
        settings: AppSettings {
            project: name.to_string(),
            platform,
            run: run.to_string(),
            description: manifest.project.description.clone(),
            version: manifest.project.version.clone(),
        },
    })
}
