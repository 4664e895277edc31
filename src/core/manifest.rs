//! In-memory model of a parsed `.five` manifest.
//!
//! The model is filled in by the parser, checked once by the validator and
//! then handed read-only to the bundle builder.

use std::path::Path;

/// Default `project.version` when the manifest does not set one.
pub const DEFAULT_VERSION: &str = "1.0";

/// Default `project.description` when the manifest does not set one.
pub const DEFAULT_DESCRIPTION: &str = "Mi aplicacion de amor!";

/// Name of the module every runnable manifest must `require`.
pub const SHELL_MODULE: &str = "shell";

/// Name of the class that must wrap the entry function.
pub const SHELL_CLASS: &str = "shell";

/// Name of the entry function whose body is the payload.
pub const MAIN_FUNCTION: &str = "main";

/// `project.<field>` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub version: String,
    pub platform: Option<String>,
    pub description: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        ProjectInfo {
            name: None,
            version: DEFAULT_VERSION.to_string(),
            platform: None,
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// A field that can be assigned with `project.<field> = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Version,
    Platform,
    Description,
}

impl ProjectField {
    pub fn parse(name: &str) -> Option<ProjectField> {
        match name {
            "name" => Some(ProjectField::Name),
            "version" => Some(ProjectField::Version),
            "platform" => Some(ProjectField::Platform),
            "description" => Some(ProjectField::Description),
            _ => None,
        }
    }
}

impl ProjectInfo {
    /// Assign a field. Later assignments replace earlier ones.
    pub fn set(&mut self, field: ProjectField, value: String) {
        match field {
            ProjectField::Name => self.name = Some(value),
            ProjectField::Version => self.version = value,
            ProjectField::Platform => self.platform = Some(value),
            ProjectField::Description => self.description = value,
        }
    }
}

/// `shell.set = "..."` and `shell.run("...")` statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfig {
    /// Interpreter command line used to dispatch the payload.
    pub interpreter: Option<String>,
    /// Commands declared with `shell.run`, in order.
    pub run_commands: Vec<String>,
}

/// A `files.add("file", src, dest)` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    pub source: String,
    pub dest: String,
}

/// `files.add(...)` declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesConfig {
    pub folders: Vec<String>,
    pub files: Vec<FileMapping>,
}

/// Which of the mandatory declarations were seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Declarations {
    pub shell_class: bool,
    pub main_function: bool,
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub project: ProjectInfo,
    /// Modules named by `require`, in declaration order. Duplicates are kept.
    pub requires: Vec<String>,
    pub shell: ShellConfig,
    pub files: FilesConfig,
    pub declarations: Declarations,
    /// Trimmed body of the `main` function, never inspected.
    pub payload: String,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `require "<module>"` was declared.
    pub fn requires_module(&self, module: &str) -> bool {
        self.requires.iter().any(|m| m == module)
    }
}

/// Whether `path` has the `.five` source extension.
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == crate::bundle::SOURCE_EXTENSION)
}
