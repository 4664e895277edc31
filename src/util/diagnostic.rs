//! Top-level error type and user-facing diagnostics.
//!
//! Every component has its own error enum; they all funnel into [`FiveError`],
//! which carries a message plus an optional source position and renders as a
//! [`Diagnostic`] with suggested fixes.

use std::fmt;
use std::io;
use std::path::Path;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::bundle::{BundleError, DispatchError, SOURCE_EXTENSION};
use crate::core::lexer::LexError;
use crate::core::parser::ParseError;
use crate::core::platform::{HostFamily, Platform};
use crate::core::validate::ValidationError;

/// Common suggestion messages.
pub mod suggestions {
    pub const SOURCE_EXTENSION: &str = "Pass a manifest file ending in `.five`";
    pub const BUNDLE_EXTENSION: &str = "Pass a bundle file ending in `.app`";
    pub const REBUILD_BUNDLE: &str = "Rebuild the bundle with `five compile <file.five>`";
    pub const PLATFORM_VALUES: &str =
        "Set `project.platform` to \"linux\", \"windows\" or \"all\"";
}

/// Error surfaced by any Five operation.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum FiveError {
    #[error(transparent)]
    #[diagnostic(code(five::lex))]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(code(five::parse))]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(code(five::validate))]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(code(five::bundle))]
    Bundle(#[from] BundleError),

    #[error("this application is for {declared}, but you're on {host}")]
    #[diagnostic(code(five::platform))]
    PlatformMismatch { declared: Platform, host: HostFamily },

    #[error(transparent)]
    #[diagnostic(code(five::dispatch))]
    Dispatch(#[from] DispatchError),

    #[error("{message}")]
    #[diagnostic(code(five::fs))]
    Filesystem {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("file must have .{expected} extension")]
    #[diagnostic(code(five::usage))]
    WrongExtension { expected: &'static str },
}

/// Convenience alias for results carrying a [`FiveError`].
pub type FiveResult<T> = std::result::Result<T, FiveError>;

impl FiveError {
    /// Wrap an I/O failure on `path`. Missing files get a dedicated message.
    pub fn io(action: &str, path: &Path, source: io::Error) -> Self {
        let message = if source.kind() == io::ErrorKind::NotFound {
            format!("file {} not found", path.display())
        } else {
            format!("failed to {} {}: {}", action, path.display(), source)
        };
        FiveError::Filesystem { message, source }
    }

    /// The error message without position information.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// 1-based line of the error, or 0 when it has no source position.
    pub fn line(&self) -> usize {
        self.position().map_or(0, |(line, _)| line)
    }

    /// 1-based column of the error, or 0 when it has no source position.
    pub fn column(&self) -> usize {
        self.position().map_or(0, |(_, column)| column)
    }

    fn position(&self) -> Option<(usize, usize)> {
        match self {
            FiveError::Lex(e) => Some(e.position()),
            FiveError::Parse(e) => Some(e.position()),
            _ => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.message());
        if let Some((line, column)) = self.position() {
            diag = diag.at(line, column);
        }

        match self {
            FiveError::Validation(ValidationError::MissingShellRequire) => {
                diag.with_suggestion("Add `require \"shell\"` to the manifest")
            }
            FiveError::Validation(ValidationError::MissingShellSet) => diag
                .with_suggestion("Name the interpreter with `shell.set = \"<command>\"`"),
            FiveError::Validation(
                ValidationError::MissingShellClass | ValidationError::MissingMainFunction,
            ) => diag.with_suggestion(
                "Declare the entry point as `define class \"shell\"` with an indented `function \"main\"`",
            ),
            FiveError::Validation(
                ValidationError::MissingPlatform | ValidationError::InvalidPlatform { .. },
            ) => diag.with_suggestion(suggestions::PLATFORM_VALUES),
            FiveError::Validation(ValidationError::InvalidName { .. }) => {
                diag.with_suggestion("Use a `project.name` without `/`, `\\` or `..`")
            }
            FiveError::Bundle(
                BundleError::InvalidHeader
                | BundleError::Corrupted(_)
                | BundleError::MissingSettings
                | BundleError::CorruptedSettings(_),
            ) => diag.with_suggestion(suggestions::REBUILD_BUNDLE),
            FiveError::PlatformMismatch { declared, .. } => diag.with_context(format!(
                "the bundle was compiled with project.platform = \"{}\"",
                declared
            )),
            FiveError::Dispatch(DispatchError::InterpreterNotFound { program, .. }) => diag
                .with_suggestion(format!("Install `{}` or add it to PATH", program)),
            FiveError::WrongExtension { expected } if *expected == SOURCE_EXTENSION => {
                diag.with_suggestion(suggestions::SOURCE_EXTENSION)
            }
            FiveError::WrongExtension { .. } => diag.with_suggestion(suggestions::BUNDLE_EXTENSION),
            _ => diag,
        }
    }
}

/// A diagnostic message with optional position and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// 1-based (line, column) in the manifest source
    pub position: Option<(usize, usize)>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            position: None,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Attach a source position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.position = Some((line, column));
        self
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };

        match self.position {
            Some((line, column)) => output.push_str(&format!(
                "{} at line {}, column {}: {}\n",
                severity_str, line, column, self.message
            )),
            None => output.push_str(&format!("{}: {}\n", severity_str, self.message)),
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}
