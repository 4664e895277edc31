//! Status output for the CLI.
//!
//! Status lines go to stderr as `{status:>12} {message}`, so the stdout of a
//! dispatched program is never mixed with Five's own output.

use std::fmt::Display;
use std::io::{self, IsTerminal};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: no status lines; errors are still rendered by the caller
    Quiet,
    /// Default: status messages
    #[default]
    Normal,
    /// --verbose: status messages plus debug logging
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success (green)
    Finished,

    // In-progress (cyan)
    Compiling,
    Running,

    // Warning (yellow)
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Compiling => "Compiling",
            Status::Running => "Running",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished => "\x1b[1;32m",
            Status::Compiling | Status::Running => "\x1b[1;36m",
            Status::Warning => "\x1b[1;33m",
        }
    }
}

/// Width statuses are right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    /// Create a new shell.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. `--quiet` wins over `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, no_color: bool) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let color = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };

        Shell::new(verbosity, color)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message. Nothing is printed in quiet mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!("{}{:>width$}\x1b[0m", status.color_code(), text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}
