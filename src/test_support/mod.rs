//! Test utilities for Five unit tests.
//!
//! [`ManifestFixture`] renders `.five` sources from a few builder calls and
//! [`MockExecutor`] stands in for real process dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! use five::test_support::{ManifestFixture, MockExecutor};
//!
//! #[test]
//! fn test_example() {
//!     let source = ManifestFixture::hello().platform("linux").source();
//!     let exec = MockExecutor::new().returning(DispatchOutput::default());
//!     // Compile `source`, run the bundle through `exec`...
//! }
//! ```

use std::sync::Mutex;

use crate::bundle::{DispatchCommand, DispatchError, DispatchOutput, Executor};

/// Builder for `.five` manifest sources.
#[derive(Debug, Clone)]
pub struct ManifestFixture {
    name: Option<String>,
    platform: Option<String>,
    version: Option<String>,
    description: Option<String>,
    require_shell: bool,
    interpreter: Option<String>,
    folders: Vec<String>,
    files: Vec<(String, String)>,
    class: String,
    body: String,
}

impl ManifestFixture {
    /// The smallest valid manifest: project `hi` running `echo`.
    pub fn hello() -> Self {
        ManifestFixture {
            name: Some("hi".into()),
            platform: Some("all".into()),
            version: None,
            description: None,
            require_shell: true,
            interpreter: Some("echo".into()),
            folders: Vec::new(),
            files: Vec::new(),
            class: "shell".into(),
            body: "print hello".into(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn without_platform(mut self) -> Self {
        self.platform = None;
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn without_require(mut self) -> Self {
        self.require_shell = false;
        self
    }

    pub fn interpreter(mut self, command: &str) -> Self {
        self.interpreter = Some(command.into());
        self
    }

    pub fn without_interpreter(mut self) -> Self {
        self.interpreter = None;
        self
    }

    /// Add `files.add("folder", name)`.
    pub fn folder(mut self, name: &str) -> Self {
        self.folders.push(name.into());
        self
    }

    /// Add `files.add("file", source, dest)`.
    pub fn file(mut self, source: &str, dest: &str) -> Self {
        self.files.push((source.into(), dest.into()));
        self
    }

    /// Name of the class wrapping `main`.
    pub fn class(mut self, class: &str) -> Self {
        self.class = class.into();
        self
    }

    /// Payload lines; each is indented under `function "main"`.
    pub fn body(mut self, body: &str) -> Self {
        self.body = body.into();
        self
    }

    /// Render the manifest source.
    pub fn source(&self) -> String {
        let mut out = String::new();

        let fields = [
            ("name", &self.name),
            ("version", &self.version),
            ("platform", &self.platform),
            ("description", &self.description),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                out.push_str(&format!("project.{} = \"{}\"\n", field, value));
            }
        }

        if self.require_shell {
            out.push_str("require \"shell\"\n");
        }
        if let Some(interpreter) = &self.interpreter {
            out.push_str(&format!("shell.set = \"{}\"\n", interpreter));
        }
        for folder in &self.folders {
            out.push_str(&format!("files.add(\"folder\", \"{}\")\n", folder));
        }
        for (source, dest) in &self.files {
            out.push_str(&format!("files.add(\"file\", \"{}\", \"{}\")\n", source, dest));
        }

        out.push_str(&format!("\ndefine class \"{}\"\n", self.class));
        out.push_str("    function \"main\"\n");
        for line in self.body.lines() {
            out.push_str("        ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Mock executor for testing dispatch without spawning processes.
///
/// Every command is recorded. Commands succeed with the configured output,
/// or with an empty zero-status output by default.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<DispatchCommand>>,
    output: DispatchOutput,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` for every executed command.
    pub fn returning(mut self, output: DispatchOutput) -> Self {
        self.output = output;
        self
    }

    /// Commands executed so far.
    pub fn calls(&self) -> Vec<DispatchCommand> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Executor for MockExecutor {
    fn execute(&self, command: &DispatchCommand) -> Result<DispatchOutput, DispatchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_hello_source() {
        let source = ManifestFixture::hello().source();
        assert!(source.starts_with("project.name = \"hi\"\nproject.platform = \"all\"\n"));
        assert!(source.contains("require \"shell\"\nshell.set = \"echo\"\n"));
        assert!(source.ends_with("    function \"main\"\n        print hello\n"));
    }

    #[test]
    fn test_fixture_parses() {
        let manifest = crate::core::parse_manifest(&ManifestFixture::hello().source()).unwrap();
        assert_eq!(manifest.payload, "print hello");
    }

    #[test]
    fn test_mock_executor_records_calls() {
        let exec = MockExecutor::new().returning(DispatchOutput {
            code: 7,
            ..Default::default()
        });
        let cmd = DispatchCommand::from_run("sh -e", "code.five-code", Path::new("/w")).unwrap();

        assert_eq!(exec.execute(&cmd).unwrap().code, 7);
        assert_eq!(exec.calls(), vec![cmd]);
    }
}
