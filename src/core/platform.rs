//! Platform buckets used to gate bundle execution.
//!
//! Hosts are collapsed into two families. A bundle declares one of those
//! families or `all`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse classification of the machine running a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFamily {
    /// Linux and macOS.
    Linux,
    /// Everything else.
    Windows,
}

impl HostFamily {
    /// Classify the current host.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Classify an OS identifier as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "macos" => HostFamily::Linux,
            _ => HostFamily::Windows,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostFamily::Linux => "linux",
            HostFamily::Windows => "windows",
        }
    }
}

impl fmt::Display for HostFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    #[default]
    All,
}

impl Platform {
    /// Accepted spellings, in the order they are listed to users.
    pub const NAMES: [&'static str; 3] = ["linux", "windows", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::All => "all",
        }
    }

    /// Whether a bundle for this platform may run on `host`.
    pub fn supports(&self, host: HostFamily) -> bool {
        matches!(
            (self, host),
            (Platform::All, _)
                | (Platform::Linux, HostFamily::Linux)
                | (Platform::Windows, HostFamily::Windows)
        )
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            "all" => Ok(Platform::All),
            _ => Err(format!(
                "platform '{}' is not valid. Use: {}",
                s,
                Platform::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
