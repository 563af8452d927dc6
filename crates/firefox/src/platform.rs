//! Host platform to Gecko build identifier mapping.
//!
//! Handles mapping between:
//! - host OS/CPU names (e.g., "Linux" / "aarch64", "Windows" / "AMD64")
//! - the build identifiers used in the task index (e.g., "linux64", "win64-aarch64")

use browser_fetcher_core::{Error, Result};
use std::fmt;

/// CPU name aliases, normalized before the table lookup.
const CPU_ALIASES: &[(&str, &str)] = &[
    ("ARM64", "arm64"),
    ("AMD64", "x86_64"),
    ("aarch64", "arm64"),
    ("i686", "x86"),
    ("x64", "x86_64"),
];

/// Supported (system, cpu) pairs and their build identifiers.
const SUPPORTED: &[(&str, &str, &str)] = &[
    ("Darwin", "x86_64", "macosx64"),
    ("Linux", "x86_64", "linux64"),
    ("Linux", "x86", "linux"),
    ("Windows", "x86_64", "win64"),
    ("Windows", "arm64", "win64-aarch64"),
];

/// The build identifier for a target OS and CPU, as used in index keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey(String);

impl PlatformKey {
    /// Resolve the key for the running host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if no build is published for the host.
    pub fn resolve() -> Result<Self> {
        Self::from_parts(host_system(), std::env::consts::ARCH)
    }

    /// Resolve the key for a system name (`Linux`, `Darwin`, `Windows`) and CPU name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if the pair is not in the table.
    pub fn from_parts(system: &str, machine: &str) -> Result<Self> {
        let cpu = normalize_cpu(machine);

        SUPPORTED
            .iter()
            .find(|(os, arch, _)| *os == system && *arch == cpu)
            .map(|(_, _, key)| Self((*key).to_string()))
            .ok_or_else(|| Error::unsupported_platform(system, cpu))
    }

    /// The identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a CPU name through the alias table.
#[must_use]
pub fn normalize_cpu(machine: &str) -> &str {
    CPU_ALIASES
        .iter()
        .find(|(alias, _)| *alias == machine)
        .map_or(machine, |(_, cpu)| *cpu)
}

/// The host OS under the names the build table uses.
fn host_system() -> &'static str {
    match std::env::consts::OS {
        "macos" => "Darwin",
        "linux" => "Linux",
        "windows" => "Windows",
        other => other,
    }
}
