use crate::error::{InstallError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Ensure an external executable is on the PATH
pub fn require_tool(name: &str, hint: &str) -> Result<PathBuf> {
    which::which(name).map_err(|e| {
        tracing::debug!("Lookup of '{}' failed: {}", name, e);
        InstallError::MissingTool {
            name: name.to_string(),
            hint: hint.to_string(),
        }
    })
}

/// Lower-cased OS name as used in release asset names
pub fn os_name(raw: &str) -> String {
    match raw {
        "macos" => "darwin".to_string(),
        other => other.to_lowercase(),
    }
}

/// Normalize a machine architecture to one of amd64, 386, arm or arm64.
///
/// Substrings are checked in priority order and the first match wins, so
/// `armv7l` is `arm` while `aarch64` is `arm64`. Anything else maps to an
/// empty string.
pub fn normalize_arch(raw: &str) -> String {
    const RULES: [(&str, &str); 5] = [
        ("arm64", "arm64"),
        ("aarch64", "arm64"),
        ("64", "amd64"),
        ("386", "386"),
        ("arm", "arm"),
    ];

    RULES
        .iter()
        .find(|(pattern, _)| raw.contains(pattern))
        .map(|(_, arch)| arch.to_string())
        .unwrap_or_default()
}

/// Host operating system and raw machine architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub machine: String,
}

impl Platform {
    pub fn detect() -> Self {
        Self {
            os: os_name(std::env::consts::OS),
            machine: machine_arch(),
        }
    }

    /// Normalized architecture, failing on machines outside the supported set
    pub fn arch(&self) -> Result<String> {
        let arch = normalize_arch(&self.machine);
        if arch.is_empty() {
            return Err(InstallError::UnsupportedArchitecture {
                raw: self.machine.clone(),
            });
        }
        Ok(arch)
    }

    /// Release asset name for a binary on this platform: `<name>_<os>_<arch>`
    pub fn qualified_binary_name(&self, binary_name: &str) -> Result<String> {
        Ok(format!("{}_{}_{}", binary_name, self.os, self.arch()?))
    }
}

/// Raw machine architecture as reported by `uname -m`, or the compile-time
/// architecture when `uname` is unavailable.
fn machine_arch() -> String {
    let output = Command::new("uname").arg("-m").output();
    match output {
        Ok(out) if out.status.success() => {
            let machine = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if machine.is_empty() {
                std::env::consts::ARCH.to_string()
            } else {
                machine
            }
        }
        _ => std::env::consts::ARCH.to_string(),
    }
}
