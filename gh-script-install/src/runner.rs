//! Execution of a staged module's install script.
//!
//! The script is arbitrary code from the fetched repository and runs with the
//! installer's own privileges, the same trust model as an OS package manager
//! running a package's install hooks. Only install modules from repositories
//! you trust.

use crate::cli::{self, ModuleParameter};
use crate::error::{InstallError, Result};
use crate::utils;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Entry point every module must provide at the root of its directory
pub const ENTRY_POINT: &str = "install.sh";

/// Exported to the install script with the tag that was requested
pub const TAG_ENV_VAR: &str = "GH_SCRIPT_INSTALL_TAG";

/// Exported to the install script with the branch that was requested
pub const BRANCH_ENV_VAR: &str = "GH_SCRIPT_INSTALL_BRANCH";

/// The version an install script was fetched at. Both fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub tag: String,
    pub branch: String,
}

pub struct ModuleRunner<'a> {
    module_name: &'a str,
    module_dir: &'a Path,
}

impl<'a> ModuleRunner<'a> {
    pub fn new(module_name: &'a str, module_dir: &'a Path) -> Self {
        Self {
            module_name,
            module_dir,
        }
    }

    pub fn entry_point(&self) -> PathBuf {
        self.module_dir.join(ENTRY_POINT)
    }

    /// Run the install script with inherited stdio. A non-zero exit becomes
    /// `ModuleScriptFailed` carrying the script's own code.
    pub fn run(&self, version: &ResolvedVersion, params: &[ModuleParameter]) -> Result<()> {
        let entry_point = self.entry_point();
        if !entry_point.is_file() {
            return Err(InstallError::MissingEntryPoint {
                module: self.module_name.to_string(),
                path: entry_point.display().to_string(),
            });
        }

        utils::make_executable(&entry_point)?;

        let tokens = cli::forwarded_tokens(params);
        tracing::info!(
            "Executing {} {}",
            entry_point.display(),
            tokens.join(" ")
        );

        let status = Command::new(&entry_point)
            .args(&tokens)
            .env(TAG_ENV_VAR, &version.tag)
            .env(BRANCH_ENV_VAR, &version.branch)
            .status()?;

        if !status.success() {
            return Err(InstallError::ModuleScriptFailed {
                module: self.module_name.to_string(),
                code: status.code().unwrap_or(1),
            });
        }

        Ok(())
    }
}
