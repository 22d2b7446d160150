use crate::cli::{Args, ModuleParameter};
use crate::config::Settings;
use crate::error::{InstallError, Result};
use crate::github::{self, RepoAccessChecker, TOKEN_ENV_VAR};
use crate::platform;
use crate::utils;
use std::fmt;
use std::path::PathBuf;

/// Version selectors passed through to the fetch tool. Empty means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSelector {
    pub tag: String,
    pub branch: String,
    pub git_ref: String,
}

impl fmt::Display for VersionSelector {
    /// Tag wins over branch, branch over ref.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tag.is_empty() {
            write!(f, "tag '{}'", self.tag)
        } else if !self.branch.is_empty() {
            write!(f, "branch '{}'", self.branch)
        } else if !self.git_ref.is_empty() {
            write!(f, "ref '{}'", self.git_ref)
        } else {
            write!(f, "default branch")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgo {
    Sha256,
    Sha512,
}

impl ChecksumAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgo::Sha256 => "sha256",
            ChecksumAlgo::Sha512 => "sha512",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algo: ChecksumAlgo,
    pub value: String,
}

impl Checksum {
    /// Only the encoding is checked here. Length and algorithm agreement are
    /// left to the fetch tool, which compares against the downloaded asset.
    pub fn new(algo: ChecksumAlgo, value: &str) -> Result<Self> {
        if hex::decode(value).is_err() {
            return Err(InstallError::InvalidChecksum {
                algo: algo.as_str().to_string(),
                value: value.to_string(),
            });
        }

        Ok(Self {
            algo,
            value: value.to_string(),
        })
    }
}

/// What to install: a script module or a release binary, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Module {
        name: String,
        params: Vec<ModuleParameter>,
    },
    Binary {
        name: String,
        checksum: Option<Checksum>,
    },
}

/// A validated invocation
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub repo: String,
    pub version: VersionSelector,
    pub artifact: Artifact,
    pub download_dir: PathBuf,
    pub binary_install_dir: PathBuf,
    pub skip_elevation: bool,
}

/// Environment checks that run before any fetch
pub trait Preflight {
    /// Fail when the external tool is not installed
    fn require_fetch_tool(&self) -> Result<()>;

    fn token_present(&self) -> bool;

    #[allow(async_fn_in_trait)]
    async fn repo_is_public(&self, repo: &str) -> bool;
}

/// Preflight backed by the real PATH, environment and network
pub struct SystemPreflight {
    fetch_command: String,
    checker: RepoAccessChecker,
}

impl SystemPreflight {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            fetch_command: settings.fetch_command.clone(),
            checker: RepoAccessChecker::new(settings.access_check_timeout)?,
        })
    }
}

impl Preflight for SystemPreflight {
    fn require_fetch_tool(&self) -> Result<()> {
        platform::require_tool(
            &self.fetch_command,
            "Install it from https://github.com/gruntwork-io/fetch/releases.",
        )?;
        Ok(())
    }

    fn token_present(&self) -> bool {
        github::token_present()
    }

    async fn repo_is_public(&self, repo: &str) -> bool {
        self.checker.is_public(repo).await
    }
}

/// Validate flags in order, stopping at the first failure
pub async fn validate<P: Preflight>(
    args: &Args,
    settings: &Settings,
    preflight: &P,
) -> Result<InstallRequest> {
    if args.repo.is_empty() {
        return Err(InstallError::Usage(
            "The --repo flag is required".to_string(),
        ));
    }

    preflight.require_fetch_tool()?;

    if !preflight.repo_is_public(&args.repo).await {
        if !preflight.token_present() {
            return Err(InstallError::TokenRequired {
                repo: args.repo.clone(),
                var: TOKEN_ENV_VAR.to_string(),
            });
        }
        tracing::debug!("{} requires authentication; using {}", args.repo, TOKEN_ENV_VAR);
    }

    for (flag, name) in [
        ("--module-name", &args.module_name),
        ("--binary-name", &args.binary_name),
    ] {
        if !name.is_empty() && !utils::is_plain_name(name) {
            return Err(InstallError::Usage(format!(
                "The {flag} value '{name}' must be a plain name without '/' or '..'"
            )));
        }
    }

    let artifact = match (args.module_name.is_empty(), args.binary_name.is_empty()) {
        (true, true) => {
            return Err(InstallError::Usage(
                "You must specify exactly one of --module-name or --binary-name".to_string(),
            ))
        }
        (false, false) => {
            return Err(InstallError::Usage(
                "You cannot specify both --module-name and --binary-name".to_string(),
            ))
        }
        (false, true) => Artifact::Module {
            name: args.module_name.clone(),
            params: args.module_params.clone(),
        },
        (true, false) => {
            if args.tag.is_empty() {
                return Err(InstallError::Usage(
                    "The --tag flag is required when --binary-name is set".to_string(),
                ));
            }
            Artifact::Binary {
                name: args.binary_name.clone(),
                checksum: checksum_from(args)?,
            }
        }
    };

    if matches!(artifact, Artifact::Binary { .. }) && !args.module_params.is_empty() {
        tracing::warn!("Ignoring --module-param values: they only apply to module installs");
    }

    Ok(InstallRequest {
        repo: args.repo.clone(),
        version: VersionSelector {
            tag: args.tag.clone(),
            branch: args.branch.clone(),
            git_ref: args.git_ref.clone(),
        },
        artifact,
        download_dir: settings.download_dir.clone(),
        binary_install_dir: settings.binary_install_dir.clone(),
        skip_elevation: settings.no_sudo,
    })
}

fn checksum_from(args: &Args) -> Result<Option<Checksum>> {
    match (
        args.binary_sha256_checksum.as_str(),
        args.binary_sha512_checksum.as_str(),
    ) {
        ("", "") => Ok(None),
        (sha256, "") => Checksum::new(ChecksumAlgo::Sha256, sha256).map(Some),
        ("", sha512) => Checksum::new(ChecksumAlgo::Sha512, sha512).map(Some),
        _ => Err(InstallError::Usage(
            "You cannot specify both --binary-sha256-checksum and --binary-sha512-checksum"
                .to_string(),
        )),
    }
}
