use crate::error::{InstallError, Result};
use crate::request::{Checksum, VersionSelector};
use crate::utils;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Copy the `/modules/<name>` subtree of a repository into `dest`
#[derive(Debug, Clone)]
pub struct ModuleFetch {
    pub repo: String,
    pub module_name: String,
    pub version: VersionSelector,
    pub dest: PathBuf,
}

impl ModuleFetch {
    pub fn source_path(&self) -> String {
        format!("/modules/{}", self.module_name)
    }
}

/// Download a single release asset into `dest`
#[derive(Debug, Clone)]
pub struct AssetFetch {
    pub repo: String,
    pub tag: String,
    pub asset_name: String,
    pub checksum: Option<Checksum>,
    pub dest: PathBuf,
}

/// Resolves a version selector against a repository and materializes the artifact.
///
/// Tag constraint resolution, authentication and checksum comparison all
/// belong to the implementation.
pub trait ArtifactResolver {
    fn fetch_module(&self, fetch: &ModuleFetch) -> Result<()>;

    fn fetch_release_asset(&self, fetch: &AssetFetch) -> Result<()>;
}

/// Resolver backed by the external `fetch` command
#[derive(Debug, Clone)]
pub struct FetchCli {
    program: String,
}

impl FetchCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Tag and branch are always passed, even when blank.
    pub fn module_args(fetch: &ModuleFetch) -> Vec<OsString> {
        vec![
            format!("--ref={}", fetch.version.git_ref).into(),
            format!("--repo={}", fetch.repo).into(),
            format!("--tag={}", fetch.version.tag).into(),
            format!("--branch={}", fetch.version.branch).into(),
            format!("--source-path={}", fetch.source_path()).into(),
            fetch.dest.clone().into_os_string(),
        ]
    }

    pub fn asset_args(fetch: &AssetFetch) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("--repo={}", fetch.repo).into(),
            format!("--tag={}", fetch.tag).into(),
            format!("--release-asset={}", fetch.asset_name).into(),
        ];

        if let Some(checksum) = &fetch.checksum {
            args.push(format!("--release-asset-checksum-algo={}", checksum.algo.as_str()).into());
            args.push(format!("--release-asset-checksum={}", checksum.value).into());
        }

        args.push(fetch.dest.clone().into_os_string());
        args
    }

    fn invoke(&self, what: &str, repo: &str, args: Vec<OsString>) -> Result<()> {
        tracing::debug!("Running {} with {} arguments", self.program, args.len());

        // stdout belongs to the module script, so the tool's output goes to stderr
        let status = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::from(std::io::stderr()))
            .status()
            .map_err(|e| InstallError::FetchFailed {
                what: what.to_string(),
                repo: repo.to_string(),
                message: format!("could not run '{}': {}", self.program, e),
            })?;

        if !status.success() {
            return Err(InstallError::FetchFailed {
                what: what.to_string(),
                repo: repo.to_string(),
                message: format!("'{}' exited with {}", self.program, status),
            });
        }

        Ok(())
    }
}

impl ArtifactResolver for FetchCli {
    fn fetch_module(&self, fetch: &ModuleFetch) -> Result<()> {
        self.invoke(
            &format!("module '{}'", fetch.module_name),
            &fetch.repo,
            Self::module_args(fetch),
        )
    }

    fn fetch_release_asset(&self, fetch: &AssetFetch) -> Result<()> {
        self.invoke(
            &format!("release asset '{}'", fetch.asset_name),
            &fetch.repo,
            Self::asset_args(fetch),
        )
    }
}

/// Empty `<download_dir>/<module>` so a previous run's files never mix with this one
pub fn prepare_module_staging(download_dir: &Path, module_name: &str) -> Result<PathBuf> {
    ensure_plain_name("module", module_name)?;
    let dir = download_dir.join(module_name);
    utils::reset_dir(&dir)?;
    Ok(dir)
}

/// Create the download directory and drop any stale copy of the asset
pub fn prepare_asset_staging(download_dir: &Path, asset_name: &str) -> Result<PathBuf> {
    ensure_plain_name("release asset", asset_name)?;
    std::fs::create_dir_all(download_dir)?;
    let staged = download_dir.join(asset_name);
    utils::remove_file_if_exists(&staged)?;
    Ok(staged)
}

fn ensure_plain_name(kind: &str, name: &str) -> Result<()> {
    if !utils::is_plain_name(name) {
        return Err(InstallError::Usage(format!(
            "Invalid {kind} name '{name}': it must be a single path component"
        )));
    }
    Ok(())
}
