use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;

use crate::cli::{Args, ModuleParameter};
use crate::config::Config;
use crate::error::InstallError;
use crate::fetcher::{self, ArtifactResolver, AssetFetch, FetchCli, ModuleFetch};
use crate::platform::{self, Platform};
use crate::privilege::{self, PrivilegedExecutor};
use crate::request::{self, Artifact, Checksum, InstallRequest, SystemPreflight};
use crate::runner::{ModuleRunner, ResolvedVersion};
use crate::utils;

/// Load config, validate the flags and run the install they describe
pub async fn install(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path).context("Failed to load configuration")?;
    let settings = config.resolve(&args);

    let preflight = SystemPreflight::new(&settings)?;
    let request = request::validate(&args, &settings, &preflight).await?;

    if !settings.no_sudo && matches!(request.artifact, Artifact::Binary { .. }) {
        platform::require_tool(&settings.elevate_command, "Install it or pass --no-sudo.")?;
    }

    let installer = Installer::new(
        request,
        FetchCli::new(settings.fetch_command.clone()),
        privilege::executor_for(settings.no_sudo, &settings.elevate_command),
        Platform::detect(),
    );
    installer.run()
}

pub struct Installer<R: ArtifactResolver> {
    request: InstallRequest,
    resolver: R,
    executor: Box<dyn PrivilegedExecutor>,
    platform: Platform,
}

impl<R: ArtifactResolver> Installer<R> {
    pub fn new(
        request: InstallRequest,
        resolver: R,
        executor: Box<dyn PrivilegedExecutor>,
        platform: Platform,
    ) -> Self {
        Self {
            request,
            resolver,
            executor,
            platform,
        }
    }

    pub fn run(&self) -> Result<()> {
        match &self.request.artifact {
            Artifact::Module { name, params } => self.install_module(name, params),
            Artifact::Binary { name, checksum } => self.install_binary(name, checksum.as_ref()),
        }
    }

    fn install_module(&self, module_name: &str, params: &[ModuleParameter]) -> Result<()> {
        let request = &self.request;
        tracing::info!(
            "Installing module {} from {} ({})",
            module_name,
            request.repo,
            request.version
        );

        let module_dir = fetcher::prepare_module_staging(&request.download_dir, module_name)
            .with_context(|| {
                format!(
                    "Failed to prepare {}",
                    request.download_dir.join(module_name).display()
                )
            })?;

        self.resolver.fetch_module(&ModuleFetch {
            repo: request.repo.clone(),
            module_name: module_name.to_string(),
            version: request.version.clone(),
            dest: module_dir.clone(),
        })?;

        if !utils::contains_files(&module_dir)? {
            return Err(InstallError::EmptyModule {
                module: module_name.to_string(),
                repo: request.repo.clone(),
                tag: request.version.tag.clone(),
                branch: request.version.branch.clone(),
            }
            .into());
        }

        let version = ResolvedVersion {
            tag: request.version.tag.clone(),
            branch: request.version.branch.clone(),
        };
        ModuleRunner::new(module_name, &module_dir).run(&version, params)?;

        tracing::info!("Module {} installed successfully", module_name);
        Ok(())
    }

    fn install_binary(&self, binary_name: &str, checksum: Option<&Checksum>) -> Result<()> {
        let request = &self.request;
        let asset_name = self.platform.qualified_binary_name(binary_name)?;
        tracing::info!(
            "Installing binary {} from {} (tag: {})",
            asset_name,
            request.repo,
            request.version.tag
        );

        match checksum {
            Some(checksum) => tracing::info!(
                "Asset must match {} checksum {}",
                checksum.algo.as_str(),
                checksum.value
            ),
            None => tracing::warn!("No checksum given; the downloaded binary will not be verified"),
        }

        let staged = fetcher::prepare_asset_staging(&request.download_dir, &asset_name)
            .with_context(|| format!("Failed to prepare {}", request.download_dir.display()))?;

        self.resolver.fetch_release_asset(&AssetFetch {
            repo: request.repo.clone(),
            tag: request.version.tag.clone(),
            asset_name: asset_name.clone(),
            checksum: checksum.cloned(),
            dest: request.download_dir.clone(),
        })?;

        if !staged.is_file() {
            return Err(InstallError::FetchFailed {
                what: format!("release asset '{asset_name}'"),
                repo: request.repo.clone(),
                message: format!("nothing was written to {}", staged.display()),
            }
            .into());
        }

        self.place_binary(&staged, &request.binary_install_dir.join(binary_name))
    }

    /// Move the staged binary into place and mark it executable, under the
    /// configured elevation policy.
    fn place_binary(&self, staged: &Path, dest: &Path) -> Result<()> {
        let install_dir = dest.parent().unwrap_or(dest);

        if !install_dir.is_dir() {
            tracing::info!("Creating {}", install_dir.display());
            self.executor
                .run("mkdir", &[OsString::from("-p"), install_dir.into()])?;
        }

        tracing::info!("Moving {} to {}", staged.display(), dest.display());
        self.executor.run("mv", &[staged.into(), dest.into()])?;

        tracing::info!("Setting execute permissions on {}", dest.display());
        self.executor.run("chmod", &[OsString::from("u+x"), dest.into()])?;

        tracing::info!("Binary installed to {}", dest.display());
        Ok(())
    }
}
