use crate::cli::Args;
use crate::error::{InstallError, Result};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BINARY_INSTALL_DIR: &str = "/usr/local/bin";

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default: DefaultConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DefaultConfig {
    pub download_dir: Option<String>,

    pub binary_install_dir: Option<String>,

    #[serde(default)]
    pub no_sudo: bool,

    #[serde(default = "default_fetch_command")]
    pub fetch_command: String,

    #[serde(default = "default_elevate_command")]
    pub elevate_command: String,

    #[serde(default = "default_access_check_timeout")]
    pub access_check_timeout: u64,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            binary_install_dir: None,
            no_sudo: false,
            fetch_command: default_fetch_command(),
            elevate_command: default_elevate_command(),
            access_check_timeout: default_access_check_timeout(),
        }
    }
}

fn default_fetch_command() -> String {
    "fetch".to_string()
}

fn default_elevate_command() -> String {
    "sudo".to_string()
}

fn default_access_check_timeout() -> u64 {
    30
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("gh-script-install")
}

/// Effective settings for one run, after merging CLI flags over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub download_dir: PathBuf,
    pub binary_install_dir: PathBuf,
    pub no_sudo: bool,
    pub fetch_command: String,
    pub elevate_command: String,
    pub access_check_timeout: Duration,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| InstallError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("gh-script-install.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/gh-script-install.toml"))
    }

    /// Merge configuration with command line arguments. Flags win over the file.
    pub fn resolve(&self, args: &Args) -> Settings {
        let download_dir = args
            .download_dir
            .as_deref()
            .or(self.default.download_dir.as_deref())
            .map(utils::expand_tilde)
            .unwrap_or_else(default_download_dir);

        let binary_install_dir = args
            .binary_install_dir
            .as_deref()
            .or(self.default.binary_install_dir.as_deref())
            .map(utils::expand_tilde)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY_INSTALL_DIR));

        Settings {
            download_dir,
            binary_install_dir,
            no_sudo: args.no_sudo || self.default.no_sudo,
            fetch_command: self.default.fetch_command.clone(),
            elevate_command: self.default.elevate_command.clone(),
            access_check_timeout: Duration::from_secs(self.default.access_check_timeout),
        }
    }
}
