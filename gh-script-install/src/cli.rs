use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "gh-script-install",
    version,
    about = "Install script modules and release binaries from GitHub repositories",
    long_about = None,
    after_help = "Examples:\n  gh-script-install --repo https://github.com/org/scripts --tag v1.0.0 --module-name fail2ban\n  gh-script-install --repo https://github.com/org/scripts --tag v1.0.0 --module-name fail2ban --module-param name=web --module-param verbose\n  gh-script-install --repo https://github.com/org/tools --tag v1.0.0 --binary-name mytool --binary-sha256-checksum <sha256>"
)]
pub struct Args {
    /// GitHub repository to install from (e.g., https://github.com/org/repo)
    #[clap(long, value_name = "URL", default_value = "", overrides_with = "repo")]
    pub repo: String,

    /// Git tag, or tag constraint expression, to download
    #[clap(long, default_value = "", overrides_with = "tag")]
    pub tag: String,

    /// Git branch to download. The fetch tool prefers the branch when both are given
    #[clap(long, default_value = "", overrides_with = "branch")]
    pub branch: String,

    /// Explicit git ref (commit, branch or tag) to download
    #[clap(long = "ref", value_name = "REF", default_value = "", overrides_with = "git_ref")]
    pub git_ref: String,

    /// Name of the script module to install (a directory under modules/)
    #[clap(long, default_value = "", overrides_with = "module_name")]
    pub module_name: String,

    /// Name of the release binary to install
    #[clap(long, default_value = "", overrides_with = "binary_name")]
    pub binary_name: String,

    /// SHA256 checksum the downloaded binary must match
    #[clap(
        long,
        value_name = "CHECKSUM",
        default_value = "",
        overrides_with = "binary_sha256_checksum"
    )]
    pub binary_sha256_checksum: String,

    /// SHA512 checksum the downloaded binary must match
    #[clap(
        long,
        value_name = "CHECKSUM",
        default_value = "",
        overrides_with = "binary_sha512_checksum"
    )]
    pub binary_sha512_checksum: String,

    /// Parameter passed to the module's install script as --KEY VALUE, or as --KEY when
    /// no value is given. May be repeated
    #[clap(
        long = "module-param",
        value_name = "KEY[=VALUE]",
        allow_hyphen_values = true,
        value_parser = ModuleParameter::parse
    )]
    pub module_params: Vec<ModuleParameter>,

    /// Directory where modules and binaries are staged before install
    #[clap(long, value_name = "DIR", overrides_with = "download_dir")]
    pub download_dir: Option<String>,

    /// Directory where binaries are installed
    #[clap(long, value_name = "DIR", overrides_with = "binary_install_dir")]
    pub binary_install_dir: Option<String>,

    /// Do not use sudo when installing binaries
    #[clap(long, overrides_with = "no_sudo")]
    pub no_sudo: bool,

    /// Configuration file path
    #[clap(long, value_name = "PATH", overrides_with = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(long, overrides_with = "verbose")]
    pub verbose: bool,
}

/// A `--module-param` value, forwarded to the install script in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleParameter {
    Pair { key: String, value: String },
    Flag(String),
}

impl ModuleParameter {
    /// Split on the first `=`. Without one the whole value is a bare flag,
    /// so an empty value forwards as `--`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        Ok(match raw.split_once('=') {
            Some((key, value)) => ModuleParameter::Pair {
                key: key.to_string(),
                value: value.to_string(),
            },
            None => ModuleParameter::Flag(raw.to_string()),
        })
    }

    /// Tokens this parameter expands to on the install script's command line
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ModuleParameter::Pair { key, value } => vec![format!("--{key}"), value.clone()],
            ModuleParameter::Flag(name) => vec![format!("--{name}")],
        }
    }
}

impl fmt::Display for ModuleParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleParameter::Pair { key, value } => write!(f, "{key}={value}"),
            ModuleParameter::Flag(name) => write!(f, "{name}"),
        }
    }
}

/// Flatten parameters into the ordered argument list for the install script
pub fn forwarded_tokens(params: &[ModuleParameter]) -> Vec<String> {
    params.iter().flat_map(ModuleParameter::tokens).collect()
}

/// Rendered usage line, printed alongside usage errors
pub fn usage() -> String {
    Args::command().render_usage().to_string()
}

/// Help and version requests succeed; every other parse failure is a usage error.
pub fn parse_error_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
