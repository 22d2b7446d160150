//! # gh-script-install
//!
//! Install versioned script modules and release binaries from GitHub repositories.
//!
//! ## Overview
//!
//! A *script module* is a directory under `modules/` in a repository. Installing
//! one downloads that directory at the requested tag, branch or ref and runs its
//! `install.sh`, forwarding any `--module-param` values. A *binary* is a release
//! asset named `<name>_<os>_<arch>`; installing one downloads it for the current
//! platform, optionally checking a SHA256 or SHA512 checksum, and moves it into
//! the binary install directory as `<name>`.
//!
//! Version resolution and downloads are delegated to the external
//! [`fetch`](https://github.com/gruntwork-io/fetch) tool, which must be on the
//! `PATH`. Private repositories need `GITHUB_OAUTH_TOKEN` set.
//!
//! ## Usage
//!
//! ```bash
//! # Install a script module
//! gh-script-install --repo https://github.com/org/scripts --tag v1.0.0 --module-name fail2ban
//!
//! # Pass parameters to the module's install script
//! gh-script-install --repo https://github.com/org/scripts --tag "~>1.0" \
//!     --module-name fail2ban --module-param name=web --module-param verbose
//!
//! # Install a release binary
//! gh-script-install --repo https://github.com/org/tools --tag v1.0.0 \
//!     --binary-name mytool --binary-sha256-checksum <sha256>
//! ```
//!
//! ## Trust
//!
//! A module's `install.sh` is arbitrary code from the fetched repository and
//! runs with your privileges. Only install modules from repositories you trust.
//!
//! ## Configuration
//!
//! Defaults can be set in `gh-script-install.toml` in the user config
//! directory, or in the file passed with `--config`.

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration file handling and default settings
pub mod config;

/// Error types and exit codes
pub mod error;

/// Staging directories and the external fetch tool
pub mod fetcher;

/// Anonymous repository access checks
pub mod github;

/// Orchestration of module and binary installs
pub mod installer;

/// OS name, architecture normalization and tool lookup
pub mod platform;

/// Optional privilege elevation for binary installs
pub mod privilege;

/// Validated install requests
pub mod request;

/// Install script execution
pub mod runner;

/// Filesystem helpers
pub mod utils;
