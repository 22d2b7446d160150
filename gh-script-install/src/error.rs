use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("{0}")]
    Usage(String),

    #[error("The binary '{name}' is not installed or not on the PATH. {hint}")]
    MissingTool { name: String, hint: String },

    #[error("The repository {repo} is not publicly accessible and the {var} environment variable is not set")]
    TokenRequired { repo: String, var: String },

    #[error("Invalid {algo} checksum '{value}': expected a hexadecimal digest")]
    InvalidChecksum { algo: String, value: String },

    #[error("Unsupported machine architecture '{raw}'. Supported architectures: amd64, 386, arm, arm64")]
    UnsupportedArchitecture { raw: String },

    #[error("Failed to fetch {what} from {repo}: {message}")]
    FetchFailed {
        what: String,
        repo: String,
        message: String,
    },

    #[error("No files were downloaded for module '{module}' from {repo} (tag: '{tag}', branch: '{branch}'). Is the module name correct?")]
    EmptyModule {
        module: String,
        repo: String,
        tag: String,
        branch: String,
    },

    #[error("Module '{module}' has no install entry point at {path}")]
    MissingEntryPoint { module: String, path: String },

    #[error("Install script for module '{module}' exited with code {code}")]
    ModuleScriptFailed { module: String, code: i32 },

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Configuration error at {path}: {message}")]
    Config { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InstallError {
    /// Process exit code for this error. Module scripts keep their own status.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::ModuleScriptFailed { code, .. } => *code,
            _ => 1,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, InstallError::Usage(_))
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;

/// Map any error surfaced from a run to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<InstallError>()
        .map(InstallError::exit_code)
        .unwrap_or(1)
}
