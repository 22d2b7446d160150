use crate::error::{InstallError, Result};
use std::ffi::OsString;
use std::process::Command;

/// Runs the filesystem-mutating steps of a binary install, with or without elevation.
pub trait PrivilegedExecutor {
    /// Build the command for `program`, prefixed with elevation where needed
    fn command(&self, program: &str) -> Command;

    fn run(&self, program: &str, args: &[OsString]) -> Result<()> {
        let mut cmd = self.command(program);
        cmd.args(args);

        let described = describe(&cmd);
        tracing::debug!("Running: {}", described);

        let status = cmd.status().map_err(|e| InstallError::CommandFailed {
            command: described.clone(),
            message: e.to_string(),
        })?;

        if !status.success() {
            return Err(InstallError::CommandFailed {
                command: described,
                message: format!("exited with {status}"),
            });
        }

        Ok(())
    }
}

/// Runs commands as the invoking user
#[derive(Debug, Default)]
pub struct Direct;

impl PrivilegedExecutor for Direct {
    fn command(&self, program: &str) -> Command {
        Command::new(program)
    }
}

/// Runs commands through an elevation wrapper such as `sudo`
#[derive(Debug)]
pub struct Elevated {
    wrapper: String,
}

impl Elevated {
    pub fn new(wrapper: impl Into<String>) -> Self {
        Self {
            wrapper: wrapper.into(),
        }
    }
}

impl PrivilegedExecutor for Elevated {
    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(&self.wrapper);
        cmd.arg(program);
        cmd
    }
}

/// Pick the executor for a run
pub fn executor_for(skip_elevation: bool, wrapper: &str) -> Box<dyn PrivilegedExecutor> {
    if skip_elevation {
        Box::new(Direct)
    } else {
        Box::new(Elevated::new(wrapper))
    }
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
