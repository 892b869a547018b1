//! Running external SVN tools.
//!
//! The runner only needs raw stdout/stderr bytes and an exit code, so process
//! creation sits behind [`CommandDispatcher`]. [`ProcessDispatcher`] is the
//! real implementation on top of `tokio::process`.

use super::tortoise::CommandLine;
use crate::error::SvnError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard output decoded lossily.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded lossily.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Starts external processes and collects their output.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Run a command to completion.
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, SvnError>;

    /// Whether an executable exists at `path`.
    fn tool_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// [`CommandDispatcher`] spawning real OS processes.
///
/// On Windows no console window is created for the child.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDispatcher;

impl ProcessDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandDispatcher for ProcessDispatcher {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, SvnError> {
        let mut cmd = Command::new(&command.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            cmd.creation_flags(windows_sys::Win32::System::Threading::CREATE_NO_WINDOW);
            if command.verbatim {
                for arg in &command.args {
                    cmd.raw_arg(arg);
                }
            } else {
                cmd.args(&command.args);
            }
        }
        #[cfg(not(windows))]
        cmd.args(&command.args);

        debug!(command = %command, "spawning process");
        let output = cmd.output().await.map_err(|e| {
            warn!(command = %command, error = %e, "failed to spawn process");
            SvnError::SpawnFailed {
                program: command.program.display().to_string(),
                message: e.to_string(),
            }
        })?;
        debug!(command = %command, code = ?output.status.code(), "process finished");

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
        })
    }
}
