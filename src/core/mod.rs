//! Core module for SVN output handling.
//!
//! This module provides the foundational pieces shared by the editor
//! integration and the command-line front end:
//!
//! - The output surface, message formatter and conflict annotator
//! - TortoiseProc and `svn` operations that feed them
//! - Exit codes for CLI operations

pub mod operations;
pub mod output;

/// Exit codes for command-line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// The command completed and reported no conflicts.
    Success = 0,

    /// General error (configuration, editor host, process launch, etc.).
    GeneralError = 1,

    /// The command completed but left conflicted files.
    Conflict = 2,

    /// TortoiseProc is not installed at the configured path.
    ToolNotFound = 3,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns a human-readable description of the exit code.
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Command completed successfully",
            ExitCode::GeneralError => "General error occurred",
            ExitCode::Conflict => "Conflicts detected - resolve them before committing",
            ExitCode::ToolNotFound => "TortoiseProc.exe not found - check tortoiseproc_path",
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
