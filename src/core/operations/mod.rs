//! SVN operations that feed the output surface.
//!
//! # Modules
//!
//! - [`tortoise`] - TortoiseProc and `svn` command lines and their parsing helpers
//! - [`dispatch`] - Running external processes behind a testable trait
//! - [`runner`] - Update, commit, diff and status rendered as command blocks

pub mod dispatch;
pub mod runner;
pub mod tortoise;

// Re-export commonly used types
pub use dispatch::{CommandDispatcher, CommandOutput, ProcessDispatcher};
pub use runner::{RunOutcome, SvnRunner};
pub use tortoise::{
    CommandLine, PATH_SEPARATOR, TortoiseCommand, diff_previous_visible, diff_visible,
    info_command, join_paths, parse_last_changed_rev, previous_revision, resolve_paths,
    status_command, version_command,
};
