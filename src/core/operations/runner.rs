//! End-to-end SVN operations rendered through the output surface.
//!
//! Each operation is one logical command: a `Command:` header, the file
//! list, the tool's output and errors, and the `Completed` line. Updates and
//! status runs are followed by a conflict highlight pass.

use super::dispatch::{CommandDispatcher, CommandOutput};
use super::tortoise::{
    CommandLine, TortoiseCommand, diff_previous_visible, diff_visible, info_command, join_paths,
    previous_revision, status_command, version_command,
};
use crate::core::output::{INDENT_LEVEL, MessageFormatter, OutputSurface, indent, scan_conflicts};
use crate::error::{HypnoResult, SvnError};
use crate::host::EditorHost;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary of one finished operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code of the tool, if it exited normally.
    pub code: Option<i32>,
    /// Conflicted lines reported by the tool.
    pub conflicts: usize,
}

impl RunOutcome {
    fn from_output(output: &CommandOutput) -> Self {
        let rendered = indent(&output.stdout_text(), INDENT_LEVEL * 2);
        Self {
            code: output.code,
            conflicts: scan_conflicts(&rendered).len(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicts > 0
    }
}

/// Runs TortoiseProc and `svn` commands and renders their output.
pub struct SvnRunner<D: CommandDispatcher> {
    dispatcher: D,
}

impl<D: CommandDispatcher> SvnRunner<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// `TortoiseProc /command:update`, then highlight conflicts.
    pub async fn update<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        let command = TortoiseCommand::Update {
            auto_close: surface.settings().auto_close_update_dialog(),
        };
        let outcome = self.run_tortoise(surface, &command, paths).await?;
        MessageFormatter::new(surface).highlight_conflicts()?;
        Ok(outcome)
    }

    /// `TortoiseProc /command:commit`.
    pub async fn commit<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        let command = TortoiseCommand::Commit {
            auto_close: surface.settings().auto_close_commit_dialog(),
        };
        self.run_tortoise(surface, &command, paths).await
    }

    /// `TortoiseProc /command:diff` against the working copy.
    pub async fn diff<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        self.run_tortoise(surface, &TortoiseCommand::Diff, paths).await
    }

    /// Diff the last committed change of a file against its predecessor.
    ///
    /// The revisions come from `svn info` and `svnversion` on the first path.
    pub async fn diff_previous<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        let first = paths.first().ok_or(SvnError::NoPath)?;
        let info = self.dispatcher.run(&info_command(first)).await?;
        let start_rev = previous_revision(&info.stdout_text())?;
        let version = self.dispatcher.run(&version_command(first)).await?;
        let end_rev = version.stdout_text().trim().to_string();

        let command = TortoiseCommand::DiffPrevious { start_rev, end_rev };
        self.run_tortoise(surface, &command, paths).await
    }

    /// `svn status`, rendered and highlighted like an update.
    pub async fn status<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        if paths.is_empty() {
            return Err(SvnError::NoPath.into());
        }
        let line = status_command(paths);
        let outcome = self.run_rendered(surface, "Status", &line, paths).await?;
        MessageFormatter::new(surface).highlight_conflicts()?;
        Ok(outcome)
    }

    /// Whether "diff" applies to `path`: an existing file with local changes.
    pub async fn diff_visible(&self, path: &Path) -> HypnoResult<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        Ok(diff_visible(&self.status_text(path).await?))
    }

    /// Whether "diff previous" applies to `path`: an existing, unmodified file.
    pub async fn diff_previous_visible(&self, path: &Path) -> HypnoResult<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        Ok(diff_previous_visible(&self.status_text(path).await?))
    }

    async fn status_text(&self, path: &Path) -> HypnoResult<String> {
        let output = self.dispatcher.run(&status_command(&[path])).await?;
        Ok(output.stdout_text())
    }

    async fn run_tortoise<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        command: &TortoiseCommand,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        let joined = join_paths(paths).ok_or(SvnError::NoPath)?;
        let tool = surface.settings().tortoiseproc_path();
        if !self.dispatcher.tool_exists(&tool) {
            let err = SvnError::ToolNotFound { path: tool };
            warn!(error = %err, "TortoiseProc missing");
            surface.host_mut().message_dialog(&err.to_string());
            return Err(err.into());
        }
        let line = command.command_line(&tool, &joined);
        self.run_rendered(surface, command.name(), &line, paths).await
    }

    async fn run_rendered<H: EditorHost>(
        &self,
        surface: &mut OutputSurface<H>,
        name: &str,
        line: &CommandLine,
        paths: &[PathBuf],
    ) -> HypnoResult<RunOutcome> {
        let mut formatter = MessageFormatter::new(surface);
        formatter.add_command(name, Some(&line.display()))?;
        formatter.add_files(paths.iter().map(|p| p.display().to_string()))?;

        let output = match self.dispatcher.run(line).await {
            Ok(output) => output,
            Err(err) => {
                formatter.add_error(&err.to_string(), None)?;
                formatter.end_command()?;
                return Err(err.into());
            }
        };

        formatter.add_result(&output.stdout_text())?;
        formatter.add_error(&output.stderr_text(), output.code)?;
        formatter.end_command()?;

        let outcome = RunOutcome::from_output(&output);
        info!(command = name, code = ?outcome.code, conflicts = outcome.conflicts, "command finished");
        Ok(outcome)
    }
}
