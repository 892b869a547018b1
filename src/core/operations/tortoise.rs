//! TortoiseProc and `svn` command lines.
//!
//! TortoiseProc takes every selected path in a single `/path:"a*b"` argument,
//! separated by `*`. The `svn` CLI helpers take each path as its own argument.

use crate::error::SvnError;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Separator between paths in TortoiseProc's `/path` argument.
pub const PATH_SEPARATOR: &str = "*";

/// `/closeonend` value that closes the dialog when no errors or conflicts occurred.
const CLOSE_ON_END_NO_ERRORS: u8 = 3;

static LAST_CHANGED_REV_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_last_changed_rev_regex() -> &'static Regex {
    LAST_CHANGED_REV_REGEX.get_or_init(|| {
        Regex::new(r"(?m)Last Changed Rev: (\d+)")
            .expect("Failed to compile Last Changed Rev regex")
    })
}

/// Join selected paths into TortoiseProc's multi-path form.
///
/// Returns `None` when nothing is selected.
pub fn join_paths<P: AsRef<Path>>(paths: &[P]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }
    Some(
        paths
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR),
    )
}

/// The selected paths, or the active document when nothing is selected.
pub fn resolve_paths(selected: &[PathBuf], active: Option<&Path>) -> Result<Vec<PathBuf>, SvnError> {
    if !selected.is_empty() {
        return Ok(selected.to_vec());
    }
    active
        .map(|path| vec![path.to_path_buf()])
        .ok_or(SvnError::NoPath)
}

/// A program invocation as rendered into the output and handed to a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Arguments already carry their own quoting and must reach the
    /// process unescaped.
    pub verbatim: bool,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            verbatim: false,
        }
    }

    /// The command as a user would type it.
    pub fn display(&self) -> String {
        let program = self.program.display().to_string();
        let program = if program.contains(' ') {
            format!("\"{program}\"")
        } else {
            program
        };
        std::iter::once(program)
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A TortoiseProc dialog command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TortoiseCommand {
    Update { auto_close: bool },
    Commit { auto_close: bool },
    Diff,
    /// Diff between two revisions; `end_rev` is `svnversion` output as-is.
    DiffPrevious { start_rev: u64, end_rev: String },
}

impl TortoiseCommand {
    /// Name shown in the `Command:` header.
    pub fn name(&self) -> &'static str {
        match self {
            TortoiseCommand::Update { .. } => "Update",
            TortoiseCommand::Commit { .. } => "Commit",
            TortoiseCommand::Diff => "Diff",
            TortoiseCommand::DiffPrevious { .. } => "Diff Previous",
        }
    }

    /// Arguments before `/path`.
    pub fn arguments(&self) -> Vec<String> {
        let close_on_end = |auto_close: bool| {
            let value = if auto_close { CLOSE_ON_END_NO_ERRORS } else { 0 };
            format!("/closeonend:{value}")
        };
        match self {
            TortoiseCommand::Update { auto_close } => {
                vec!["/command:update".to_string(), close_on_end(*auto_close)]
            }
            TortoiseCommand::Commit { auto_close } => {
                vec!["/command:commit".to_string(), close_on_end(*auto_close)]
            }
            TortoiseCommand::Diff => vec!["/command:diff".to_string()],
            TortoiseCommand::DiffPrevious { start_rev, end_rev } => vec![
                "/command:diff".to_string(),
                format!("/startrev:{start_rev}"),
                format!("/endrev:{end_rev}"),
            ],
        }
    }

    /// Full TortoiseProc invocation for `joined_path` (see [`join_paths`]).
    pub fn command_line(&self, tortoiseproc: &Path, joined_path: &str) -> CommandLine {
        let mut args = self.arguments();
        args.push(format!("/path:\"{joined_path}\""));
        CommandLine {
            program: tortoiseproc.to_path_buf(),
            args,
            verbatim: true,
        }
    }
}

fn svn_command<P: AsRef<Path>>(program: &str, subcommand: Option<&str>, paths: &[P]) -> CommandLine {
    let args = subcommand
        .map(str::to_string)
        .into_iter()
        .chain(paths.iter().map(|p| p.as_ref().display().to_string()))
        .collect();
    CommandLine::new(program, args)
}

/// `svn status <paths>`
pub fn status_command<P: AsRef<Path>>(paths: &[P]) -> CommandLine {
    svn_command("svn", Some("status"), paths)
}

/// `svn info <path>`
pub fn info_command(path: &Path) -> CommandLine {
    svn_command("svn", Some("info"), &[path])
}

/// `svnversion <path>`
pub fn version_command(path: &Path) -> CommandLine {
    svn_command("svnversion", None, &[path])
}

/// Extract the `Last Changed Rev` from `svn info` output.
pub fn parse_last_changed_rev(info: &str) -> Result<u64, SvnError> {
    get_last_changed_rev_regex()
        .captures(info)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(SvnError::RevisionNotFound)
}

/// The revision before the last change, the start of a "diff previous".
pub fn previous_revision(info: &str) -> Result<u64, SvnError> {
    parse_last_changed_rev(info).map(|rev| rev.saturating_sub(1))
}

/// A file with local modifications shows up in `svn status`.
pub fn diff_visible(status: &str) -> bool {
    !status.is_empty()
}

/// An unmodified file has no `svn status` output.
pub fn diff_previous_visible(status: &str) -> bool {
    status.is_empty()
}
