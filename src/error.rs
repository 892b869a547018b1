//! Unified error handling for the hypnosvn library.
//!
//! This module provides the error hierarchy using `thiserror`. Most of the
//! output surface never fails: a missing destination or an empty payload is a
//! silent no-op. What remains are genuinely irrecoverable conditions (the
//! editor host refusing to create a panel, a missing TortoiseProc executable)
//! and configuration problems.
//!
//! ## Error Categories
//!
//! - [`HostError`]: Failures reported by the editor host
//! - [`ConfigError`]: Errors from settings loading and validation
//! - [`SvnError`]: Errors from invoking TortoiseProc or `svn`
//!
//! ## Example
//!
//! ```rust
//! use hypnosvn::error::{HypnoError, SvnError};
//!
//! fn example() -> Result<(), HypnoError> {
//!     // Errors are automatically converted via From trait
//!     Err(SvnError::NoPath)?;
//!     Ok(())
//! }
//!
//! assert!(example().is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::host::ViewId;

/// The main error type for the hypnosvn library.
#[derive(Error, Debug)]
pub enum HypnoError {
    /// The editor host failed to perform a required operation.
    #[error("Editor host error: {0}")]
    Host(#[from] HostError),

    /// An error occurred while loading or validating settings.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An error occurred while invoking an SVN tool.
    #[error("SVN error: {0}")]
    Svn(#[from] SvnError),

    /// A generic error for cases not covered by specific error types.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Errors reported by an [`EditorHost`](crate::host::EditorHost).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host could not create the output panel.
    #[error("Failed to create output panel '{panel_id}'")]
    PanelCreationFailed {
        /// Identifier of the panel that could not be created.
        panel_id: String,
    },

    /// The host could not create a scratch document.
    #[error("Failed to create view: {message}")]
    ViewCreationFailed {
        /// Description of the failure.
        message: String,
    },

    /// An operation referenced a view the host does not know about.
    #[error("Unknown view: {view}")]
    UnknownView {
        /// The unknown view.
        view: ViewId,
    },
}

/// Errors that can occur during settings loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting holds a value outside its allowed set.
    #[error("Invalid value '{value}' for {key} from {origin} (expected {expected})")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// The rejected value.
        value: String,
        /// Where the value was set.
        origin: String,
        /// Human-readable description of the accepted values.
        expected: String,
    },

    /// Failed to read the settings file.
    #[error("Failed to read settings file at {path}: {message}")]
    ReadFailed {
        /// Path to the settings file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the settings file.
    #[error("Failed to parse settings file at {path}: {message}")]
    ParseFailed {
        /// Path to the settings file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Failed to write the settings file.
    #[error("Failed to write settings file at {path}: {message}")]
    WriteFailed {
        /// Path to the settings file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to create the settings directory.
    #[error("Failed to create settings directory at {path}: {message}")]
    DirectoryCreationFailed {
        /// Path where directory creation failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Errors that can occur when invoking TortoiseProc or `svn`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SvnError {
    /// The configured TortoiseProc executable does not exist.
    #[error("Can't find TortoiseProc.exe at '{path}', please set tortoiseproc_path in the settings file")]
    ToolNotFound {
        /// Configured executable path.
        path: PathBuf,
    },

    /// Neither a selection nor an active document provided a path.
    #[error("No path selected and no active document")]
    NoPath,

    /// The process could not be started.
    #[error("Failed to run {program}: {message}")]
    SpawnFailed {
        /// Program that failed to start.
        program: String,
        /// OS error message.
        message: String,
    },

    /// `svn info` output had no `Last Changed Rev` line.
    #[error("No 'Last Changed Rev' found in svn info output")]
    RevisionNotFound,
}

/// Type alias for Results using HypnoError.
///
/// Note: This is not re-exported from the crate root to avoid shadowing `anyhow::Result`.
pub type HypnoResult<T> = std::result::Result<T, HypnoError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// # Host Error Display
    ///
    /// Tests that host errors display correctly formatted messages.
    ///
    /// ## Test Scenario
    /// - Creates each HostError variant
    /// - Tests their Display implementation
    ///
    /// ## Expected Outcome
    /// - Messages mention the panel id or view involved
    #[test]
    fn test_host_error_display() {
        let panel = HostError::PanelCreationFailed {
            panel_id: "svn-output".to_string(),
        };
        assert!(panel.to_string().contains("svn-output"));

        let unknown = HostError::UnknownView { view: ViewId(7) };
        assert!(unknown.to_string().contains('7'));
    }

    /// # SVN Error Display
    ///
    /// Tests that SVN errors point the user at the misconfigured setting.
    ///
    /// ## Test Scenario
    /// - Creates a ToolNotFound error
    ///
    /// ## Expected Outcome
    /// - Message names the path and the tortoiseproc_path setting
    #[test]
    fn test_svn_error_display() {
        let err = SvnError::ToolNotFound {
            path: PathBuf::from("C:/missing/TortoiseProc.exe"),
        };
        let msg = err.to_string();
        assert!(msg.contains("C:/missing/TortoiseProc.exe"));
        assert!(msg.contains("tortoiseproc_path"));
    }

    /// # Error Conversion
    ///
    /// Tests that errors convert correctly through the From trait.
    ///
    /// ## Test Scenario
    /// - Creates specific error types
    /// - Converts them to HypnoError
    ///
    /// ## Expected Outcome
    /// - All error types convert seamlessly to HypnoError
    #[test]
    fn test_error_conversion() {
        let host: HypnoError = HostError::ViewCreationFailed {
            message: "no window".to_string(),
        }
        .into();
        assert!(matches!(host, HypnoError::Host(_)));

        let svn: HypnoError = SvnError::NoPath.into();
        assert!(matches!(svn, HypnoError::Svn(_)));

        let config: HypnoError = ConfigError::InvalidValue {
            key: "outputTo".to_string(),
            value: "window".to_string(),
            origin: "env HYPNOSVN_OUTPUT_TO".to_string(),
            expected: "panel, tab or dialog".to_string(),
        }
        .into();
        assert!(matches!(config, HypnoError::Config(_)));
        assert!(config.to_string().contains("window"));
    }
}
