//! Settings management for hypnosvn.
//!
//! Settings are a passive key-value store. Values come from several sources:
//! - Built-in defaults
//! - A TOML settings file following the XDG Base Directory specification
//! - An editor-style JSON settings document
//! - Environment variables
//! - Command-line flags
//!
//! Every value keeps its origin as a [`ParsedProperty`]. Reads go through
//! typed accessors that fail closed: a missing key, a value of the wrong type
//! or an unknown enumerated string resolves to the documented default.
//!
//! ## Example
//!
//! ```rust
//! use hypnosvn::config::{Settings, keys};
//! use hypnosvn::models::OutputTo;
//!
//! let mut settings = Settings::default();
//! assert_eq!(settings.output_to(), OutputTo::Panel);
//!
//! settings.set(keys::OUTPUT_TO, "tab");
//! assert_eq!(settings.output_to(), OutputTo::Tab);
//!
//! // A value of the wrong type falls back to the default
//! settings.set(keys::OUTPUT_TO, 42);
//! assert_eq!(settings.output_to(), OutputTo::Panel);
//! ```

use crate::{
    core::output::HighlightStyle,
    error::ConfigError,
    models::{Gutter, OutputTo, ScrollTo},
    parsed_property::ParsedProperty,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings keys, named as in the editor settings file.
pub mod keys {
    pub const OUTPUT_TO: &str = "outputTo";
    pub const OUTPUT_SCROLL_TO: &str = "outputScrollTo";
    pub const OUTPUT_RAW_COMMAND: &str = "outputRawCommand";
    pub const OUTPUT_GUTTER: &str = "outputGutter";
    pub const OUTPUT_HIGHLIGHT: &str = "outputHighlight";
    pub const TORTOISEPROC_PATH: &str = "tortoiseproc_path";
    pub const AUTO_CLOSE_UPDATE_DIALOG: &str = "autoCloseUpdateDialog";
    pub const AUTO_CLOSE_COMMIT_DIALOG: &str = "autoCloseCommitDialog";
}

const DEFAULT_TORTOISEPROC_PATH: &str = r"C:\Program Files\TortoiseSVN\bin\TortoiseProc.exe";

/// Environment variable for each settings key.
const ENV_VARS: &[(&str, &str)] = &[
    (keys::OUTPUT_TO, "HYPNOSVN_OUTPUT_TO"),
    (keys::OUTPUT_SCROLL_TO, "HYPNOSVN_OUTPUT_SCROLL_TO"),
    (keys::OUTPUT_RAW_COMMAND, "HYPNOSVN_OUTPUT_RAW_COMMAND"),
    (keys::OUTPUT_GUTTER, "HYPNOSVN_OUTPUT_GUTTER"),
    (keys::OUTPUT_HIGHLIGHT, "HYPNOSVN_OUTPUT_HIGHLIGHT"),
    (keys::TORTOISEPROC_PATH, "HYPNOSVN_TORTOISEPROC_PATH"),
    (keys::AUTO_CLOSE_UPDATE_DIALOG, "HYPNOSVN_AUTO_CLOSE_UPDATE_DIALOG"),
    (keys::AUTO_CLOSE_COMMIT_DIALOG, "HYPNOSVN_AUTO_CLOSE_COMMIT_DIALOG"),
];

/// Settings store with source tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, ParsedProperty<Value>>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut settings = Self::empty();
        let defaults = [
            (keys::OUTPUT_TO, Value::from("panel")),
            (keys::OUTPUT_SCROLL_TO, Value::from("command")),
            (keys::OUTPUT_RAW_COMMAND, Value::Bool(false)),
            (keys::OUTPUT_GUTTER, Value::from("circle")),
            (keys::OUTPUT_HIGHLIGHT, Value::from("none")),
            (keys::TORTOISEPROC_PATH, Value::from(DEFAULT_TORTOISEPROC_PATH)),
            (keys::AUTO_CLOSE_UPDATE_DIALOG, Value::Bool(false)),
            (keys::AUTO_CLOSE_COMMIT_DIALOG, Value::Bool(false)),
        ];
        for (key, value) in defaults {
            settings.insert(key, ParsedProperty::Default(value));
        }
        settings
    }
}

impl Settings {
    /// A store with no values at all, not even defaults.
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: &str, value: ParsedProperty<Value>) {
        self.values.insert(key.to_string(), value);
    }

    /// Set a value at runtime, as the editor would after the user edits settings.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let original = value.to_string();
        self.insert(key, ParsedProperty::Cli(value, original));
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn property(&self, key: &str) -> Option<&ParsedProperty<Value>> {
        self.values.get(key)
    }

    /// Read a string setting; absent or non-string values yield `default`.
    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(|p| p.as_str())
            .unwrap_or(default)
            .to_string()
    }

    /// Read a boolean setting; absent or non-boolean values yield `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values
            .get(key)
            .and_then(|p| p.as_bool())
            .unwrap_or(default)
    }

    pub fn output_to(&self) -> OutputTo {
        OutputTo::parse(&self.get_str(keys::OUTPUT_TO, "panel")).unwrap_or_default()
    }

    pub fn scroll_to(&self) -> ScrollTo {
        ScrollTo::parse(&self.get_str(keys::OUTPUT_SCROLL_TO, "command"))
    }

    pub fn raw_command(&self) -> bool {
        self.get_bool(keys::OUTPUT_RAW_COMMAND, false)
    }

    pub fn gutter(&self) -> Gutter {
        Gutter::parse(&self.get_str(keys::OUTPUT_GUTTER, "circle"))
    }

    pub fn highlight(&self) -> HighlightStyle {
        HighlightStyle::parse(&self.get_str(keys::OUTPUT_HIGHLIGHT, "none"))
    }

    pub fn tortoiseproc_path(&self) -> PathBuf {
        PathBuf::from(self.get_str(keys::TORTOISEPROC_PATH, DEFAULT_TORTOISEPROC_PATH))
    }

    pub fn auto_close_update_dialog(&self) -> bool {
        self.get_bool(keys::AUTO_CLOSE_UPDATE_DIALOG, false)
    }

    pub fn auto_close_commit_dialog(&self) -> bool {
        self.get_bool(keys::AUTO_CLOSE_COMMIT_DIALOG, false)
    }

    /// Report enumerated settings whose value is not one of the accepted strings.
    ///
    /// The accessors already fall back to defaults; this only exists so a
    /// front end can warn about typos.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        let mut check = |key: &str, accepted: &[&str]| {
            let Some(property) = self.values.get(key) else {
                return;
            };
            if let Some(value) = property.as_str() {
                if !accepted.contains(&value) {
                    problems.push(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        origin: property.origin(),
                        expected: accepted.join(", "),
                    });
                }
            }
        };
        check(keys::OUTPUT_TO, &["panel", "tab", "dialog"]);
        check(
            keys::OUTPUT_HIGHLIGHT,
            &["outline", "fill", "solid", "squiggly", "stippled", "none"],
        );
        problems
    }

    /// Load settings from the XDG settings file, if it exists.
    ///
    /// Only keys present in the file are returned; merge onto
    /// [`Settings::default`] to fill in the rest.
    pub fn load_from_file() -> Result<Self, ConfigError> {
        let path = Self::get_config_path()?;
        if !path.exists() {
            return Ok(Self::empty());
        }
        Self::load_from_path(&path)
    }

    /// Load a TOML settings file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Parse TOML settings; `path` is recorded as the values' source.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let table: Map<String, Value> =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::from_map(table, |value| {
            let original = value.to_string();
            ParsedProperty::File(value, path.to_path_buf(), original)
        }))
    }

    /// Parse an editor-style JSON settings document.
    pub fn from_json_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let object: Map<String, Value> =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::from_map(object, |value| {
            let original = value.to_string();
            ParsedProperty::File(value, path.to_path_buf(), original)
        }))
    }

    fn from_map(
        map: Map<String, Value>,
        wrap: impl Fn(Value) -> ParsedProperty<Value>,
    ) -> Self {
        Self {
            values: map.into_iter().map(|(k, v)| (k, wrap(v))).collect(),
        }
    }

    /// Load settings from `HYPNOSVN_*` environment variables.
    ///
    /// `true`/`false` become booleans; everything else stays a string.
    pub fn load_from_env() -> Self {
        let mut settings = Self::empty();
        for (key, var) in ENV_VARS {
            if let Ok(raw) = std::env::var(var) {
                let value = match raw.parse::<bool>() {
                    Ok(b) => Value::Bool(b),
                    Err(_) => Value::from(raw.clone()),
                };
                settings.insert(key, ParsedProperty::Env(value, raw));
            }
        }
        settings
    }

    /// Merge this store with another, preferring values from other when they exist
    pub fn merge(mut self, other: Self) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Get the XDG settings file path for hypnosvn
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        // Use XDG_CONFIG_HOME if set, otherwise ~/.config
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .map(|home| home.join(".config"))
                .ok_or_else(|| ConfigError::DirectoryCreationFailed {
                    path: PathBuf::from("~/.config"),
                    message: "could not determine home directory".to_string(),
                })?,
        };
        Ok(config_dir.join("hypnosvn").join("settings.toml"))
    }

    /// Create a sample settings file for user reference.
    ///
    /// Returns the path of the file; an existing file is left untouched.
    pub fn create_sample_config() -> Result<PathBuf, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::write_sample_config(&config_path)?;
        Ok(config_path)
    }

    fn write_sample_config(config_path: &Path) -> Result<(), ConfigError> {
        // Don't overwrite existing settings
        if config_path.exists() {
            return Ok(());
        }

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let sample_config = r#"# hypnosvn settings
# Location: ~/.config/hypnosvn/settings.toml

# Path to TortoiseProc.exe
# tortoiseproc_path = 'C:\Program Files\TortoiseSVN\bin\TortoiseProc.exe'

# Close the TortoiseSVN update/commit dialogs when they finish without errors
autoCloseUpdateDialog = false
autoCloseCommitDialog = false

# Where output goes: "panel", "tab" or "dialog"
outputTo = "panel"

# Auto-scroll: "bottom" after every message, "command" when a command starts,
# anything else to disable
outputScrollTo = "command"

# Echo the raw TortoiseProc/svn command line
outputRawCommand = false

# Gutter icon for conflicted files, or "none"
outputGutter = "circle"

# Inline conflict style: "outline", "fill", "solid", "squiggly", "stippled" or "none"
outputHighlight = "none"
"#;

        fs::write(config_path, sample_config).map_err(|e| ConfigError::WriteFailed {
            path: config_path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
