use crate::{config::Settings, config::keys, parsed_property::ParsedProperty};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Where command output is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputTo {
    /// The editor's bottom output panel.
    #[default]
    Panel,
    /// A read-only scratch tab.
    Tab,
    /// A modal dialog shown once per command.
    Dialog,
}

impl OutputTo {
    /// Parse a setting value; unknown values yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "panel" => Some(Self::Panel),
            "tab" => Some(Self::Tab),
            "dialog" => Some(Self::Dialog),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::Tab => "tab",
            Self::Dialog => "dialog",
        }
    }
}

impl std::fmt::Display for OutputTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the output view scrolls on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollTo {
    /// Keep the last line visible after every message.
    Bottom,
    /// Scroll the end of the text to the top when a command starts.
    #[default]
    Command,
    /// Never scroll.
    Off,
}

impl ScrollTo {
    /// Any string other than `bottom` or `command` disables scrolling.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "bottom" => Self::Bottom,
            "command" => Self::Command,
            _ => Self::Off,
        }
    }
}

/// Gutter mark drawn next to conflicted lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gutter {
    None,
    Icon(String),
}

impl Default for Gutter {
    fn default() -> Self {
        Gutter::Icon(DEFAULT_GUTTER_ICON.to_string())
    }
}

pub const DEFAULT_GUTTER_ICON: &str = "circle";

impl Gutter {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "none" => Gutter::None,
            "" => Gutter::default(),
            icon => Gutter::Icon(icon.to_string()),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            Gutter::None => None,
            Gutter::Icon(icon) => Some(icon),
        }
    }
}

/// Paths shared by every SVN subcommand.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct PathArgs {
    /// Files or directories to operate on (defaults to the current directory)
    pub paths: Vec<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Update the selected paths with TortoiseSVN
    Update(PathArgs),
    /// Commit the selected paths with TortoiseSVN
    Commit(PathArgs),
    /// Diff local modifications with TortoiseSVN
    Diff(PathArgs),
    /// Diff the last committed revision against its predecessor
    DiffPrevious(PathArgs),
    /// Show `svn status` for the selected paths
    Status(PathArgs),
}

#[derive(Parser, Clone, Debug)]
#[command(
    name = "hypnosvn",
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about = "Run TortoiseSVN and svn commands and render their output",
    long_about = "Run TortoiseSVN and svn commands on files and render the command echo,\n\
        file list, output and errors the way the editor integration does.\n\n\
        Settings come from CLI arguments, environment variables (HYPNOSVN_*),\n\
        and the settings file (~/.config/hypnosvn/settings.toml).",
    after_help = "EXAMPLES:\n    \
        # Update two files and highlight conflicts\n    \
        hypnosvn update src/main.c src/util.c\n\n    \
        # Show status in a dialog instead of the panel\n    \
        hypnosvn --output-to dialog status .\n\n    \
        # Create sample settings file\n    \
        hypnosvn --create-config"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Where output is rendered
    #[arg(long, value_enum, global = true, help_heading = "Output Options")]
    pub output_to: Option<OutputTo>,

    /// Echo the raw command line before its output
    #[arg(long, global = true, help_heading = "Output Options")]
    pub raw_command: bool,

    /// Path to TortoiseProc.exe
    #[arg(long, global = true, help_heading = "Tools")]
    pub tortoiseproc_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_file: Option<PathBuf>,

    /// Log format (text, json)
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_format: Option<String>,

    /// Create a sample settings file at ~/.config/hypnosvn/settings.toml
    #[arg(long)]
    pub create_config: bool,
}

impl Args {
    /// Settings given on the command line, tagged with their CLI origin.
    pub fn cli_settings(&self) -> Settings {
        let mut settings = Settings::empty();
        if let Some(output_to) = self.output_to {
            settings.insert(
                keys::OUTPUT_TO,
                ParsedProperty::Cli(
                    Value::from(output_to.as_str()),
                    format!("--output-to {}", output_to),
                ),
            );
        }
        if self.raw_command {
            settings.insert(
                keys::OUTPUT_RAW_COMMAND,
                ParsedProperty::Cli(Value::Bool(true), "--raw-command".to_string()),
            );
        }
        if let Some(path) = &self.tortoiseproc_path {
            let path = path.display().to_string();
            settings.insert(
                keys::TORTOISEPROC_PATH,
                ParsedProperty::Cli(Value::from(path.clone()), path),
            );
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Output Destination Parsing
    ///
    /// Verifies the closed set of destination names.
    ///
    /// ## Test Scenario
    /// - Parses each valid name and an unknown one
    ///
    /// ## Expected Outcome
    /// - Valid names map to their variant, unknown names yield None
    #[test]
    fn test_output_to_parse() {
        assert_eq!(OutputTo::parse("panel"), Some(OutputTo::Panel));
        assert_eq!(OutputTo::parse("tab"), Some(OutputTo::Tab));
        assert_eq!(OutputTo::parse("dialog"), Some(OutputTo::Dialog));
        assert_eq!(OutputTo::parse("window"), None);
        assert_eq!(OutputTo::default(), OutputTo::Panel);
    }

    #[test]
    fn test_scroll_to_parse() {
        assert_eq!(ScrollTo::parse("bottom"), ScrollTo::Bottom);
        assert_eq!(ScrollTo::parse("command"), ScrollTo::Command);
        assert_eq!(ScrollTo::parse("never"), ScrollTo::Off);
    }

    /// # Gutter Parsing
    ///
    /// Verifies that `none` disables the gutter and other names pass through.
    ///
    /// ## Test Scenario
    /// - Parses `none`, an icon name and an empty string
    ///
    /// ## Expected Outcome
    /// - `none` has no icon, names are kept, empty falls back to the circle
    #[test]
    fn test_gutter_parse() {
        assert_eq!(Gutter::parse("none").icon(), None);
        assert_eq!(Gutter::parse("dot").icon(), Some("dot"));
        assert_eq!(Gutter::parse("").icon(), Some(DEFAULT_GUTTER_ICON));
    }

    /// # CLI Settings
    ///
    /// Verifies that command-line flags become CLI-sourced settings.
    ///
    /// ## Test Scenario
    /// - Parses args with --output-to and --raw-command
    ///
    /// ## Expected Outcome
    /// - Settings carry the values with the `cli` source
    #[test]
    fn test_cli_settings() {
        let args =
            Args::try_parse_from(["hypnosvn", "--output-to", "tab", "--raw-command", "status"])
                .unwrap();
        let settings = args.cli_settings();

        assert_eq!(settings.output_to(), OutputTo::Tab);
        assert!(settings.raw_command());
        assert_eq!(
            settings.property(keys::OUTPUT_TO).map(|p| p.source_name()),
            Some("cli")
        );
        assert!(matches!(args.command, Some(Commands::Status(_))));
    }
}
