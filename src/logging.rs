//! Logging infrastructure for hypnosvn.
//!
//! Logging is off unless a level is given with `--log-level` or
//! `HYPNOSVN_LOG_LEVEL`. Events go to stderr, or to a file with `--log-file`,
//! as text or JSON. Command output itself never goes through the logger; it
//! is rendered by the output surface.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Target prefix of every event emitted by this crate.
const LOG_TARGET: &str = "hypnosvn";

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a log level from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Filter directive restricting events to this crate.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("{LOG_TARGET}={}", self.as_filter_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level (None means logging is disabled).
    pub level: Option<LogLevel>,
    /// Output file path (None means stderr).
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

/// Keeps the background log writer alive; pending events flush on drop.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize the logging system.
///
/// Returns `None` when logging is disabled, when the log file cannot be
/// opened, or when a global subscriber is already installed. Hold the guard
/// until exit.
///
/// # Example
///
/// ```rust,no_run
/// use hypnosvn::logging::{LogConfig, LogLevel, LogFormat, init_logging};
/// use std::path::PathBuf;
///
/// let config = LogConfig {
///     level: Some(LogLevel::Debug),
///     file: Some(PathBuf::from("/tmp/hypnosvn.log")),
///     format: LogFormat::Json,
/// };
///
/// let _guard = init_logging(config);
/// ```
#[must_use = "the returned guard must be held until application exit"]
pub fn init_logging(config: LogConfig) -> Option<LogGuard> {
    let level = config.level?;
    let filter = EnvFilter::new(level.directive());

    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    // File and line only in file logs
    let with_location = config.file.is_some();

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(with_location)
                    .with_line_number(with_location),
            )
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .with_file(with_location)
                    .with_line_number(with_location)
                    .compact(),
            )
            .try_init(),
    };
    installed.ok()?;

    Some(LogGuard { _guard: guard })
}

/// Parse logging configuration from command-line arguments and environment.
///
/// Runs before clap so that argument parsing itself can be logged.
/// Precedence: CLI args > `HYPNOSVN_LOG_*` environment variables.
#[must_use]
pub fn parse_early_log_config(args: &[String]) -> LogConfig {
    let pick = |flag: &str, var: &str| {
        extract_arg_value(args, flag).or_else(|| std::env::var(var).ok())
    };

    LogConfig {
        level: pick("--log-level", "HYPNOSVN_LOG_LEVEL").and_then(|s| LogLevel::parse(&s)),
        file: pick("--log-file", "HYPNOSVN_LOG_FILE").map(PathBuf::from),
        format: pick("--log-format", "HYPNOSVN_LOG_FORMAT")
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or_default(),
    }
}

/// Extract a value following a flag, in either `--flag value` or `--flag=value` form.
fn extract_arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    args.iter()
        .find_map(|a| a.strip_prefix(&prefix).map(str::to_string))
        .or_else(|| args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone()))
}
