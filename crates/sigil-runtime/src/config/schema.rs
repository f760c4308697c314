//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sigil_framework::Mode;

/// Root configuration structure.
///
/// Every field has a default, so an empty source yields a working public bot
/// with the `.` prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigilConfig {
    /// Raw command prefix: a literal list such as `.,!`, a regex starting
    /// with `^`, `false` for no prefix or `null` for the literal word.
    #[serde(default = "default_handlers")]
    pub handlers: String,

    /// Comma-separated administrator numbers.
    #[serde(default)]
    pub sudo: String,

    #[serde(default)]
    pub mode: Mode,

    /// Log every inbound message.
    #[serde(default = "default_true")]
    pub log_msg: bool,

    /// Mark every inbound message read.
    #[serde(default = "default_true")]
    pub read_msg: bool,

    /// Mark messages that fired a pattern command read.
    #[serde(default = "default_true")]
    pub read_cmd: bool,

    /// Report handler faults to the administrative chat.
    #[serde(default = "default_true")]
    pub error_msg: bool,

    /// Announce the bot in the administrative chat on startup.
    #[serde(default = "default_true")]
    pub notify_on_connect: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            handlers: default_handlers(),
            sudo: String::new(),
            mode: Mode::default(),
            log_msg: true,
            read_msg: true,
            read_cmd: true,
            error_msg: true,
            notify_on_connect: true,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_handlers() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Append to [`LoggingConfig::file_path`].
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `sigil_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SigilConfig::default();
        assert_eq!(config.handlers, ".");
        assert_eq!(config.mode, Mode::Public);
        assert!(config.log_msg && config.read_msg && config.read_cmd && config.error_msg);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.output, LogOutput::Stdout);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }
}
