//! Logging setup on `tracing-subscriber`.
//!
//! Inbound messages are logged at `info` under [`MESSAGE_TARGET`], so a
//! filter such as `"sigil::messages" = "warn"` silences the chat log without
//! touching anything else:
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! "sigil::messages" = "warn"
//!
//! [logging.span_events]
//! close = true
//! ```
//!
//! Dispatch opens a `dispatch` span per event and a `command` span per
//! handler task. With `span_events.close` each handler's run time is logged
//! when its span closes.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Target of the inbound message log lines.
pub const MESSAGE_TARGET: &str = "sigil::messages";

const DEFAULT_LOG_FILE: &str = "sigil.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl SpanEventConfig {
    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |span, (_, event)| span | event)
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Assembles the global subscriber.
#[derive(Debug, Clone, Default)]
pub struct LoggingBuilder {
    level: Option<tracing::Level>,
    directives: Vec<String>,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    thread_ids: bool,
    file_location: bool,
    span_events: SpanEventConfig,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: Some(config.level.to_tracing_level()),
            directives: config
                .filters
                .iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            thread_ids: config.thread_ids,
            file_location: config.file_location,
            span_events: config.span_events,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Adds a filter directive such as `sigil_framework=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Writes to `path` instead of a terminal stream.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = LogOutput::File;
        self.file_path = Some(path.into());
        self
    }

    pub fn span_events(mut self, events: SpanEventConfig) -> Self {
        self.span_events = events;
        self
    }

    /// `RUST_LOG` replaces the configured level; directives apply on top.
    fn build_filter(&self) -> EnvFilter {
        let level = self.level.unwrap_or(tracing::Level::INFO);
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("Ignoring invalid log directive '{directive}': {e}"),
            }
        }

        filter
    }

    /// Picks the writer and whether it gets ANSI colours.
    ///
    /// File output falls back to stdout when no usable file is configured.
    fn writer(&self) -> (BoxMakeWriter, bool) {
        match self.output {
            LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
            LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
            LogOutput::File => match self.file_path.as_deref().map(open_log_file) {
                Some(Ok(appender)) => (BoxMakeWriter::new(appender), false),
                Some(Err(e)) => {
                    eprintln!("Cannot open log file, logging to stdout: {e}");
                    (BoxMakeWriter::new(std::io::stdout), true)
                }
                None => (BoxMakeWriter::new(std::io::stdout), true),
            },
        }
    }

    fn layer(&self, writer: BoxMakeWriter, ansi: bool) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_span_events(self.span_events.to_fmt_span())
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);

        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        }
    }

    /// Installs the subscriber. Errors are ignored.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber, failing if one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let (writer, ansi) = self.writer();
        tracing_subscriber::registry()
            .with(self.layer(writer, ansi))
            .with(self.build_filter())
            .try_init()?;

        if self.output == LogOutput::File && self.file_path.is_none() {
            warn!("File output requested but no file path configured, logging to stdout");
        }
        Ok(())
    }
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
}
