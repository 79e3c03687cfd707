//! Subscriber setup for the `agent-router` binary
//!
//! Library code only emits `tracing` events. The binary installs one subscriber
//! here, configured from the environment:
//!
//! | Variable     | Values                                 | Default |
//! |--------------|----------------------------------------|---------|
//! | `LOG_LEVEL`  | error, warn, info, debug, trace        | info    |
//! | `LOG_FORMAT` | json, pretty, compact                  | json    |
//! | `LOG_SPANS`  | true to record span open/close events  | off     |
//! | `RUST_LOG`   | full filter directives, overrides level | unset   |
//!
//! Log lines always go to stderr. Stdout belongs to command output, such as the
//! JSON route outcomes printed by `agent-router simulate`, so it can be piped.

use std::env;
use std::fmt as std_fmt;
use std::str::FromStr;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan, MakeWriter},
    prelude::*,
    EnvFilter,
};

/// How log records are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per record
    #[default]
    Json,
    /// Multi-line records with colors
    Pretty,
    /// Single-line records with colors and no target
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl std_fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized `LOG_FORMAT` value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log format: {0}")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
            v if v.eq_ignore_ascii_case("pretty") => Ok(LogFormat::Pretty),
            v if v.eq_ignore_ascii_case("compact") => Ok(LogFormat::Compact),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

/// Span lifecycle events to record, if any
fn span_events(include_spans: bool) -> FmtSpan {
    if include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// `RUST_LOG` when set, otherwise `level` with dependency noise turned down
fn env_filter(level: Level) -> EnvFilter {
    match env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => {
            let filter = EnvFilter::new(level.to_string());
            match "tokio=warn".parse::<Directive>() {
                Ok(directive) => filter.add_directive(directive),
                Err(_) => filter,
            }
        }
    }
}

/// Assemble a subscriber that renders `format` into `writer`
pub fn build_subscriber<W>(
    filter: EnvFilter,
    format: LogFormat,
    include_spans: bool,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::registry().with(filter);
    let spans = span_events(include_spans);

    match format {
        LogFormat::Json => Box::new(
            subscriber.with(
                fmt::layer()
                    .json()
                    .with_span_events(spans)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Pretty => Box::new(
            subscriber.with(
                fmt::layer()
                    .pretty()
                    .with_ansi(true)
                    .with_span_events(spans)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Compact => Box::new(
            subscriber.with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(false)
                    .with_span_events(spans)
                    .with_writer(writer),
            ),
        ),
    }
}

/// Install the process-wide subscriber, writing to stderr
///
/// A subscriber that is already installed is left in place.
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let subscriber = build_subscriber(env_filter(level), format, include_spans, std::io::stderr);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global subscriber already set, keeping existing one");
    }
}

/// `LOG_SPANS` is enabled only by a case-insensitive "true"
pub fn parse_spans_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Map a `LOG_LEVEL` value to a tracing level, defaulting to INFO
pub fn parse_level(s: &str) -> Level {
    match s.to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "INFO" => Level::INFO,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Raise the level by CLI verbosity count (-v = DEBUG, -vv = TRACE)
pub fn level_for_verbosity(base: Level, verbose: u8) -> Level {
    match verbose {
        0 => base,
        // More verbose levels compare greater.
        1 => base.max(Level::DEBUG),
        _ => Level::TRACE,
    }
}

/// Initialize logging from environment variables, raised by CLI verbosity
pub fn init_logging_from_env(verbose: u8) {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());

    let level = level_for_verbosity(parse_level(&log_level), verbose);

    let log_format: LogFormat = env::var("LOG_FORMAT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    let include_spans = env::var("LOG_SPANS")
        .map(|value| parse_spans_flag(&value))
        .unwrap_or(false);

    init_logging(level, log_format, include_spans);
}

/// Create a routing decision span
#[macro_export]
macro_rules! route_span {
    ($($field:tt)*) => {
        tracing::info_span!("route_stage", $($field)*)
    };
}

/// Create a registry mutation span
#[macro_export]
macro_rules! registry_span {
    ($($field:tt)*) => {
        tracing::debug_span!("registry_operation", $($field)*)
    };
}

// Re-export macros for convenience
pub use {registry_span, route_span};
