use std::fmt;

use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, reload, EnvFilter, Registry};

use crate::error::{ShellError, ShellResult};

/// Log levels accepted by the `loglevel` command, in the order they are offered.
pub const LOG_LEVELS: [&str; 6] = ["CRITICAL", "ERROR", "WARNING", "INFO", "DEBUG", "UNSET"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Unset,
}

impl LogLevel {
    pub fn parse(name: &str) -> ShellResult<Self> {
        match name {
            "CRITICAL" => Ok(LogLevel::Critical),
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" => Ok(LogLevel::Warning),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "UNSET" => Ok(LogLevel::Unset),
            other => Err(ShellError::InvalidParameter(format!(
                "unknown loglevel \"{}\", known levels are: {}",
                other,
                LOG_LEVELS.join(", ")
            ))),
        }
    }

    /// Level named by the global directive of an `EnvFilter` string such as
    /// `"debug"` or `"warn,sqlite_cli_rust=trace"`. Filters without one
    /// count as INFO.
    pub fn from_filter(filter: &str) -> Self {
        let global = filter
            .split(',')
            .map(str::trim)
            .filter(|directive| !directive.contains('='))
            .last();
        match global.map(str::to_ascii_lowercase).as_deref() {
            Some("off") => LogLevel::Critical,
            Some("error") => LogLevel::Error,
            Some("warn") => LogLevel::Warning,
            Some("debug") => LogLevel::Debug,
            Some("trace") => LogLevel::Unset,
            _ => LogLevel::Info,
        }
    }

    /// Filter directive understood by `EnvFilter`. tracing has no level above
    /// error, so CRITICAL and ERROR share one; UNSET lets everything through.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Unset => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Critical => "CRITICAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Unset => "UNSET",
        };
        f.write_str(name)
    }
}

/// Handle used by the `loglevel` command to swap the active filter.
#[derive(Clone)]
pub struct LogHandle {
    inner: reload::Handle<EnvFilter, Registry>,
    initial: LogLevel,
}

impl LogHandle {
    /// Level of the filter installed by `init`.
    pub fn initial_level(&self) -> LogLevel {
        self.initial
    }

    pub fn set_level(&self, level: LogLevel) -> ShellResult<()> {
        self.inner
            .reload(EnvFilter::new(level.directive()))
            .map_err(|e| ShellError::InvalidParameter(format!("cannot change loglevel: {}", e)))
    }
}

pub fn init(log_level: &str) -> LogHandle {
    // Prefer explicit --log-level; allow RUST_LOG override.
    let directives = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| EnvFilter::try_new(value).is_ok())
        .unwrap_or_else(|| log_level.to_string());
    let initial = LogLevel::from_filter(&directives);
    let (filter_layer, inner) = reload::Layer::new(EnvFilter::new(directives));
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
    LogHandle { inner, initial }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        for name in LOG_LEVELS {
            let level = LogLevel::parse(name).unwrap();
            assert_eq!(level.to_string(), name);
        }
    }

    #[test]
    fn rejects_lowercase_and_unknown_levels() {
        assert!(LogLevel::parse("debug").is_err());
        assert!(LogLevel::parse("VERBOSE").is_err());
    }

    #[test]
    fn critical_maps_to_error_filter() {
        assert_eq!(LogLevel::Critical.directive(), "error");
        assert_eq!(LogLevel::Unset.directive(), "trace");
    }

    #[test]
    fn initial_level_follows_the_global_directive() {
        assert_eq!(LogLevel::from_filter("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_filter("WARN"), LogLevel::Warning);
        assert_eq!(LogLevel::from_filter("error,rustyline=trace"), LogLevel::Error);
        assert_eq!(LogLevel::from_filter("sqlite_cli_rust=debug"), LogLevel::Info);
        assert_eq!(LogLevel::from_filter("trace"), LogLevel::Unset);
        assert_eq!(LogLevel::from_filter("off"), LogLevel::Critical);
    }
}
