//! Logging setup for rosterdb.
//!
//! Installs a `tracing` subscriber that writes either human-readable lines or
//! one JSON object per event. `RUST_LOG` takes precedence over the configured
//! level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Accepted values for `log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output encoding for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "Invalid log format '{}'. Must be 'text' or 'json'.",
                other
            )),
        }
    }
}

/// Default filter when `RUST_LOG` is unset: our crate plus request spans.
pub fn default_directives(level: &str) -> String {
    format!("rosterdb={level},tower_http={level}")
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(
                tracing_fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            ),
        ),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" TEXT ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_format_serde() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(serde_json::to_string(&LogFormat::Text).unwrap(), "\"text\"");
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("debug"), "rosterdb=debug,tower_http=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("warn", LogFormat::Text);
        init_logging("warn", LogFormat::Json);
    }
}
