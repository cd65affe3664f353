//! Subscriber setup for repokiln's `tracing` output
//!
//! Everything is written to stderr so stdout stays reserved for command
//! results. `RUST_LOG`, when set, replaces the computed filter entirely.
//!
//! ```no_run
//! use repokiln::util::logging;
//!
//! // REPOKILN_LOG_LEVEL=debug REPOKILN_LOG_JSON=true
//! logging::init_from_env();
//! tracing::info!(repo = "attrs", "Stage started");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LEVEL_ENV: &str = "REPOKILN_LOG_LEVEL";
const JSON_ENV: &str = "REPOKILN_LOG_JSON";

static INSTALLED: Once = Once::new();

/// How log events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Threshold for `repokiln::*` targets; dependencies stay at `warn`
    pub level: Level,
    pub format: LogFormat,
    pub show_target: bool,
    /// Adds source location and thread identity to every event
    pub show_origin: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Plain,
            show_target: true,
            show_origin: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// JSON with source locations, for shipping to a log collector
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            show_origin: true,
            ..Self::default()
        }
    }

    /// `--log-level` beats `-v`, which beats `-q`; with none of them the
    /// level comes from `REPOKILN_LOG_LEVEL`.
    pub fn from_cli(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = match (log_level, verbose, quiet) {
            (Some(explicit), _, _) => parse_level(explicit),
            (None, true, _) => Level::DEBUG,
            (None, false, true) => Level::ERROR,
            (None, false, false) => env::var(LEVEL_ENV)
                .map(|value| parse_level(&value))
                .unwrap_or(Level::INFO),
        };

        let json = env::var(JSON_ENV)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            level,
            format: if json { LogFormat::Json } else { LogFormat::Plain },
            ..Self::default()
        }
    }
}

/// Case-insensitive level name; anything unrecognized means `INFO`.
///
/// ```
/// use repokiln::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("DEBUG"), Level::DEBUG);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("repokiln: unknown log level '{other}', using info");
            Level::INFO
        }
    }
}

fn filter_for(level: Level) -> EnvFilter {
    if env::var_os("RUST_LOG").is_some() {
        return EnvFilter::from_default_env();
    }
    let base = EnvFilter::new("warn");
    match format!("repokiln={level}").parse() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INSTALLED.call_once(|| {
        let origin = config.show_origin;
        let base = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.show_target)
            .with_file(origin)
            .with_line_number(origin)
            .with_thread_ids(origin)
            .with_thread_names(origin);

        let output = match config.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Plain => base.boxed(),
        };

        let _ = tracing_subscriber::registry()
            .with(output)
            .with(filter_for(config.level))
            .try_init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Honors `REPOKILN_LOG_LEVEL` and `REPOKILN_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_cli(None, false, false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_level_names() {
        let cases = [
            ("trace", Level::TRACE),
            ("Debug", Level::DEBUG),
            ("INFO", Level::INFO),
            ("warning", Level::WARN),
            (" error ", Level::ERROR),
            ("loud", Level::INFO),
            ("", Level::INFO),
        ];
        for (name, expected) in cases {
            assert_eq!(parse_level(name), expected, "level {name:?}");
        }
    }

    #[test]
    fn test_presets() {
        let plain = LoggingConfig::with_level(Level::WARN);
        assert_eq!(plain.level, Level::WARN);
        assert_eq!(plain.format, LogFormat::Plain);
        assert!(!plain.show_origin);

        let production = LoggingConfig::production();
        assert_eq!(production.format, LogFormat::Json);
        assert!(production.show_origin);
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        env::set_var(LEVEL_ENV, "trace");

        assert_eq!(LoggingConfig::from_cli(Some("warn"), true, false).level, Level::WARN);
        assert_eq!(LoggingConfig::from_cli(None, true, true).level, Level::DEBUG);
        assert_eq!(LoggingConfig::from_cli(None, false, true).level, Level::ERROR);
        assert_eq!(LoggingConfig::from_cli(None, false, false).level, Level::TRACE);

        env::remove_var(LEVEL_ENV);
        assert_eq!(LoggingConfig::from_cli(None, false, false).level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_json_from_environment() {
        env::set_var(JSON_ENV, "TRUE");
        let json = LoggingConfig::from_cli(None, false, false).format;
        env::set_var(JSON_ENV, "nope");
        let plain = LoggingConfig::from_cli(None, false, false).format;
        env::remove_var(JSON_ENV);

        assert_eq!(json, LogFormat::Json);
        assert_eq!(plain, LogFormat::Plain);
    }
}
