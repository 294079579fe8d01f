//! Diagnostic logging setup shared by both binaries
//!
//! Logs always go to stderr; stdout carries the MCP protocol.

use tracing_subscriber::EnvFilter;

/// Set to `1`, `true` or `yes` to enable server logging
pub const LOGGING_ENV: &str = "CORTEXSYNAPSE_ENABLE_LOGGING";

/// Set to `json` for JSON-lines output
pub const LOG_FORMAT_ENV: &str = "CORTEXSYNAPSE_LOG_FORMAT";

/// Interpret an on/off environment value
pub fn flag_enabled(value: Option<&str>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Whether `CORTEXSYNAPSE_ENABLE_LOGGING` asks for logs
pub fn logging_enabled() -> bool {
    flag_enabled(std::env::var(LOGGING_ENV).ok().as_deref())
}

/// Filter for `default_level`, overridden by any directives in `rust_log`
pub fn env_filter(default_level: tracing::Level, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// Install the global subscriber. `RUST_LOG` refines `default_level`.
///
/// Does nothing if a subscriber is already installed.
pub fn init(default_level: tracing::Level) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(default_level, rust_log.as_deref());
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing::Level;

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled(Some("1")));
        assert!(flag_enabled(Some("true")));
        assert!(flag_enabled(Some("YES")));
        assert!(!flag_enabled(Some("0")));
        assert!(!flag_enabled(Some("")));
        assert!(!flag_enabled(None));
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        let filter = env_filter(Level::INFO, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = env_filter(Level::INFO, Some("trace,hyper=warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_default_level_without_rust_log() {
        assert_eq!(env_filter(Level::INFO, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(env_filter(Level::WARN, Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }
}
