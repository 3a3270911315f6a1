//! Logging setup for Spray.
//!
//! Spray emits `tracing` events at its seams: query composition, cache
//! population and invalidation, cold single-row reads. Nothing is printed
//! unless a subscriber is installed, either by the application or by
//! [`init`] (requires the `tracing-subscriber` feature).
//!
//! # Environment Variables
//!
//! - `SPRAY_DEBUG=true|1|yes` - Enable debug logging
//! - `SPRAY_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SPRAY_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use spray_query::logging;
//!
//! logging::init();
//! ```

use std::sync::Once;

use crate::config::{EnvSource, StdEnvSource};

static INIT: Once = Once::new();

/// Whether `SPRAY_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    debug_enabled_in(&StdEnvSource)
}

fn debug_enabled_in(env: &impl EnvSource) -> bool {
    env.get("SPRAY_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The log level from `SPRAY_LOG_LEVEL`.
///
/// Defaults to "debug" when `SPRAY_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    log_level_in(&StdEnvSource)
}

fn log_level_in(env: &impl EnvSource) -> &'static str {
    let fallback = if debug_enabled_in(env) { "debug" } else { "warn" };
    match env.get("SPRAY_LOG_LEVEL").map(|l| l.to_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// The output format from `SPRAY_LOG_FORMAT`, defaulting to "json".
pub fn get_log_format() -> &'static str {
    log_format_in(&StdEnvSource)
}

fn log_format_in(env: &impl EnvSource) -> &'static str {
    match env.get("SPRAY_LOG_FORMAT").map(|f| f.to_lowercase()).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

fn logging_requested_in(env: &impl EnvSource) -> bool {
    debug_enabled_in(env) || env.get("SPRAY_LOG_LEVEL").is_some()
}

/// Initialize the Spray logging system.
///
/// Does nothing unless `SPRAY_DEBUG` or `SPRAY_LOG_LEVEL` is set. Subsequent
/// calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !logging_requested_in(&StdEnvSource) {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "spray={},spray_query={},spray_sqlite={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let result = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if result.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Spray logging initialized"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnvSource;

    #[test]
    fn test_debug_disabled_by_default() {
        assert!(!debug_enabled_in(&MapEnvSource::new()));
        assert!(debug_enabled_in(&MapEnvSource::new().set("SPRAY_DEBUG", "YES")));
    }

    #[test]
    fn test_logging_requested() {
        assert!(!logging_requested_in(&MapEnvSource::new()));
        assert!(!logging_requested_in(&MapEnvSource::new().set("SPRAY_DEBUG", "off")));
        assert!(logging_requested_in(&MapEnvSource::new().set("SPRAY_DEBUG", "true")));
        assert!(logging_requested_in(&MapEnvSource::new().set("SPRAY_LOG_LEVEL", "info")));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level_in(&MapEnvSource::new()), "warn");
        assert_eq!(log_level_in(&MapEnvSource::new().set("SPRAY_DEBUG", "1")), "debug");
        assert_eq!(
            log_level_in(&MapEnvSource::new().set("SPRAY_LOG_LEVEL", "TRACE")),
            "trace"
        );
        assert_eq!(
            log_level_in(&MapEnvSource::new().set("SPRAY_LOG_LEVEL", "loud")),
            "warn"
        );
    }

    #[test]
    fn test_log_format() {
        assert_eq!(log_format_in(&MapEnvSource::new()), "json");
        assert_eq!(
            log_format_in(&MapEnvSource::new().set("SPRAY_LOG_FORMAT", "compact")),
            "compact"
        );
    }
}
