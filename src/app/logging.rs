//! Logging initialization
//!
//! Verbosity picks the default filter; a valid `RUST_LOG` takes precedence so
//! individual modules such as `flowkeeper::dedupe` can be traced on their own.

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Build the log filter from an optional `RUST_LOG` value and the verbosity
///
/// An unparseable override is ignored in favor of the verbosity level.
pub fn log_filter(config: &AppConfig, env_override: Option<&str>) -> EnvFilter {
    env_override
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(config.log_level()))
}

/// Initialize tracing for the binary
///
/// Logs go to stderr; command summaries own stdout.
pub fn init_logging(config: &AppConfig) {
    let env_override = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(config, env_override.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_line_number(config.verbose >= 3)
        .init();

    debug!(
        "flowkeeper started with verbosity {} (config: {:?})",
        config.verbose, config.config_path
    );
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_follows_verbosity_without_override() {
        assert_eq!(log_filter(&AppConfig::new(0), None).to_string(), "info");
        assert_eq!(log_filter(&AppConfig::new(2), None).to_string(), "trace");
        assert_eq!(log_filter(&AppConfig::new(1), Some("  ")).to_string(), "debug");
    }

    #[test]
    fn test_env_override_wins() {
        let filter = log_filter(&AppConfig::new(0), Some("flowkeeper::dedupe=trace"));
        assert_eq!(filter.to_string(), "flowkeeper::dedupe=trace");
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let filter = log_filter(&AppConfig::new(1), Some("flowkeeper=notalevel"));
        assert_eq!(filter.to_string(), "debug");
    }
}
