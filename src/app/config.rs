//! Application configuration
//!
//! Settings that come from the command line rather than the archive config.

use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Optional TOML file with archive settings
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Get the log filter based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(AppConfig::new(0).log_level(), "info");
        assert_eq!(AppConfig::new(1).log_level(), "debug");
        assert_eq!(AppConfig::new(2).log_level(), "trace");
        assert_eq!(AppConfig::new(5).log_level(), "trace");
    }

    #[test]
    fn test_config_path() {
        let config = AppConfig::default().with_config_path(Some("flowkeeper.toml".into()));
        assert_eq!(config.verbose, 0);
        assert_eq!(config.config_path, Some(PathBuf::from("flowkeeper.toml")));
    }
}
