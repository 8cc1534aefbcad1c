use super::{ArchiveConfig, ConfigValidator};
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the archive configuration, falling back to the built-in defaults
///
/// A TOML file only needs to name the fields it overrides; anything left out
/// keeps its default value. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ArchiveConfig> {
    let config = match path {
        Some(path) => {
            let content =
                fs::read_to_string(path).map_err(|e| Error::filesystem(path, e))?;
            let config: ArchiveConfig = toml::from_str(&content)?;
            debug!(
                "Loaded archive config from {} ({} categories)",
                path.display(),
                config.categories.len()
            );
            config
        }
        None => ArchiveConfig::default(),
    };

    ConfigValidator::validate(&config)?;
    Ok(config)
}
