pub mod schema;

use std::path::Path;

use crate::error::{GraftError, Result};

pub use schema::{DistributionConfig, RepositoryConfig, TemplateConfig};

pub const CONFIG_FILE: &str = "graft.toml";

/// Load and validate the `graft.toml` of a template set.
///
/// A template set without a config file gets the defaults.
pub fn load_config(path: &Path) -> Result<TemplateConfig> {
    let config_path = if path.ends_with(CONFIG_FILE) {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE)
    };

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no template config, using defaults");
        return Ok(TemplateConfig::default());
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| GraftError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    let config: TemplateConfig =
        toml::from_str(&content).map_err(|e| GraftError::ConfigParse {
            path: config_path.clone(),
            source: e,
        })?;

    config.validate()?;

    Ok(config)
}
