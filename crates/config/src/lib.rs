pub mod schema;
pub mod watcher;

pub use schema::{CanvasConfig, CategoryConfig, GraphConfig};
pub use watcher::ConfigWatcher;

use activity_core::{GraphError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `GraphConfig::default()` if
/// the file doesn't exist so the graph always has a usable palette.
pub fn load(path: impl AsRef<Path>) -> Result<GraphConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(GraphConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| GraphError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from an in-memory TOML document.
pub fn parse(raw: &str) -> Result<GraphConfig> {
    let config: GraphConfig =
        toml::from_str(raw).map_err(|e| GraphError::Config(format!("TOML parse error: {e}")))?;

    if config.categories.is_empty() {
        return Err(GraphError::Config("at least one category is required".into()));
    }
    if !(config.canvas.device_pixel_ratio > 0.0) {
        return Err(GraphError::Config(format!(
            "device_pixel_ratio must be positive, got {}",
            config.canvas.device_pixel_ratio
        )));
    }
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("activity-graph").join("graph.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load("/nonexistent/activity-graph/graph.toml").unwrap();
        assert_eq!(cfg, GraphConfig::default());
    }

    #[test]
    fn empty_category_list_is_rejected() {
        let err = parse("categories = []").unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn non_positive_pixel_ratio_is_rejected() {
        let err = parse("[canvas]\ndevice_pixel_ratio = 0.0").unwrap_err();
        assert!(err.to_string().contains("device_pixel_ratio"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(parse("[canvas"), Err(GraphError::Config(_))));
    }
}
