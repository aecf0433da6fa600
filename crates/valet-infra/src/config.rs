//! Configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.valet/` in production)
//! and deserializes it into [`ValetConfig`]. Falls back to defaults when
//! the file is missing or malformed; a bad config file must never prevent
//! the assistant from starting.

use std::path::{Path, PathBuf};

use valet_types::config::ValetConfig;

/// The production data directory, `~/.valet`. Falls back to a relative
/// `.valet` when no home directory can be resolved.
pub fn default_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".valet"),
        None => {
            tracing::warn!("no home directory found, using ./.valet");
            PathBuf::from(".valet")
        }
    }
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`ValetConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ValetConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config.toml at {}, using defaults", config_path.display());
            return ValetConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", config_path.display());
            return ValetConfig::default();
        }
    };

    match toml::from_str::<ValetConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ValetConfig::default()
        }
    }
}
