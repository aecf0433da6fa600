//! Global configuration types for Valet.
//!
//! `ValetConfig` represents the top-level `config.toml` that controls the
//! completion model, memory recall, and the platform override for the
//! application opener. All fields have sensible defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `~/.valet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValetConfig {
    /// Chat-completion model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// How many memory entries to fold into the planner prompt.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,

    /// Override the detected host platform for the application opener
    /// ("macos", "windows", "linux"). `None` means detect from the host.
    #[serde(default)]
    pub platform: Option<String>,

    /// Base URL for web searches; the query is appended URL-encoded.
    #[serde(default = "default_search_url")]
    pub search_url: String,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_memory_limit() -> usize {
    20
}

fn default_search_url() -> String {
    "https://www.google.com/search?q=".to_string()
}

impl Default for ValetConfig {
    fn default() -> Self {
        ValetConfig {
            model: default_model(),
            memory_limit: default_memory_limit(),
            platform: None,
            search_url: default_search_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ValetConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.memory_limit, 20);
        assert!(config.platform.is_none());
    }

    #[test]
    fn test_config_deserialize_empty_toml_uses_defaults() {
        let config: ValetConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.search_url, "https://www.google.com/search?q=");
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
model = "gpt-4o-mini"
memory_limit = 50
platform = "linux"
"#;
        let config: ValetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.memory_limit, 50);
        assert_eq!(config.platform.as_deref(), Some("linux"));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = ValetConfig {
            model: "gpt-4o".to_string(),
            memory_limit: 10,
            platform: Some("macos".to_string()),
            search_url: "https://duckduckgo.com/?q=".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ValetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.memory_limit, 10);
        assert_eq!(parsed.platform.as_deref(), Some("macos"));
    }
}
