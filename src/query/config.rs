//! Query builder configuration

use serde::{Deserialize, Serialize};

/// Query builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Key marking a placeholder in raw clauses (default: "$bound")
    #[serde(default = "default_placeholder_key")]
    pub placeholder_key: String,
}

fn default_placeholder_key() -> String {
    "$bound".to_string()
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            placeholder_key: default_placeholder_key(),
        }
    }
}

impl BuilderConfig {
    /// Create a config with a custom placeholder key
    pub fn with_placeholder_key(key: impl Into<String>) -> Self {
        Self {
            placeholder_key: key.into(),
        }
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.placeholder_key, "$bound");
    }

    #[test]
    fn test_from_json_defaults() {
        assert_eq!(BuilderConfig::from_json("{}").unwrap(), BuilderConfig::default());
        let config = BuilderConfig::from_json(r#"{ "placeholder_key": "?" }"#).unwrap();
        assert_eq!(config, BuilderConfig::with_placeholder_key("?"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(BuilderConfig::from_json("42").is_err());
        assert!(BuilderConfig::from_json(r#"{ "placeholder_key": 7 }"#).is_err());
    }
}
