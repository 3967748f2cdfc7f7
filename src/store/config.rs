use serde::{Deserialize, Serialize};

/// Prefix every stored option name starts with.
pub const DEFAULT_OPTION_PREFIX: &str = "woo_shop_manager_";

/// Where the rule-set configuration lives in the option store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub option_prefix: String,
}

impl StoreConfig {
    #[must_use]
    pub fn option_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.option_prefix = prefix.into();
        self
    }

    /// Full option name for a field suffix.
    #[must_use]
    pub fn option_name(&self, field: &str) -> String {
        format!("{}{field}", self.option_prefix)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            option_prefix: DEFAULT_OPTION_PREFIX.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix() {
        let config = StoreConfig::default();
        assert_eq!(config.option_name("conditions"), "woo_shop_manager_conditions");
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());

        let config: StoreConfig = serde_json::from_str(r#"{"option_prefix": "wp2_"}"#).unwrap();
        assert_eq!(config.option_name("operator"), "wp2_operator");
    }
}
