use crate::namespace::{NamespaceFilter, DEFAULT_IMPLICIT_NAMESPACES};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeConfig {
    /// Initial preferences of every new tree
    #[serde(default)]
    pub preferences: Preferences,

    /// Namespace prefixes whose concepts are hidden unless "show all" is on
    #[serde(default = "default_implicit_namespaces")]
    pub implicit_namespaces: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_implicit_namespaces() -> Vec<String> {
    DEFAULT_IMPLICIT_NAMESPACES
        .iter()
        .map(|ns| ns.to_string())
        .collect()
}

/// Tree preferences, changed through the settings form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Preferences {
    /// Show concepts from implicit namespaces too
    #[serde(default)]
    pub show_all_concepts: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Identical warnings within this window are reported once
    #[serde(default = "default_warning_dedup_secs")]
    pub warning_dedup_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_warning_dedup_secs() -> u64 {
    5
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            warning_dedup_secs: default_warning_dedup_secs(),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            preferences: Preferences::default(),
            implicit_namespaces: default_implicit_namespaces(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TreeConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: TreeConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// JSON Schema of the configuration file
    pub fn schema_json() -> Result<String, ConfigError> {
        let schema = schemars::schema_for!(TreeConfig);
        serde_json::to_string_pretty(&schema).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn namespace_filter(&self) -> NamespaceFilter {
        NamespaceFilter::new(self.implicit_namespaces.iter().cloned())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.implicit_namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "implicit namespace cannot be empty".to_string(),
            ));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
