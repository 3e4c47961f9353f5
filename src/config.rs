//! Application configuration
//!
//! Values come from, in increasing precedence: serde defaults, an optional
//! TOML file, `GAP_`-prefixed environment variables (`GAP_INFERENCE__MODEL`)
//! and finally the Ollama/LLM variables read by [`InferenceConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::documents::DocumentConfig;
use crate::inference::InferenceConfig;
use crate::report::OutputConfig;
use crate::scoring::{ScoringConfig, ScoringConfigError};
use crate::summary::SummaryConfig;

/// Reference framework named in prompts and reports
pub const DEFAULT_FRAMEWORK_NAME: &str = "CIS MS-ISAC NIST Cybersecurity Framework";

/// Default config file stem, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "gap-analysis";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_framework_name")]
    pub framework_name: String,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub documents: DocumentConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_framework_name() -> String {
    DEFAULT_FRAMEWORK_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framework_name: default_framework_name(),
            inference: InferenceConfig::default(),
            scoring: ScoringConfig::default(),
            summary: SummaryConfig::default(),
            documents: DocumentConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Scoring(#[from] ScoringConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load from `path` (or `gap-analysis.toml` if present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix("GAP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.inference = config.inference.from_env();
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document without consulting files or the environment
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.framework_name.trim().is_empty() {
            return Err(ConfigError::Invalid("framework_name must not be empty".to_string()));
        }
        self.inference.validate().map_err(ConfigError::Invalid)?;
        self.scoring.validate()?;
        if self.summary.max_recommendations == 0 {
            return Err(ConfigError::Invalid(
                "summary.max_recommendations must be positive".to_string(),
            ));
        }
        if self.summary.recommendation_max_chars < 16 {
            return Err(ConfigError::Invalid(
                "summary.recommendation_max_chars must be at least 16".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Severity;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.framework_name, DEFAULT_FRAMEWORK_NAME);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            framework_name = "ISO 27001"

            [inference]
            model = "mistral:7b"

            [scoring.weights]
            critical = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.framework_name, "ISO 27001");
        assert_eq!(config.inference.model, "mistral:7b");
        assert_eq!(config.inference.max_tokens, 4096);
        assert_eq!(config.scoring.weights.critical, 20);
        assert_eq!(config.scoring.weights.high, 10);
        assert_eq!(config.summary.max_recommendations, 5);
    }

    #[test]
    fn test_custom_lexicon_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [[scoring.lexicon]]
            severity = "critical"
            keywords = ["blocker"]

            [[scoring.lexicon]]
            severity = "high"
            keywords = ["major"]

            [[scoring.lexicon]]
            severity = "medium"
            keywords = ["moderate"]

            [[scoring.lexicon]]
            severity = "low"
            keywords = ["nit"]
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.lexicon.keywords(Severity::Critical), ["blocker"]);
    }

    #[test]
    fn test_unordered_weights_rejected() {
        let err = Config::from_toml_str(
            r#"
            [scoring.weights]
            critical = 5
            high = 10
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Scoring(ScoringConfigError::WeightsNotOrdered(_))));
    }

    #[test]
    fn test_zero_recommendations_rejected() {
        let err = Config::from_toml_str("[summary]\nmax_recommendations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
