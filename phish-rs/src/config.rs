//! Configuration for phish-rs
//!
//! Every section has serde defaults, so a partial TOML file is enough:
//!
//! ```toml
//! [server]
//! listen_addr = "127.0.0.1:8000"
//!
//! [model]
//! path = "/var/lib/phish-rs/phishing_model.json"
//! ```
//!
//! `Config::load` additionally reads `PHISH__SECTION__KEY` environment variables,
//! e.g. `PHISH__DECISION__THRESHOLD=0.6`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PhishError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scorer service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Persisted model location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Path of the trained model artifact
    #[serde(default = "default_model_path")]
    pub path: String,
}

/// Trainer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingConfig {
    /// Labeled CSV dataset (`text`, `label` columns)
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,
    /// Where the bootstrap dataset is written when no real dataset exists
    #[serde(default = "default_sample_path")]
    pub sample_path: String,
    /// Share of examples held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Seed for the train/evaluation partition and bootstrap shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Vocabulary size cap for the TF-IDF vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Gradient descent iterations
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Gradient descent step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Inverse L2 regularization strength
    #[serde(default = "default_c")]
    pub c: f64,
}

/// Decision fusion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecisionConfig {
    /// Confidence strictly above this is phishing
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Minimum confidence for URLs addressed by a raw IP
    #[serde(default = "default_ip_confidence_floor")]
    pub ip_confidence_floor: f64,
}

/// Scan history configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Maximum scans returned by history and analytics queries
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_model_path() -> String {
    "models/phishing_model.json".to_string()
}

fn default_dataset_path() -> String {
    "data/phishing_data.csv".to_string()
}

fn default_sample_path() -> String {
    "data/phishing_sample.csv".to_string()
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_max_features() -> usize {
    5000
}

fn default_max_iter() -> usize {
    1000
}

fn default_learning_rate() -> f64 {
    1.0
}

fn default_c() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.5
}

fn default_ip_confidence_floor() -> f64 {
    0.85
}

fn default_true() -> bool {
    true
}

fn default_database_url() -> String {
    "sqlite://scans.db?mode=rwc".to_string()
}

fn default_max_results() -> i64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            sample_path: default_sample_path(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
            max_features: default_max_features(),
            max_iter: default_max_iter(),
            learning_rate: default_learning_rate(),
            c: default_c(),
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            ip_confidence_floor: default_ip_confidence_floor(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_url: default_database_url(),
            max_results: default_max_results(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PhishError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| PhishError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Start from defaults or a TOML file, then apply `PHISH__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        let base = config::Config::try_from(&base)
            .map_err(|e| PhishError::Config(e.to_string()))?;

        let config: Config = config::Config::builder()
            .add_source(base)
            .add_source(
                config::Environment::with_prefix("PHISH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PhishError::Config(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if !(training.test_ratio > 0.0 && training.test_ratio < 1.0) {
            return Err(PhishError::Config(format!(
                "training.test_ratio must be in (0, 1), got {}",
                training.test_ratio
            )));
        }
        if training.max_features == 0 {
            return Err(PhishError::Config("training.max_features must be positive".to_string()));
        }
        if training.max_iter == 0 {
            return Err(PhishError::Config("training.max_iter must be positive".to_string()));
        }
        if training.c <= 0.0 || training.learning_rate <= 0.0 {
            return Err(PhishError::Config(
                "training.c and training.learning_rate must be positive".to_string(),
            ));
        }

        let decision = &self.decision;
        if !(0.0..=1.0).contains(&decision.threshold) {
            return Err(PhishError::Config(format!(
                "decision.threshold must be in [0, 1], got {}",
                decision.threshold
            )));
        }
        if !(0.0..=1.0).contains(&decision.ip_confidence_floor) {
            return Err(PhishError::Config(format!(
                "decision.ip_confidence_floor must be in [0, 1], got {}",
                decision.ip_confidence_floor
            )));
        }

        if self.history.max_results <= 0 {
            return Err(PhishError::Config(
                "history.max_results must be positive".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "compact" | "json") {
            return Err(PhishError::Config(format!(
                "logging.format must be pretty, compact or json, got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.decision.threshold, 0.5);
        assert_eq!(config.decision.ip_confidence_floor, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
listen_addr = "127.0.0.1:9000"

[training]
test_ratio = 0.25
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.training.test_ratio, 0.25);
        assert_eq!(config.training.max_features, 5000);
        assert_eq!(config.model.path, "models/phishing_model.json");
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = Config::default();
        config.training.test_ratio = 1.0;
        assert!(matches!(config.validate(), Err(PhishError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_floor() {
        let mut config = Config::default();
        config.decision.ip_confidence_floor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[model]\npath = \"/tmp/model.json\"\n").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.model.path, "/tmp/model.json");
        assert!(config.history.enabled);
    }

    #[test]
    fn test_load_layers_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phish.toml");
        std::fs::write(&path, "[decision]\nthreshold = 0.6\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.decision.threshold, 0.6);
        assert_eq!(config.decision.ip_confidence_floor, 0.85);
    }

    #[test]
    fn test_load_rejects_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(PhishError::Config(_))
        ));

        let invalid = dir.path().join("invalid.toml");
        std::fs::write(&invalid, "[training]
test_ratio = 2.0
").unwrap();
        assert!(matches!(
            Config::load(Some(&invalid)),
            Err(PhishError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: Config = toml::from_str(include_str!("../config.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_addr, Config::default().server.listen_addr);
        assert_eq!(config.training.seed, Config::default().training.seed);
        assert_eq!(config.history.max_results, Config::default().history.max_results);
    }
}
