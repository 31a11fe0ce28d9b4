//! Configuration system for setlap.
//!
//! Load generation, set postprocessing and dump options from TOML or YAML
//! files instead of wiring them in code.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use setlap_config::SetlapConfig;
//! use setlap_core::{Algorithm, CombinationType};
//!
//! let config = SetlapConfig::from_toml_str(r#"
//!     algorithm = "direct"
//!
//!     [generation]
//!     type = "distinctIntersection"
//!     min = 1
//!     max = 3
//!     order = ["cardinality:desc", "name"]
//!     limit = 20
//!
//!     [sets]
//!     order = ["cardinality:desc"]
//!     limit = 10
//!
//!     [dump]
//!     compress = "yes"
//!     include_combinations = false
//! "#).unwrap();
//!
//! assert_eq!(config.algorithm, Algorithm::Direct);
//! assert_eq!(config.generation.kind, CombinationType::DistinctIntersection);
//! assert_eq!(config.sets.limit, Some(10));
//! assert!(!config.dump.include_combinations);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use setlap_config::SetlapConfig;
//!
//! let config = SetlapConfig::load("setlap.toml").unwrap_or_default();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use setlap_core::{
    Algorithm, CombinationType, Compress, GenerateOptions, OverlapMetric, SetPostprocess, SortKey,
};
use setlap_dump::{DumpOptions, StaticDumpOptions};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main setlap configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SetlapConfig {
    /// Generator used when combinations are generated from sets.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Combination options.
    #[serde(default)]
    pub generation: GenerateOptions,

    /// Ordering and limit of extracted sets.
    #[serde(default)]
    pub sets: SetPostprocess,

    /// Element-carrying dump options.
    #[serde(default)]
    pub dump: DumpOptions,

    /// Static dump options.
    #[serde(default)]
    pub static_dump: StaticDumpOptions,
}

impl SetlapConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that parse but can never be satisfied.
    ///
    /// An empty degree range is only an error in strict mode, mirroring the
    /// generators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation
            .check_range()
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.generation.joiner.as_deref() == Some("") {
            return Err(ConfigError::Invalid("joiner must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_generation(mut self, generation: GenerateOptions) -> Self {
        self.generation = generation;
        self
    }

    /// Sets the combination type.
    pub fn with_kind(mut self, kind: CombinationType) -> Self {
        self.generation.kind = kind;
        self
    }

    /// Sets the inclusive degree range.
    pub fn with_degree_range(mut self, min: usize, max: usize) -> Self {
        self.generation.min = min;
        self.generation.max = Some(max);
        self
    }

    /// Appends a combination sort key.
    pub fn with_order(mut self, key: SortKey) -> Self {
        self.generation.order.push(key);
        self
    }

    /// Limits the number of combinations.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.generation.limit = Some(limit);
        self
    }

    pub fn with_sets(mut self, sets: SetPostprocess) -> Self {
        self.sets = sets;
        self
    }

    pub fn with_compress(mut self, compress: Compress) -> Self {
        self.dump.compress = compress;
        self.static_dump.compress = compress;
        self
    }

    pub fn with_metric(mut self, metric: OverlapMetric) -> Self {
        self.static_dump.metric = metric;
        self
    }

    pub fn with_include_combinations(mut self, include: bool) -> Self {
        self.dump.include_combinations = include;
        self
    }
}
