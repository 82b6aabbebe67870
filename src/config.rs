// Shorthand Configuration
//
// Defines every tunable of the editor integration and the generation
// pipeline. All sections are optional in TOML; missing values fall back to
// the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix for layered overrides (`SHORTHAND__GENERATION__MAX_ATTEMPTS=7`)
pub const ENV_PREFIX: &str = "SHORTHAND";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load layered config: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorthandConfig {
    pub suggestions: SuggestionConfig,
    pub capture: CaptureConfig,
    pub generation: GenerationConfig,
}

/// Suggestion list behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Show the suggestion list at all
    pub enabled: bool,

    /// Maximum number of suggestions kept from a lookup
    pub max_suggestions: usize,

    /// Expand the first suggestion on the completion key (Tab)
    pub auto_expand: bool,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_suggestions: 5,
            auto_expand: true,
        }
    }
}

/// Prompt capture behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub enabled: bool,

    /// Minimum time between two successful captures (in milliseconds)
    #[serde(rename = "debounce_ms", with = "serde_duration_millis")]
    pub debounce: Duration,

    /// Characters that end a sentence or paragraph
    pub terminators: Vec<char>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: Duration::from_millis(2000),
            terminators: vec!['\n', '.'],
        }
    }
}

/// Phrase mining and acronym synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of captured entries per pass
    pub batch_size: usize,

    /// Synthesis attempts before the numeric-suffix fallback
    pub max_attempts: usize,

    /// Candidates more similar than this to an existing label are rejected
    pub similarity_threshold: f32,

    /// Feedback scaling factor
    pub learning_rate: f32,

    /// Distinct entries a phrase must appear in
    pub min_occurrences: usize,

    /// Ranked phrases forwarded to synthesis per pass
    pub max_phrases: usize,

    pub min_label_len: usize,
    pub max_label_len: usize,

    /// Consecutive failed passes before the failing batch is abandoned
    pub max_consecutive_failures: u32,

    /// Periodic pass interval for the background worker (in seconds, none = on request only)
    #[serde(with = "serde_opt_duration_secs")]
    pub interval: Option<Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_attempts: 5,
            similarity_threshold: 0.7,
            learning_rate: 0.1,
            min_occurrences: 2,
            max_phrases: 10,
            min_label_len: 2,
            max_label_len: 10,
            max_consecutive_failures: 3,
            interval: None,
        }
    }
}

// Custom serde module for Duration (serialize/deserialize as milliseconds)
mod serde_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration as whole seconds
mod serde_opt_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl ShorthandConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ShorthandConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Layered load: defaults, then optional TOML file, then `SHORTHAND__*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&ShorthandConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml),
            );
        }

        let config: ShorthandConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suggestions.max_suggestions == 0 {
            return Err(ConfigError::ValidationError(
                "suggestions: max_suggestions must be at least 1".to_string(),
            ));
        }

        if self.capture.terminators.is_empty() {
            return Err(ConfigError::ValidationError(
                "capture: terminators must not be empty".to_string(),
            ));
        }

        let generation = &self.generation;

        if generation.batch_size == 0 || generation.batch_size > 10000 {
            return Err(ConfigError::ValidationError(
                "generation: batch_size must be between 1 and 10000".to_string(),
            ));
        }

        if generation.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "generation: max_attempts must be at least 1".to_string(),
            ));
        }

        if !(generation.similarity_threshold > 0.0 && generation.similarity_threshold <= 1.0) {
            return Err(ConfigError::ValidationError(
                "generation: similarity_threshold must be in (0, 1]".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&generation.learning_rate) {
            return Err(ConfigError::ValidationError(
                "generation: learning_rate must be in [0, 1)".to_string(),
            ));
        }

        if generation.min_occurrences < 2 {
            return Err(ConfigError::ValidationError(
                "generation: min_occurrences must be at least 2".to_string(),
            ));
        }

        if generation.max_phrases == 0 {
            return Err(ConfigError::ValidationError(
                "generation: max_phrases must be at least 1".to_string(),
            ));
        }

        if generation.min_label_len == 0 || generation.min_label_len > generation.max_label_len {
            return Err(ConfigError::ValidationError(
                "generation: label length bounds must satisfy 1 <= min <= max".to_string(),
            ));
        }

        if generation.max_consecutive_failures == 0 {
            return Err(ConfigError::ValidationError(
                "generation: max_consecutive_failures must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
