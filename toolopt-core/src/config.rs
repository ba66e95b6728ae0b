//! Configuration for agents, tools, evaluation and optimization.
//!
//! Values come from serde defaults, then an optional TOML file, then
//! `TOOLOPT_`-prefixed environment variables (`TOOLOPT_AGENT__MAX_STEPS=8`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptConfig {
    pub agent: AgentConfig,
    pub interpreter: InterpreterConfig,
    pub dataset: DatasetConfig,
    pub evaluator: EvaluatorConfig,
    pub optimizer: OptimizerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Agent loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Upper bound on trajectory length
    pub max_steps: usize,
    /// Per tool call budget in milliseconds
    pub tool_timeout_ms: u64,
    /// Replaces the built-in instructions when set
    pub instructions: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            tool_timeout_ms: 10_000,
            instructions: None,
        }
    }
}

impl AgentConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

/// Child interpreter used for source-defined tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            // Isolated mode: ignore PYTHON* env vars and the user site dir.
            args: vec!["-I".to_string()],
        }
    }
}

/// Dataset location and split sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: Option<PathBuf>,
    pub seed: u64,
    pub train_size: usize,
    pub dev_size: usize,
    /// Test split size; everything left after train and dev when unset
    pub test_size: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed: 0,
            train_size: 100,
            dev_size: 100,
            test_size: None,
        }
    }
}

/// Evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub num_threads: usize,
    pub max_errors: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            num_threads: 8,
            max_errors: 10,
        }
    }
}

/// Optimizer budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of mini-batch rounds
    pub num_steps: usize,
    /// Maximum few-shot demonstrations in the optimized agent
    pub max_demos: usize,
    pub minibatch_size: usize,
    pub seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            num_steps: 10,
            max_demos: 3,
            minibatch_size: 25,
            seed: 0,
        }
    }
}

/// OpenAI-compatible reasoning endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            request_timeout_secs: 60,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl ToolOptConfig {
    /// Load configuration from an optional TOML file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix("TOOLOPT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let config: ToolOptConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ToolOptConfig = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationFailed {
            reason: e.to_string(),
        })
    }

    /// Reject values that would make the agent or evaluator unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("agent.max_steps", self.agent.max_steps as u64),
            ("agent.tool_timeout_ms", self.agent.tool_timeout_ms),
            ("evaluator.num_threads", self.evaluator.num_threads as u64),
            ("optimizer.minibatch_size", self.optimizer.minibatch_size as u64),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "a positive integer".to_string(),
                });
            }
        }
        if self.interpreter.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "interpreter.program".to_string(),
                value: self.interpreter.program.clone(),
                expected: "an executable name".to_string(),
            });
        }
        Ok(())
    }
}
