//! Error handling for toolopt-core

use thiserror::Error;

/// Result type alias for toolopt operations
pub type Result<T> = std::result::Result<T, ToolOptError>;

/// Main error type for the toolopt-core library
#[derive(Debug, Error)]
pub enum ToolOptError {
    /// Dataset loading and preparation errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    /// Tool registration and execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
    /// Reasoning client errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    /// Evaluation errors
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Generic errors with context
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Dataset errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("Failed to read dataset '{path}': {reason}")]
    ReadFailed { path: String, reason: String },
    /// The dataset file is not a JSON array of records
    #[error("Failed to parse dataset '{path}': {reason}")]
    ParsingFailed { path: String, reason: String },
    /// A record could not be turned into an example
    #[error("Invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Tool errors
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Two different tools resolve to the same name
    #[error("Duplicate tool '{name}'")]
    DuplicateTool { name: String },
    /// The requested tool is not registered
    #[error("Tool '{name}' not found; available: {}", available.join(", "))]
    NotFound { name: String, available: Vec<String> },
    /// Arguments do not match the tool's parameters
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    /// The tool raised an error while running
    #[error("Tool '{tool}' failed: {reason}")]
    ExecutionFailed { tool: String, reason: String },
    /// The tool did not finish within its time budget
    #[error("Tool '{tool}' timed out after {timeout_ms} ms")]
    Timeout { tool: String, timeout_ms: u64 },
    /// The tool was cancelled before it finished
    #[error("Tool '{tool}' was cancelled")]
    Cancelled { tool: String },
    /// The interpreter process could not be started or spoke garbage
    #[error("Interpreter error: {reason}")]
    Interpreter { reason: String },
}

/// Reasoning client errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request did not reach the model or returned an error status
    #[error("Request failed: {details}")]
    RequestFailed { details: String },
    /// The model reply did not contain a usable decision
    #[error("Response parsing failed: {details}")]
    ResponseParsingFailed { details: String },
    /// A scripted client ran out of decisions
    #[error("No more scripted decisions after {served} calls")]
    Exhausted { served: usize },
}

/// Evaluation errors
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Too many examples raised errors
    #[error("Evaluation aborted: {errors} errors exceeds the limit of {max_errors}")]
    TooManyErrors { errors: usize, max_errors: usize },
    /// Nothing to evaluate
    #[error("Cannot evaluate an empty set of examples")]
    EmptyDataset,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration source could not be parsed
    #[error("Failed to load configuration: {reason}")]
    ParsingFailed { reason: String },
    /// Invalid configuration value
    #[error("Invalid value for '{key}': '{value}' (expected: {expected})")]
    InvalidValue { key: String, value: String, expected: String },
    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {reason}")]
    SerializationFailed { reason: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParsingFailed {
            reason: err.to_string(),
        }
    }
}

impl ToolOptError {
    /// Create a generic error with a message
    pub fn other<S: Into<String>>(message: S) -> Self {
        ToolOptError::Other {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolOptError::Model(ModelError::RequestFailed { .. })
                | ToolOptError::Tool(ToolError::Timeout { .. })
                | ToolOptError::Tool(ToolError::ExecutionFailed { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available_tools() {
        let err = ToolError::NotFound {
            name: "mul".to_string(),
            available: vec!["add".to_string(), "finish".to_string()],
        };
        assert_eq!(err.to_string(), "Tool 'mul' not found; available: add, finish");
    }

    #[test]
    fn test_recoverable_errors() {
        let timeout = ToolOptError::from(ToolError::Timeout {
            tool: "slow".to_string(),
            timeout_ms: 10,
        });
        assert!(timeout.is_recoverable());

        let duplicate = ToolOptError::from(ToolError::DuplicateTool {
            name: "add".to_string(),
        });
        assert!(!duplicate.is_recoverable());
    }
}
