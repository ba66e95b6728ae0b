//! # toolopt-core
//!
//! Build, run and optimize LLM tool-use agents.
//!
//! A dataset of question / answer / tool-source records is shuffled with a
//! fixed seed and split. Each record's tool sources become an interpreter-backed
//! [`ToolRegistry`](tools::ToolRegistry) with a `finish` tool appended. A
//! [`ReActAgent`](tool_agent::ReActAgent) asks a
//! [`ReasoningClient`](models::ReasoningClient) for one tool call at a time,
//! runs it under a timeout and records the trajectory. Predictions are scored
//! with a strict normalized-equality metric, and an
//! [`Optimizer`](optimize::Optimizer) searches for few-shot demonstrations
//! that raise that score.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use toolopt_core::models::{ScriptedReasoningClient, StepDecision};
//! use toolopt_core::tool_agent::ReActAgent;
//! use toolopt_core::tools::ToolRegistry;
//!
//! # async fn example() -> toolopt_core::Result<()> {
//! let client = ScriptedReasoningClient::new(vec![StepDecision::new(
//!     "The answer is known",
//!     "finish",
//!     [("answer", json!("42"))],
//! )]);
//! let agent = ReActAgent::new(Arc::new(client));
//! let tools = ToolRegistry::builder().build()?;
//!
//! let prediction = agent.run("What is six times seven?", &tools).await?;
//! assert_eq!(prediction.answer, "42");
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

// Error types (must be first for other modules to use)
pub mod error;

pub mod code_executor;
pub mod config;
pub mod dataset;
pub mod evaluate;
pub mod logging;
pub mod metric;
pub mod models;
pub mod optimize;
pub mod tool_agent;
pub mod tools;
pub mod utils;

pub use config::ToolOptConfig;
pub use dataset::{Example, Splits};
pub use error::{Result, ToolOptError};
pub use evaluate::{EvaluationReport, Evaluator};
pub use metric::{answer_exact_match, ExactMatch, Metric};
pub use optimize::{BootstrapFewShot, Optimizer};
pub use tool_agent::{Prediction, ReActAgent, Trajectory, TrajectoryStep};

/// Current version of toolopt-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
