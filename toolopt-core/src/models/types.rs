use serde::{Deserialize, Serialize};

use crate::tool_agent::{Demo, Trajectory};
use crate::tools::{ToolArgs, ToolSchema};

/// Everything the reasoning client sees before choosing the next tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    pub instructions: String,
    pub question: String,
    pub trajectory: Trajectory,
    pub functions: Vec<ToolSchema>,
    #[serde(default)]
    pub demos: Vec<Demo>,
}

/// The reasoning client's choice for the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDecision {
    #[serde(default)]
    pub reasoning: String,
    pub next_selected_fn: String,
    #[serde(default)]
    pub args: ToolArgs,
}

impl StepDecision {
    pub fn new<I, K>(reasoning: impl Into<String>, next_selected_fn: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Self {
            reasoning: reasoning.into(),
            next_selected_fn: next_selected_fn.into(),
            args: args.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
