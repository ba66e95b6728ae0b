//! The bounded think-act loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::trajectory::{Demo, Prediction, Trajectory, TrajectoryStep};
use crate::config::AgentConfig;
use crate::dataset::Example;
use crate::error::{Result, ToolError};
use crate::models::{ReasoningClient, StepRequest, DEFAULT_INSTRUCTIONS};
use crate::tools::{invoke_with_timeout, ToolOutcome, ToolRegistry};

/// Learnable part of an agent: what the optimizer changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub instructions: String,
    pub demos: Vec<Demo>,
}

/// Strip whitespace and surrounding quote characters from a tool name.
pub fn normalize_tool_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim()
        .to_string()
}

/// A tool-use agent.
///
/// Each step sends the question, the trajectory so far and the tool
/// metadata to the reasoning client, runs the chosen tool under a timeout
/// and appends the result. The run stops after the `finish` tool or after
/// `max_steps` steps, whichever comes first.
///
/// Cloning is cheap; clones share the reasoning client.
#[derive(Clone)]
pub struct ReActAgent {
    client: Arc<dyn ReasoningClient>,
    max_steps: usize,
    tool_timeout: Duration,
    state: AgentState,
}

impl std::fmt::Debug for ReActAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReActAgent")
            .field("max_steps", &self.max_steps)
            .field("tool_timeout", &self.tool_timeout)
            .field("demos", &self.state.demos.len())
            .finish()
    }
}

impl ReActAgent {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self::from_config(client, &AgentConfig::default())
    }

    pub fn from_config(client: Arc<dyn ReasoningClient>, config: &AgentConfig) -> Self {
        Self {
            client,
            max_steps: config.max_steps,
            tool_timeout: config.tool_timeout(),
            state: AgentState {
                instructions: config
                    .instructions
                    .clone()
                    .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
                demos: Vec::new(),
            },
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.state.instructions = instructions.into();
        self
    }

    pub fn with_demos(mut self, demos: Vec<Demo>) -> Self {
        self.state.demos = demos;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn instructions(&self) -> &str {
        &self.state.instructions
    }

    pub fn demos(&self) -> &[Demo] {
        &self.state.demos
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Replace instructions and demos with a saved state.
    pub fn with_state(mut self, state: AgentState) -> Self {
        self.state = state;
        self
    }

    /// Write instructions and demos as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load instructions and demos saved with [`save`](Self::save).
    pub fn load(self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let state: AgentState = serde_json::from_str(&text)?;
        Ok(self.with_state(state))
    }

    /// Run the agent on one example.
    pub async fn forward(&self, example: &Example) -> Result<Prediction> {
        self.run(&example.question, &example.tools).await
    }

    /// Answer `question` using `tools`.
    ///
    /// Tool failures, timeouts and unknown tool names are recorded on the
    /// step and the loop moves on; only reasoning-client failures end the
    /// run with an error.
    pub async fn run(&self, question: &str, tools: &ToolRegistry) -> Result<Prediction> {
        let functions = tools.schemas();
        let mut trajectory = Trajectory::new();
        let run_id = Uuid::new_v4();
        info!(%run_id, question = %question, max_steps = self.max_steps, tools = functions.len(), "agent run started");

        for step in 0..self.max_steps {
            let request = StepRequest {
                instructions: self.state.instructions.clone(),
                question: question.to_string(),
                trajectory: trajectory.clone(),
                functions: functions.clone(),
                demos: self.state.demos.clone(),
            };
            let decision = self.client.next_step(&request).await?;
            let selected_fn = normalize_tool_name(&decision.next_selected_fn);
            debug!(%run_id, step, selected_fn = %selected_fn, reasoning = %decision.reasoning, "agent chose tool");

            let outcome = match tools.get(&selected_fn) {
                Some(tool) => invoke_with_timeout(tool.as_ref(), &decision.args, self.tool_timeout).await,
                None => {
                    let err = ToolError::NotFound {
                        name: selected_fn.clone(),
                        available: tools.names(),
                    };
                    warn!(%run_id, step, error = %err, "agent chose an unknown tool");
                    ToolOutcome::failure(err)
                }
            };

            trajectory.push(TrajectoryStep::new(decision.reasoning, selected_fn, decision.args, outcome));
            if trajectory.is_finished() {
                break;
            }
        }

        let answer = trajectory.final_answer();
        info!(%run_id, steps = trajectory.len(), finished = trajectory.is_finished(), answer = %answer, "agent run finished");
        Ok(Prediction { answer, trajectory })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tool_name() {
        assert_eq!(normalize_tool_name("\"finish\""), "finish");
        assert_eq!(normalize_tool_name(" 'add' "), "add");
        assert_eq!(normalize_tool_name("`lookup`"), "lookup");
        assert_eq!(normalize_tool_name("add"), "add");
    }
}
