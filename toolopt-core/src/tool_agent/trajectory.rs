//! Trajectory records produced by an agent run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{ToolArgs, ToolOutcome, FINISH_TOOL};

/// One executed step of an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub reasoning: String,
    pub selected_fn: String,
    pub args: ToolArgs,
    pub return_value: Option<Value>,
    pub errors: Option<String>,
}

impl TrajectoryStep {
    pub fn new(reasoning: String, selected_fn: String, args: ToolArgs, outcome: ToolOutcome) -> Self {
        Self {
            reasoning,
            selected_fn,
            args,
            return_value: outcome.return_value,
            errors: outcome.errors,
        }
    }

    pub fn is_finish(&self) -> bool {
        self.selected_fn == FINISH_TOOL
    }
}

/// Append-only log of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: TrajectoryStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn last(&self) -> Option<&TrajectoryStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when the last step called the finish tool.
    pub fn is_finished(&self) -> bool {
        self.last().is_some_and(TrajectoryStep::is_finish)
    }

    /// Final answer: the last step's return value as text, or `""`.
    pub fn final_answer(&self) -> String {
        self.last()
            .and_then(|step| step.return_value.as_ref())
            .map(value_to_answer)
            .unwrap_or_default()
    }
}

/// Render a tool return value the way it is compared against gold answers.
pub fn value_to_answer(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Output of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub answer: String,
    pub trajectory: Trajectory,
}

/// A worked example shown to the reasoning client as a demonstration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demo {
    pub question: String,
    pub trajectory: Trajectory,
    pub answer: String,
}
