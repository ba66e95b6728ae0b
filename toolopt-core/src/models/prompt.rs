//! Prompt rendering for text-based reasoning clients.

use crate::tool_agent::Trajectory;
use crate::tools::ToolSchema;

use super::types::StepRequest;

/// Instructions used when an agent is built without its own.
pub const DEFAULT_INSTRUCTIONS: &str = "Answer the question by calling the available functions one at a time. \
After each call you will see its return value or error. When you know the answer, call `finish` \
with the final answer as a plain value: digits only for numbers, no units, no thousands separators.";

const OUTPUT_FORMAT: &str = "Reply with a single JSON object and nothing else:\n\
{\"reasoning\": \"<why this call>\", \"next_selected_fn\": \"<function name>\", \"args\": {<keyword arguments>}}";

/// System prompt: instructions, function list and output format.
pub fn render_system(request: &StepRequest) -> String {
    let mut out = String::new();
    out.push_str(request.instructions.trim());
    out.push_str("\n\nAvailable functions:\n");
    out.push_str(&render_functions(&request.functions));
    out.push('\n');
    out.push_str(OUTPUT_FORMAT);
    out
}

/// User prompt: demonstrations, then the question and trajectory so far.
pub fn render_user(request: &StepRequest) -> String {
    let mut out = String::new();
    for (i, demo) in request.demos.iter().enumerate() {
        out.push_str(&format!("--- Example {} ---\n", i + 1));
        out.push_str(&format!("Question: {}\n", demo.question));
        out.push_str(&render_trajectory(&demo.trajectory));
        out.push_str(&format!("Answer: {}\n\n", demo.answer));
    }
    if !request.demos.is_empty() {
        out.push_str("--- Your task ---\n");
    }
    out.push_str(&format!("Question: {}\n", request.question));
    if request.trajectory.is_empty() {
        out.push_str("Trajectory: (no steps yet)\n");
    } else {
        out.push_str(&render_trajectory(&request.trajectory));
    }
    out
}

pub fn render_functions(functions: &[ToolSchema]) -> String {
    let mut out = String::new();
    for function in functions {
        out.push_str(&format!("- {}", function.render_signature()));
        let description = function.description.trim();
        if !description.is_empty() {
            out.push_str(&format!(": {}", description.replace('\n', " ")));
        }
        out.push('\n');
    }
    out
}

pub fn render_trajectory(trajectory: &Trajectory) -> String {
    let mut out = String::new();
    for (i, step) in trajectory.steps().iter().enumerate() {
        let args = serde_json::to_string(&step.args).unwrap_or_else(|_| "{}".to_string());
        out.push_str(&format!("Step {}: reasoning: {}\n", i + 1, step.reasoning));
        out.push_str(&format!("Step {}: call: {}({})\n", i + 1, step.selected_fn, args));
        match (&step.return_value, &step.errors) {
            (_, Some(error)) => {
                out.push_str(&format!("Step {}: error: {}\n", i + 1, error));
            }
            (Some(value), None) => {
                out.push_str(&format!("Step {}: returned: {}\n", i + 1, value));
            }
            (None, None) => {
                out.push_str(&format!("Step {}: returned: None\n", i + 1));
            }
        }
    }
    out
}
