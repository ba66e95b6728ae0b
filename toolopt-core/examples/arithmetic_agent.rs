//! Arithmetic agent demo
//!
//! Runs a small arithmetic task set through the agent loop, scores it,
//! bootstraps demonstrations and scores again. Runs offline with a
//! rule-based reasoning client; set `OPENAI_API_KEY` to use a real model.
//!
//! ```bash
//! cargo run --example arithmetic_agent
//! TOOLOPT_LOGGING__FILTER=debug cargo run --example arithmetic_agent
//! ```

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use toolopt_core::error::{ModelError, ToolError};
use toolopt_core::logging::init_tracing;
use toolopt_core::models::{FnReasoningClient, ReasoningClient, StepDecision, StepRequest};
use toolopt_core::tools::{create_function_tool, ParametersSchema, ToolArgs, ToolRegistry};
use toolopt_core::{
    BootstrapFewShot, Evaluator, ExactMatch, Example, Metric, Optimizer, ReActAgent, ToolOptConfig,
};

fn add_integers(args: &ToolArgs) -> Result<Value, ToolError> {
    let operand = |key: &str| {
        args.get(key).and_then(Value::as_i64).ok_or_else(|| ToolError::InvalidArguments {
            tool: "add".to_string(),
            reason: format!("'{}' must be an integer", key),
        })
    };
    Ok(json!(operand("a")? + operand("b")?))
}

fn registry() -> Result<ToolRegistry> {
    let add = create_function_tool(
        "add",
        "Add two integers.",
        Some(ParametersSchema::required_properties([
            ("a", json!({ "type": "integer" })),
            ("b", json!({ "type": "integer" })),
        ])),
        |args, _token| async move { add_integers(&args) },
    );
    Ok(ToolRegistry::builder().add_tool(add).build()?)
}

fn examples() -> Result<Vec<Example>> {
    [(12, 30), (1500, 2500), (7, 8), (250, 750), (99, 1), (1234, 4321)]
        .into_iter()
        .map(|(a, b)| {
            Ok(Example::new(
                format!("What is {} + {}?", a, b),
                (a + b).to_string(),
                registry()?,
            ))
        })
        .collect()
}

/// Adds, then answers. Sums of four digits or more come back with a stray
/// fraction until a demonstration is in the prompt.
fn rule_based(request: &StepRequest) -> Result<StepDecision, ModelError> {
    let Some(last) = request.trajectory.last() else {
        let numbers: Vec<i64> = request
            .question
            .split(|c: char| !c.is_ascii_digit())
            .filter_map(|s| s.parse().ok())
            .collect();
        let [a, b] = numbers.as_slice() else {
            return Err(ModelError::ResponseParsingFailed {
                details: format!("expected two numbers in '{}'", request.question),
            });
        };
        return Ok(StepDecision::new(
            "Add the two numbers first",
            "add",
            [("a", json!(a)), ("b", json!(b))],
        ));
    };

    let sum = last.return_value.as_ref().and_then(Value::as_i64).unwrap_or_default();
    let answer = if request.demos.is_empty() && sum >= 1000 {
        format!("{}.5", sum)
    } else {
        sum.to_string()
    };
    Ok(StepDecision::new("The sum is known", "finish", [("answer", json!(answer))]))
}

fn reasoning_client(config: &ToolOptConfig) -> Arc<dyn ReasoningClient> {
    #[cfg(feature = "http")]
    {
        if std::env::var(&config.model.api_key_env).is_ok() {
            if let Ok(client) = toolopt_core::models::OpenAiReasoningClient::from_config(&config.model) {
                tracing::info!(model = client.model(), "using OpenAI-compatible reasoning client");
                return Arc::new(client);
            }
        }
    }
    let _ = config;
    Arc::new(FnReasoningClient::new(rule_based))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ToolOptConfig::load(None)?;
    init_tracing(&config.logging)?;

    let agent = ReActAgent::from_config(reasoning_client(&config), &config.agent);
    let examples = examples()?;
    let metric: Arc<dyn Metric> = Arc::new(ExactMatch);
    let evaluator = Evaluator::from_config(&config.evaluator);

    let before = evaluator.evaluate(&agent, &examples, metric.as_ref()).await?;
    println!("Before optimization: {:.1}%", before.score);

    let optimizer = BootstrapFewShot::from_config(&config);
    let optimized = optimizer.compile(&agent, &examples, metric.clone()).await?;

    let after = evaluator.evaluate(&optimized, &examples, metric.as_ref()).await?;
    println!(
        "After optimization:  {:.1}% with {} demos",
        after.score,
        optimized.demos().len()
    );

    for result in &after.results {
        if let Some(prediction) = &result.prediction {
            println!("  {} -> {}", examples[result.index].question, prediction.answer);
        }
    }
    Ok(())
}
