//! Test utilities and helpers for toolopt-core tests

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use toolopt_core::error::{ModelError, ToolError};
use toolopt_core::models::{StepDecision, StepRequest};
use toolopt_core::tools::{
    create_function_tool, FunctionTool, ParametersSchema, ToolArgs, ToolRegistry,
};
use toolopt_core::Example;

fn operand(args: &ToolArgs, key: &str) -> Result<f64, ToolError> {
    args.get(key).and_then(Value::as_f64).ok_or_else(|| ToolError::ExecutionFailed {
        tool: "add".to_string(),
        reason: format!("{} is not a number", key),
    })
}

fn add_numbers(args: &ToolArgs) -> Result<Value, ToolError> {
    if let (Some(a), Some(b)) = (args.get("a").and_then(Value::as_i64), args.get("b").and_then(Value::as_i64)) {
        return Ok(json!(a + b));
    }
    Ok(json!(operand(args, "a")? + operand(args, "b")?))
}

/// Native `add(a, b)` that keeps integers integral
pub fn add_tool() -> FunctionTool {
    create_function_tool(
        "add",
        "Add two numbers.",
        Some(ParametersSchema::required_properties([
            ("a", json!({ "type": "number" })),
            ("b", json!({ "type": "number" })),
        ])),
        |args, _token| async move { add_numbers(&args) },
    )
}

/// A tool that never returns within a test's patience
pub fn sleepy_tool() -> FunctionTool {
    create_function_tool("sleepy", "Sleeps for a minute.", None, |_args, _token| async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Value::Null)
    })
}

pub fn arithmetic_registry() -> ToolRegistry {
    ToolRegistry::builder()
        .add_tool(add_tool())
        .add_tool(sleepy_tool())
        .build()
        .unwrap()
}

/// `What is {a} + {b}?` with the sum as gold answer
pub fn arithmetic_example(a: i64, b: i64) -> Example {
    Example::new(format!("What is {} + {}?", a, b), (a + b).to_string(), arithmetic_registry())
}

pub fn decision(name: &str, args: Value) -> StepDecision {
    let args = match args {
        Value::Object(map) => map.into_iter().collect(),
        _ => Default::default(),
    };
    StepDecision {
        reasoning: format!("calling {}", name),
        next_selected_fn: name.to_string(),
        args,
    }
}

/// Parse the operands out of `What is {a} + {b}?`
pub fn operands(question: &str) -> Option<(i64, i64)> {
    let body = question.strip_prefix("What is ")?.strip_suffix('?')?;
    let (a, b) = body.split_once(" + ")?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Reasoning that calls `add` then `finish`.
///
/// Without demonstrations it only reports odd sums correctly; even sums
/// come back off by one. With any demonstration every answer is right.
pub fn arithmetic_reasoner(request: &StepRequest) -> Result<StepDecision, ModelError> {
    let Some(last) = request.trajectory.last() else {
        let (a, b) = operands(&request.question).ok_or_else(|| ModelError::ResponseParsingFailed {
            details: format!("cannot read question: {}", request.question),
        })?;
        return Ok(decision("add", json!({ "a": a, "b": b })));
    };
    let sum = last.return_value.as_ref().and_then(Value::as_i64).unwrap_or_default();
    let answer = if request.demos.is_empty() && sum % 2 == 0 { sum + 1 } else { sum };
    Ok(decision("finish", json!({ "answer": answer.to_string() })))
}
