//! Integration tests for the bounded agent loop
//!
//! These tests drive [`ReActAgent`] with scripted and mocked reasoning
//! clients over native tools, so they need no interpreter or network.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use toolopt_core::error::ModelError;
use toolopt_core::models::{ReasoningClient, ScriptedReasoningClient, StepDecision, StepRequest};
use toolopt_core::tools::FINISH_TOOL;
use toolopt_core::{ReActAgent, ToolOptError};

use test_utils::{arithmetic_example, arithmetic_registry, decision};

mock! {
    pub Reasoner {}

    #[async_trait]
    impl ReasoningClient for Reasoner {
        async fn next_step(&self, request: &StepRequest) -> Result<StepDecision, ModelError>;
    }
}

/// Test add then finish produces the formatted sum
#[tokio::test]
async fn test_add_then_finish() {
    let client = ScriptedReasoningClient::new(vec![
        decision("add", json!({ "a": 2, "b": 3 })),
        decision("finish", json!({ "answer": "5" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client));

    let prediction = agent.run("What is 2 + 3?", &arithmetic_registry()).await.unwrap();

    assert_eq!(prediction.answer, "5");
    let steps = prediction.trajectory.steps();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].selected_fn, "add");
    assert_eq!(steps[0].return_value, Some(json!(5)));
    assert_eq!(steps[0].errors, None);
    assert!(steps[1].is_finish());
}

/// Test the loop stops at max_steps when finish is never chosen
#[tokio::test]
async fn test_loop_bounded_by_max_steps() {
    let client = Arc::new(ScriptedReasoningClient::repeating(decision(
        "add",
        json!({ "a": 1, "b": 1 }),
    )));
    let agent = ReActAgent::new(client.clone()).with_max_steps(3);

    let prediction = agent.run("What is 1 + 1?", &arithmetic_registry()).await.unwrap();

    assert_eq!(prediction.trajectory.len(), 3);
    assert_eq!(client.served(), 3);
    assert!(!prediction.trajectory.is_finished());
    // Last executed step's value is still the answer
    assert_eq!(prediction.answer, "2");
}

/// Test the default step budget is five
#[tokio::test]
async fn test_default_max_steps() {
    let client = Arc::new(ScriptedReasoningClient::repeating(decision(
        "add",
        json!({ "a": 1, "b": 2 }),
    )));
    let agent = ReActAgent::new(client.clone());
    assert_eq!(agent.max_steps(), 5);

    let prediction = agent.run("What is 1 + 2?", &arithmetic_registry()).await.unwrap();
    assert_eq!(prediction.trajectory.len(), 5);
}

/// Test an unknown tool is recorded as an error step and the run continues
#[tokio::test]
async fn test_unknown_tool_recorded() {
    let client = ScriptedReasoningClient::new(vec![
        decision("multiply", json!({ "a": 2, "b": 3 })),
        decision("finish", json!({ "answer": "6" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client));

    let prediction = agent.run("What is 2 * 3?", &arithmetic_registry()).await.unwrap();

    let first = &prediction.trajectory.steps()[0];
    assert_eq!(first.selected_fn, "multiply");
    assert_eq!(first.return_value, None);
    let error = first.errors.as_deref().unwrap();
    assert!(error.contains("'multiply' not found"));
    assert!(error.contains("add"));
    assert_eq!(prediction.answer, "6");
}

/// Test bad arguments are recorded without a retry
#[tokio::test]
async fn test_tool_error_continues() {
    let client = ScriptedReasoningClient::new(vec![
        decision("add", json!({ "a": 2 })),
        decision("add", json!({ "a": 2, "b": 2 })),
        decision("finish", json!({ "answer": "4" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client));

    let prediction = agent.run("What is 2 + 2?", &arithmetic_registry()).await.unwrap();

    let steps = prediction.trajectory.steps();
    assert_eq!(steps.len(), 3);
    assert!(steps[0].errors.is_some());
    assert_eq!(steps[0].return_value, None);
    assert_eq!(steps[1].return_value, Some(json!(4)));
    assert_eq!(prediction.answer, "4");
}

/// Test a failing last step leaves an empty answer
#[tokio::test]
async fn test_failed_last_step_gives_empty_answer() {
    let client = ScriptedReasoningClient::new(vec![
        decision("add", json!({ "a": 2, "b": 3 })),
        decision("add", json!({})),
    ]);
    let agent = ReActAgent::new(Arc::new(client)).with_max_steps(2);

    let prediction = agent.run("What is 2 + 3?", &arithmetic_registry()).await.unwrap();
    assert_eq!(prediction.answer, "");
}

/// Test quoted tool names are normalized before lookup
#[tokio::test]
async fn test_quoted_tool_names() {
    let client = ScriptedReasoningClient::new(vec![
        decision("\"add\"", json!({ "a": 4, "b": 5 })),
        decision("'finish'", json!({ "answer": "9" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client));

    let prediction = agent.run("What is 4 + 5?", &arithmetic_registry()).await.unwrap();

    let steps = prediction.trajectory.steps();
    assert_eq!(steps[0].selected_fn, "add");
    assert_eq!(steps[0].return_value, Some(json!(9)));
    assert_eq!(steps[1].selected_fn, FINISH_TOOL);
    assert!(prediction.trajectory.is_finished());
    assert_eq!(prediction.answer, "9");
}

/// Test a hanging tool times out and the loop moves on
#[tokio::test]
async fn test_tool_timeout_recorded() {
    let client = ScriptedReasoningClient::new(vec![
        decision("sleepy", json!({})),
        decision("finish", json!({ "answer": "done" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client)).with_tool_timeout(Duration::from_millis(50));

    let prediction = agent.run("Wait for it", &arithmetic_registry()).await.unwrap();

    let first = &prediction.trajectory.steps()[0];
    assert!(first.errors.as_deref().unwrap().contains("timed out"));
    assert_eq!(prediction.answer, "done");
}

/// Test reasoning failures end the run with an error
#[tokio::test]
async fn test_reasoning_failure_is_fatal() {
    let client = ScriptedReasoningClient::new(vec![decision("add", json!({ "a": 1, "b": 1 }))]);
    let agent = ReActAgent::new(Arc::new(client));

    let err = agent.run("What is 1 + 1?", &arithmetic_registry()).await.unwrap_err();
    assert!(matches!(err, ToolOptError::Model(ModelError::Exhausted { served: 1 })));
}

/// Test the reasoning client sees tool metadata and the growing trajectory
#[tokio::test]
async fn test_request_contents() {
    let mut mock = MockReasoner::new();
    mock.expect_next_step().times(2).returning(|request| {
        let names: Vec<&str> = request.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["add", "finish", "sleepy"]);
        assert_eq!(request.question, "What is 7 + 8?");
        assert!(request.demos.is_empty());

        match request.trajectory.last() {
            None => Ok(decision("add", json!({ "a": 7, "b": 8 }))),
            Some(step) => {
                assert_eq!(request.trajectory.len(), 1);
                assert_eq!(step.return_value, Some(json!(15)));
                Ok(decision("finish", json!({ "answer": "15" })))
            }
        }
    });

    let agent = ReActAgent::new(Arc::new(mock));
    let example = arithmetic_example(7, 8);
    let prediction = agent.forward(&example).await.unwrap();
    assert_eq!(prediction.answer, example.answer);
}

/// Test instructions and demos survive save and load
#[tokio::test]
async fn test_state_save_and_load() {
    let client = ScriptedReasoningClient::new(vec![
        decision("add", json!({ "a": 2, "b": 3 })),
        decision("finish", json!({ "answer": "5" })),
    ]);
    let agent = ReActAgent::new(Arc::new(client)).with_instructions("Use the tools.");
    let prediction = agent.run("What is 2 + 3?", &arithmetic_registry()).await.unwrap();
    let agent = agent.with_demos(vec![toolopt_core::tool_agent::Demo {
        question: "What is 2 + 3?".to_string(),
        trajectory: prediction.trajectory,
        answer: prediction.answer,
    }]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.json");
    agent.save(&path).unwrap();

    let fresh = ReActAgent::new(Arc::new(ScriptedReasoningClient::new(Vec::new())));
    let restored = fresh.load(&path).unwrap();
    assert_eq!(restored.state(), agent.state());
    assert_eq!(restored.instructions(), "Use the tools.");
    assert_eq!(restored.demos().len(), 1);
}

/// Test a numeric finish answer becomes the prediction text
#[tokio::test]
async fn test_finish_with_numeric_answer() {
    let client = ScriptedReasoningClient::new(vec![
        decision("add", json!({ "a": 2, "b": 3 })),
        decision("finish", json!({ "answer": 5 })),
    ]);
    let agent = ReActAgent::new(Arc::new(client));

    let example = arithmetic_example(2, 3);
    let prediction = agent.forward(&example).await.unwrap();

    let last = prediction.trajectory.last().unwrap();
    assert!(last.is_finish());
    assert_eq!(last.errors, None);
    assert_eq!(last.return_value, Some(json!(5)));
    assert_eq!(prediction.answer, "5");
    assert!(toolopt_core::answer_exact_match(&example.answer, &prediction.answer));
}

/// Test finish passes non-string values through untouched
#[tokio::test]
async fn test_finish_with_list_answer() {
    let client = ScriptedReasoningClient::new(vec![decision("finish", json!({ "answer": [1, 2] }))]);
    let agent = ReActAgent::new(Arc::new(client));

    let prediction = agent.run("List one and two", &arithmetic_registry()).await.unwrap();

    assert_eq!(prediction.trajectory.len(), 1);
    assert_eq!(prediction.trajectory.last().unwrap().errors, None);
    assert_eq!(prediction.answer, "[1,2]");
}

/// Test a model forwarding the raw tool value to finish scores as correct
#[tokio::test]
async fn test_finish_with_forwarded_tool_value() {
    let mut mock = MockReasoner::new();
    mock.expect_next_step().times(2).returning(|request| match request.trajectory.last() {
        None => Ok(decision("add", json!({ "a": 1200, "b": 34 }))),
        Some(step) => {
            let value = step.return_value.clone().unwrap_or_default();
            Ok(decision("finish", json!({ "answer": value })))
        }
    });

    let agent = ReActAgent::new(Arc::new(mock));
    let example = arithmetic_example(1200, 34);
    let prediction = agent.forward(&example).await.unwrap();

    assert_eq!(prediction.answer, "1234");
    assert!(toolopt_core::answer_exact_match(&example.answer, &prediction.answer));
}
