//! Reasoning clients and the request/decision types they exchange.

#[cfg(feature = "http")]
mod openai;
pub mod prompt;
mod reasoning_client;
mod types;

#[cfg(feature = "http")]
pub use openai::{parse_decision, OpenAiReasoningClient};
pub use prompt::DEFAULT_INSTRUCTIONS;
pub use reasoning_client::{FnReasoningClient, ReasoningClient, ScriptedReasoningClient};
pub use types::{StepDecision, StepRequest};
