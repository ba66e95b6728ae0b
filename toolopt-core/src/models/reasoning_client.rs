//! The reasoning seam of the agent loop.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::types::{StepDecision, StepRequest};
use crate::error::ModelError;

/// Chooses the next tool call given the question and trajectory so far.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn next_step(&self, request: &StepRequest) -> Result<StepDecision, ModelError>;
}

/// Replays a fixed list of decisions in order.
///
/// With [`cycle`](Self::cycle) the list repeats forever; otherwise the client
/// fails with [`ModelError::Exhausted`] once every decision has been served.
#[derive(Debug)]
pub struct ScriptedReasoningClient {
    decisions: Vec<StepDecision>,
    cursor: AtomicUsize,
    cycle: bool,
}

impl ScriptedReasoningClient {
    pub fn new(decisions: Vec<StepDecision>) -> Self {
        Self {
            decisions,
            cursor: AtomicUsize::new(0),
            cycle: false,
        }
    }

    /// Serve the same decision on every call.
    pub fn repeating(decision: StepDecision) -> Self {
        Self::new(vec![decision]).cycle()
    }

    pub fn cycle(mut self) -> Self {
        self.cycle = true;
        self
    }

    /// Number of decisions served so far.
    pub fn served(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningClient for ScriptedReasoningClient {
    async fn next_step(&self, _request: &StepRequest) -> Result<StepDecision, ModelError> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let slot = if self.cycle && !self.decisions.is_empty() {
            Some(index % self.decisions.len())
        } else if index < self.decisions.len() {
            Some(index)
        } else {
            None
        };
        match slot {
            Some(i) => Ok(self.decisions[i].clone()),
            None => Err(ModelError::Exhausted { served: index }),
        }
    }
}

/// Adapts a plain function into a [`ReasoningClient`].
pub struct FnReasoningClient<F> {
    func: F,
}

impl<F> FnReasoningClient<F>
where
    F: Fn(&StepRequest) -> Result<StepDecision, ModelError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> ReasoningClient for FnReasoningClient<F>
where
    F: Fn(&StepRequest) -> Result<StepDecision, ModelError> + Send + Sync,
{
    async fn next_step(&self, request: &StepRequest) -> Result<StepDecision, ModelError> {
        (self.func)(request)
    }
}
