//! Prompt optimization.
//!
//! An [`Optimizer`] takes an agent, a metric and a training set and returns
//! an agent with better instructions or demonstrations. The search itself
//! is up to the implementation.

mod bootstrap;

use std::sync::Arc;

use async_trait::async_trait;

pub use bootstrap::BootstrapFewShot;

use crate::dataset::Example;
use crate::error::Result;
use crate::metric::Metric;
use crate::tool_agent::ReActAgent;

#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn compile(
        &self,
        agent: &ReActAgent,
        trainset: &[Example],
        metric: Arc<dyn Metric>,
    ) -> Result<ReActAgent>;
}
