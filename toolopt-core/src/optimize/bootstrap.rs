use std::sync::Arc;

use async_trait::async_trait;
use rand::prelude::*;
use tracing::{debug, info};

use super::Optimizer;
use crate::config::{OptimizerConfig, ToolOptConfig};
use crate::dataset::Example;
use crate::error::{EvaluationError, Result};
use crate::evaluate::Evaluator;
use crate::metric::Metric;
use crate::tool_agent::{Demo, ReActAgent};

/// Mini-batch few-shot optimizer.
///
/// Each round samples a mini-batch from the training set, runs the current
/// best agent on it and keeps fully successful runs (score 1.0, ended with
/// `finish`) as demonstration candidates. A candidate agent with up to
/// `max_demos` of them is then scored on the same batch and replaces the
/// current best only if it scores strictly higher.
#[derive(Debug, Clone)]
pub struct BootstrapFewShot {
    config: OptimizerConfig,
    evaluator: Evaluator,
}

impl BootstrapFewShot {
    pub fn new(config: OptimizerConfig, evaluator: Evaluator) -> Self {
        Self { config, evaluator }
    }

    pub fn from_config(config: &ToolOptConfig) -> Self {
        Self::new(config.optimizer.clone(), Evaluator::from_config(&config.evaluator))
    }
}

#[async_trait]
impl Optimizer for BootstrapFewShot {
    async fn compile(
        &self,
        agent: &ReActAgent,
        trainset: &[Example],
        metric: Arc<dyn Metric>,
    ) -> Result<ReActAgent> {
        if trainset.is_empty() {
            return Err(EvaluationError::EmptyDataset.into());
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let batch_size = self.config.minibatch_size.clamp(1, trainset.len());
        let mut best = agent.clone();
        let mut pool: Vec<Demo> = Vec::new();

        info!(
            steps = self.config.num_steps,
            max_demos = self.config.max_demos,
            batch_size,
            trainset = trainset.len(),
            "optimization started"
        );

        for step in 0..self.config.num_steps {
            let batch: Vec<Example> = trainset.choose_multiple(&mut rng, batch_size).cloned().collect();

            let baseline = self.evaluator.evaluate(&best, &batch, metric.as_ref()).await?;
            for result in &baseline.results {
                let Some(prediction) = &result.prediction else {
                    continue;
                };
                let example = &batch[result.index];
                if result.score < 1.0 || !prediction.trajectory.is_finished() {
                    continue;
                }
                if pool.iter().any(|demo| demo.question == example.question) {
                    continue;
                }
                pool.push(Demo {
                    question: example.question.clone(),
                    trajectory: prediction.trajectory.clone(),
                    answer: prediction.answer.clone(),
                });
            }
            debug!(step, baseline = baseline.score, pool = pool.len(), "bootstrapped demos");

            if pool.is_empty() || self.config.max_demos == 0 {
                continue;
            }

            let mut demos = pool.clone();
            demos.shuffle(&mut rng);
            demos.truncate(self.config.max_demos);
            let candidate = agent.clone().with_demos(demos);

            let report = self.evaluator.evaluate(&candidate, &batch, metric.as_ref()).await?;
            if report.score > baseline.score {
                info!(step, from = baseline.score, to = report.score, demos = candidate.demos().len(), "accepted candidate");
                best = candidate;
            } else {
                debug!(step, baseline = baseline.score, candidate = report.score, "rejected candidate");
            }
        }

        info!(demos = best.demos().len(), "optimization finished");
        Ok(best)
    }
}
