//! Scoring an agent over a set of examples.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EvaluatorConfig;
use crate::dataset::Example;
use crate::error::{EvaluationError, Result};
use crate::metric::Metric;
use crate::tool_agent::{Prediction, ReActAgent};

/// Outcome for a single example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleResult {
    pub index: usize,
    pub prediction: Option<Prediction>,
    pub score: f64,
    pub error: Option<String>,
}

/// Aggregate evaluation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean score as a percentage
    pub score: f64,
    pub total_score: f64,
    pub total: usize,
    pub errors: usize,
    pub results: Vec<ExampleResult>,
}

/// Runs an agent over examples with bounded parallelism.
///
/// Examples whose run fails score zero. Once more than `max_errors` runs
/// have failed the evaluation stops with
/// [`EvaluationError::TooManyErrors`].
#[derive(Debug, Clone)]
pub struct Evaluator {
    num_threads: usize,
    max_errors: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::from_config(&EvaluatorConfig::default())
    }
}

impl Evaluator {
    pub fn new(num_threads: usize, max_errors: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
            max_errors,
        }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.num_threads, config.max_errors)
    }

    pub async fn evaluate(
        &self,
        agent: &ReActAgent,
        examples: &[Example],
        metric: &dyn Metric,
    ) -> std::result::Result<EvaluationReport, EvaluationError> {
        if examples.is_empty() {
            return Err(EvaluationError::EmptyDataset);
        }

        // Boxed eagerly: a lazily mapped stream is not provably `Send` here.
        let runs: Vec<BoxFuture<'_, (usize, &Example, Result<Prediction>)>> = examples
            .iter()
            .enumerate()
            .map(|(index, example)| async move { (index, example, agent.forward(example).await) }.boxed())
            .collect();
        let mut runs = stream::iter(runs).buffer_unordered(self.num_threads);

        let mut results = Vec::with_capacity(examples.len());
        let mut errors = 0usize;
        let mut total_score = 0.0;

        while let Some((index, example, run)) = runs.next().await {
            match run {
                Ok(prediction) => {
                    let score = metric.score(example, &prediction);
                    total_score += score;
                    results.push(ExampleResult {
                        index,
                        prediction: Some(prediction),
                        score,
                        error: None,
                    });
                }
                Err(e) => {
                    errors += 1;
                    warn!(index, error = %e, errors, max_errors = self.max_errors, "example failed");
                    if errors > self.max_errors {
                        return Err(EvaluationError::TooManyErrors {
                            errors,
                            max_errors: self.max_errors,
                        });
                    }
                    results.push(ExampleResult {
                        index,
                        prediction: None,
                        score: 0.0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        results.sort_by_key(|r| r.index);
        let total = examples.len();
        let score = 100.0 * total_score / total as f64;
        info!(score, total, errors, "evaluation finished");
        Ok(EvaluationReport {
            score,
            total_score,
            total,
            errors,
            results,
        })
    }
}
