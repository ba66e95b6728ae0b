//! Strict answer matching.

use crate::dataset::Example;
use crate::tool_agent::Prediction;

/// Normalize an answer for comparison.
///
/// Strips one trailing `.0`, removes `,` thousands separators and
/// lowercases. Surrounding whitespace is ignored.
pub fn normalize_answer(answer: &str) -> String {
    let trimmed = answer.trim();
    let without_zero = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    without_zero.replace(',', "").to_lowercase()
}

/// Exact match after [`normalize_answer`]. No partial credit and no numeric
/// tolerance.
pub fn answer_exact_match(gold: &str, predicted: &str) -> bool {
    normalize_answer(gold) == normalize_answer(predicted)
}

/// Scores a prediction against its example, 0.0 to 1.0.
pub trait Metric: Send + Sync {
    fn score(&self, example: &Example, prediction: &Prediction) -> f64;
}

/// [`answer_exact_match`] as a metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl Metric for ExactMatch {
    fn score(&self, example: &Example, prediction: &Prediction) -> f64 {
        if answer_exact_match(&example.answer, &prediction.answer) {
            1.0
        } else {
            0.0
        }
    }
}

impl<F> Metric for F
where
    F: Fn(&Example, &Prediction) -> f64 + Send + Sync,
{
    fn score(&self, example: &Example, prediction: &Prediction) -> f64 {
        self(example, prediction)
    }
}
