//! Output types returned by the pipeline.

use crate::quiz::Quiz;
use serde::Serialize;
use std::ops::AddAssign;

/// Token accounting for a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CallUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Estimated cost in USD; 0.0 when the model has no known price.
    pub estimated_cost: f64,
}

impl CallUsage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Usage counters summed over every model call of a run.
///
/// Informational only: nothing in the pipeline branches on these values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageStatistics {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub estimated_cost: f64,
    /// Number of model calls that contributed.
    pub calls: u32,
}

impl AddAssign<CallUsage> for UsageStatistics {
    fn add_assign(&mut self, call: CallUsage) {
        self.prompt_tokens += call.prompt_tokens;
        self.completion_tokens += call.completion_tokens;
        self.total_tokens += call.total_tokens();
        self.estimated_cost += call.estimated_cost;
        self.calls += 1;
    }
}

/// One display row per question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizRow {
    #[serde(rename = "Question")]
    pub question: String,
    /// `"key: text"` lines joined with `\n`, in option order.
    #[serde(rename = "Options")]
    pub options: String,
    /// Upper-cased key of the correct option.
    #[serde(rename = "Correct Answer")]
    pub correct_answer: String,
}

/// Result of a successful run. Owned by the caller; never cached.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub quiz: Quiz,
    /// Display rows, one per question in sequence order.
    pub rows: Vec<QuizRow>,
    /// Free-text critique from the review call. Opaque.
    pub review: String,
    pub usage: UsageStatistics,
    /// Wall-clock time for the whole run in milliseconds.
    pub duration_ms: u64,
}
