use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TOTAL_SCORE: u32 = 200;

/// Aggregate bounds applied when a submission is totalled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub max_total_score: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_total_score: DEFAULT_MAX_TOTAL_SCORE,
        }
    }
}
