use crate::error::EngineResult;
use crate::models::{ColorTrial, TestMetrics};

use super::{validate_latencies, ScoredTest};

/// Score a list of color-perception trials.
pub(super) fn score(trials: &[ColorTrial]) -> EngineResult<ScoredTest> {
    validate_latencies("color response time", trials.iter().map(|t| t.response_time))?;

    let correct_trials = trials.iter().filter(|t| t.correct).count() as u32;
    let accuracy = 100.0 * correct_trials as f64 / trials.len() as f64;
    let completion_time_ms = trials
        .iter()
        .map(|t| t.response_time)
        .sum::<f64>()
        .round() as u64;

    Ok(ScoredTest {
        accuracy,
        completion_time_ms,
        difficulty: difficulty_rating(accuracy),
        metrics: TestMetrics::ColorPerception { correct_trials },
    })
}

/// Higher discrimination accuracy earns a higher difficulty rating.
fn difficulty_rating(accuracy: f64) -> u8 {
    if accuracy >= 90.0 {
        5
    } else if accuracy >= 75.0 {
        4
    } else if accuracy >= 60.0 {
        3
    } else if accuracy >= 40.0 {
        2
    } else {
        1
    }
}
