use crate::error::EngineResult;
use crate::models::TestMetrics;

use super::{mean, validate_latencies, ScoredTest};

/// Fixed per-trial time estimate; reaction trials report latencies only,
/// so completion time is estimated rather than measured.
const TRIAL_ESTIMATE_MS: u64 = 3000;

/// Score an ordered list of reaction latencies (ms).
///
/// Accuracy blends raw speed (40%) with trial-to-trial consistency (60%).
pub(super) fn score(trials: &[f64]) -> EngineResult<ScoredTest> {
    validate_latencies("reaction latency", trials.iter().copied())?;

    let average = mean(trials);
    let variance = mean(
        &trials
            .iter()
            .map(|t| (t - average).powi(2))
            .collect::<Vec<_>>(),
    );
    let consistency = if average > 0.0 {
        (1.0 - variance.sqrt() / average).max(0.0)
    } else {
        1.0
    };
    let speed_score = ((500.0 - average) / 3.0).clamp(0.0, 100.0);
    let accuracy = (speed_score * 0.4 + consistency * 100.0 * 0.6).round();

    Ok(ScoredTest {
        accuracy,
        completion_time_ms: trials.len() as u64 * TRIAL_ESTIMATE_MS,
        difficulty: difficulty_rating(average),
        metrics: TestMetrics::ReactionTime {
            average_ms: average,
            consistency,
            speed_score,
        },
    })
}

/// Faster average reactions earn a higher difficulty rating.
fn difficulty_rating(average_ms: f64) -> u8 {
    if average_ms <= 200.0 {
        5
    } else if average_ms < 250.0 {
        4
    } else if average_ms < 350.0 {
        3
    } else if average_ms < 450.0 {
        2
    } else {
        1
    }
}
