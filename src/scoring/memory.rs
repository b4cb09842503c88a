use crate::error::EngineResult;
use crate::models::{ImprovementPattern, MemoryRound, TestMetrics};

use super::{mean, validate_latencies, ScoredTest};

/// Minimum rounds before a response-time trend is meaningful.
const MIN_ROUNDS_FOR_TREND: usize = 3;

/// Score an ordered list of memory-sequence rounds.
pub(super) fn score(rounds: &[MemoryRound]) -> EngineResult<ScoredTest> {
    validate_latencies("memory round time", rounds.iter().map(|r| r.time))?;

    let correct_rounds = rounds.iter().filter(|r| r.correct).count() as u32;
    let accuracy = 100.0 * correct_rounds as f64 / rounds.len() as f64;
    let completion_time_ms = rounds.iter().map(|r| r.time).sum::<f64>().round() as u64;
    let max_sequence = rounds.iter().map(|r| r.length).max().unwrap_or(0);

    Ok(ScoredTest {
        accuracy,
        completion_time_ms,
        difficulty: difficulty_rating(max_sequence),
        metrics: TestMetrics::MemorySequence {
            max_sequence,
            correct_rounds,
            improvement: improvement_pattern(rounds),
        },
    })
}

/// Longer recalled sequences earn a higher difficulty rating.
fn difficulty_rating(max_sequence: u32) -> u8 {
    if max_sequence >= 8 {
        5
    } else if max_sequence >= 6 {
        4
    } else if max_sequence >= 4 {
        3
    } else if max_sequence >= 3 {
        2
    } else {
        1
    }
}

/// Compare mean response time of the early half against the late half.
/// A >10% swing either way counts as a trend.
fn improvement_pattern(rounds: &[MemoryRound]) -> ImprovementPattern {
    if rounds.len() < MIN_ROUNDS_FOR_TREND {
        return ImprovementPattern::InsufficientData;
    }

    let mid = rounds.len() / 2;
    let times: Vec<f64> = rounds.iter().map(|r| r.time).collect();
    let early_avg = mean(&times[..mid]);
    let late_avg = mean(&times[mid..]);

    if early_avg <= 0.0 {
        return ImprovementPattern::Stable;
    }

    let shift = (early_avg - late_avg) / early_avg;
    if shift > 0.1 {
        ImprovementPattern::Improving
    } else if shift < -0.1 {
        ImprovementPattern::Declining
    } else {
        ImprovementPattern::Stable
    }
}
