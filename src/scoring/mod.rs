//! Per-test scoring algorithms and the shared performance metrics.
//!
//! Each test type has one scorer producing accuracy, completion time, a
//! dynamic 1-5 difficulty rating, and type-specific detail metrics. Empty
//! trial lists are rejected before dispatch.

mod color;
mod memory;
mod reaction;

use crate::error::{EngineError, EngineResult};
use crate::models::{TestMetrics, TestOutcome, TrialData};

/// Scored result of one trial submission, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTest {
    pub accuracy: f64,
    pub completion_time_ms: u64,
    pub difficulty: u8,
    pub metrics: TestMetrics,
}

/// Score raw trial data with the algorithm matching its test type.
pub fn score_trials(trials: &TrialData) -> EngineResult<ScoredTest> {
    if trials.is_empty() {
        return Err(EngineError::validation(format!(
            "{} submission contains no trials",
            trials.test_type().as_str()
        )));
    }

    match trials {
        TrialData::ReactionTime { trials } => reaction::score(trials),
        TrialData::MemorySequence { rounds } => memory::score(rounds),
        TrialData::ColorPerception { trials } => color::score(trials),
    }
}

/// Score and package trial data into the persistable outcome payload.
pub fn build_outcome(trials: TrialData) -> EngineResult<(ScoredTest, TestOutcome)> {
    let scored = score_trials(&trials)?;
    let outcome = TestOutcome {
        metrics: scored.metrics.clone(),
        performance_score: performance_score(
            scored.accuracy,
            scored.difficulty,
            scored.completion_time_ms,
        ),
        efficiency: efficiency(scored.accuracy, scored.completion_time_ms),
        trials,
    };
    Ok((scored, outcome))
}

/// Accuracy scaled by difficulty (±10% per step from the midpoint), with a
/// 10-point bonus for completion under a minute. Capped at 100.
pub fn performance_score(accuracy: f64, difficulty: u8, completion_time_ms: u64) -> u8 {
    let bonus = if completion_time_ms < 60_000 { 10.0 } else { 0.0 };
    let scaled = accuracy * (1.0 + (difficulty as f64 - 3.0) * 0.1) + bonus;
    scaled.round().clamp(0.0, 100.0) as u8
}

/// Accuracy points per second of completion time, rounded to 2 decimals.
/// Zero completion time yields zero rather than a division blowup.
pub fn efficiency(accuracy: f64, completion_time_ms: u64) -> f64 {
    if completion_time_ms == 0 {
        return 0.0;
    }
    let per_second = accuracy / (completion_time_ms as f64 / 1000.0);
    (per_second * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn validate_latencies(label: &str, values: impl Iterator<Item = f64>) -> EngineResult<()> {
    for value in values {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::validation(format!(
                "{label} must be a non-negative duration, got {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorTrial, ImprovementPattern, MemoryRound};

    fn memory_round(length: u32, correct: bool, time: f64) -> MemoryRound {
        MemoryRound {
            length,
            correct,
            time,
        }
    }

    #[test]
    fn empty_trials_are_rejected() {
        for trials in [
            TrialData::ReactionTime { trials: vec![] },
            TrialData::MemorySequence { rounds: vec![] },
            TrialData::ColorPerception { trials: vec![] },
        ] {
            match score_trials(&trials) {
                Err(EngineError::Validation(_)) => {}
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn steady_reaction_trials_score_perfectly() {
        let trials = TrialData::ReactionTime {
            trials: vec![200.0; 5],
        };
        let scored = score_trials(&trials).unwrap();

        assert_eq!(scored.accuracy, 100.0);
        assert_eq!(scored.completion_time_ms, 15_000);
        assert_eq!(scored.difficulty, 5);
        match scored.metrics {
            TestMetrics::ReactionTime {
                average_ms,
                consistency,
                speed_score,
            } => {
                assert_eq!(average_ms, 200.0);
                assert_eq!(consistency, 1.0);
                assert_eq!(speed_score, 100.0);
            }
            other => panic!("wrong metrics variant: {other:?}"),
        }
    }

    #[test]
    fn slow_inconsistent_reactions_score_low() {
        let trials = TrialData::ReactionTime {
            trials: vec![400.0, 700.0, 500.0, 650.0],
        };
        let scored = score_trials(&trials).unwrap();

        assert!(scored.accuracy < 60.0);
        assert_eq!(scored.difficulty, 1); // average 562.5ms
        assert_eq!(scored.completion_time_ms, 12_000);
    }

    #[test]
    fn reaction_difficulty_thresholds() {
        let difficulty = |avg: f64| {
            score_trials(&TrialData::ReactionTime { trials: vec![avg] })
                .unwrap()
                .difficulty
        };
        assert_eq!(difficulty(200.0), 5);
        assert_eq!(difficulty(201.0), 4);
        assert_eq!(difficulty(249.0), 4);
        assert_eq!(difficulty(250.0), 3);
        assert_eq!(difficulty(349.0), 3);
        assert_eq!(difficulty(350.0), 2);
        assert_eq!(difficulty(449.0), 2);
        assert_eq!(difficulty(450.0), 1);
    }

    #[test]
    fn memory_accuracy_counts_correct_rounds() {
        let rounds = vec![
            memory_round(3, true, 1200.0),
            memory_round(4, true, 1100.0),
            memory_round(5, true, 1000.0),
            memory_round(6, true, 950.0),
            memory_round(7, false, 900.0),
        ];
        let scored = score_trials(&TrialData::MemorySequence { rounds }).unwrap();

        assert_eq!(scored.accuracy, 80.0);
        assert_eq!(scored.completion_time_ms, 5150);
        assert_eq!(scored.difficulty, 4); // max sequence 7
        match scored.metrics {
            TestMetrics::MemorySequence {
                max_sequence,
                correct_rounds,
                improvement,
            } => {
                assert_eq!(max_sequence, 7);
                assert_eq!(correct_rounds, 4);
                // early avg 1150, late avg 950: >10% faster late
                assert_eq!(improvement, ImprovementPattern::Improving);
            }
            other => panic!("wrong metrics variant: {other:?}"),
        }
    }

    #[test]
    fn memory_improvement_patterns() {
        let improvement = |times: &[f64]| {
            let rounds = times
                .iter()
                .map(|&t| memory_round(4, true, t))
                .collect::<Vec<_>>();
            match score_trials(&TrialData::MemorySequence { rounds })
                .unwrap()
                .metrics
            {
                TestMetrics::MemorySequence { improvement, .. } => improvement,
                other => panic!("wrong metrics variant: {other:?}"),
            }
        };

        assert_eq!(improvement(&[1000.0, 1000.0]), ImprovementPattern::InsufficientData);
        assert_eq!(
            improvement(&[1000.0, 1010.0, 990.0, 1005.0]),
            ImprovementPattern::Stable
        );
        assert_eq!(
            improvement(&[1500.0, 1400.0, 900.0, 850.0]),
            ImprovementPattern::Improving
        );
        assert_eq!(
            improvement(&[800.0, 850.0, 1300.0, 1400.0]),
            ImprovementPattern::Declining
        );
    }

    #[test]
    fn color_accuracy_and_difficulty() {
        let trials: Vec<ColorTrial> = (0..10)
            .map(|i| ColorTrial {
                difficulty: 2,
                correct: i != 0,
                response_time: 800.0,
            })
            .collect();
        let scored = score_trials(&TrialData::ColorPerception { trials }).unwrap();

        assert_eq!(scored.accuracy, 90.0);
        assert_eq!(scored.difficulty, 5);
        assert_eq!(scored.completion_time_ms, 8000);
    }

    #[test]
    fn color_difficulty_follows_accuracy_bands() {
        let difficulty_for = |correct: usize, total: usize| {
            let trials: Vec<ColorTrial> = (0..total)
                .map(|i| ColorTrial {
                    difficulty: 1,
                    correct: i < correct,
                    response_time: 500.0,
                })
                .collect();
            score_trials(&TrialData::ColorPerception { trials })
                .unwrap()
                .difficulty
        };

        assert_eq!(difficulty_for(9, 10), 5); // 90%
        assert_eq!(difficulty_for(8, 10), 4); // 80%
        assert_eq!(difficulty_for(6, 10), 3); // 60%
        assert_eq!(difficulty_for(4, 10), 2); // 40%
        assert_eq!(difficulty_for(3, 10), 1); // 30%
    }

    #[test]
    fn negative_latency_is_a_validation_error() {
        let trials = TrialData::ReactionTime {
            trials: vec![200.0, -5.0],
        };
        assert!(matches!(
            score_trials(&trials),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn performance_score_scaling() {
        // 90% accuracy at difficulty 5 with a fast completion saturates.
        assert_eq!(performance_score(90.0, 5, 8000), 100);
        // Difficulty 1 discounts accuracy by 20%.
        assert_eq!(performance_score(50.0, 1, 120_000), 40);
        // Sub-minute completion earns the bonus.
        assert_eq!(performance_score(50.0, 3, 30_000), 60);
    }

    #[test]
    fn efficiency_is_rounded_and_guarded() {
        assert_eq!(efficiency(90.0, 8000), 11.25);
        assert_eq!(efficiency(80.0, 60_000), 1.33);
        assert_eq!(efficiency(50.0, 0), 0.0);
    }
}
