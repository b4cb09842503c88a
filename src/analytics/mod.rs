//! Time-windowed aggregation over persisted snapshots and test results.
//!
//! The aggregation itself is pure: the engine fetches the matching records
//! for a window and this module folds them into a report. Zero matching
//! records produce zeroed aggregates, never an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ConsciousnessSnapshot, TestResult};

/// Supported aggregation windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyticsWindow {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
    #[serde(rename = "30d")]
    OneMonth,
}

impl AnalyticsWindow {
    pub fn parse(value: &str) -> EngineResult<Self> {
        match value {
            "15m" => Ok(AnalyticsWindow::FifteenMinutes),
            "1h" => Ok(AnalyticsWindow::OneHour),
            "24h" => Ok(AnalyticsWindow::OneDay),
            "7d" => Ok(AnalyticsWindow::OneWeek),
            "30d" => Ok(AnalyticsWindow::OneMonth),
            other => Err(EngineError::validation(format!(
                "unknown analytics window '{other}' (expected 15m/1h/24h/7d/30d)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsWindow::FifteenMinutes => "15m",
            AnalyticsWindow::OneHour => "1h",
            AnalyticsWindow::OneDay => "24h",
            AnalyticsWindow::OneWeek => "7d",
            AnalyticsWindow::OneMonth => "30d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            AnalyticsWindow::FifteenMinutes => Duration::minutes(15),
            AnalyticsWindow::OneHour => Duration::hours(1),
            AnalyticsWindow::OneDay => Duration::hours(24),
            AnalyticsWindow::OneWeek => Duration::days(7),
            AnalyticsWindow::OneMonth => Duration::days(30),
        }
    }

    /// Inclusive lower bound of the window ending at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

/// Component means of the mental-state vector, 1 decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateSummary {
    pub focus: f64,
    pub creativity: f64,
    pub stress: f64,
    pub energy: f64,
}

/// Band means of the derived brainwave vector, 1 decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainwaveSummary {
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub gamma: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAggregates {
    pub count: u64,
    pub mental_state: MentalStateSummary,
    pub brainwaves: BrainwaveSummary,
    pub avg_consciousness_score: f64,
    pub avg_cognitive_load: f64,
    pub avg_attention_level: f64,
    /// Frequency histogram of emotional-state labels.
    pub emotional_states: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAggregates {
    pub count: u64,
    pub avg_accuracy: f64,
    pub best_accuracy: f64,
    pub worst_accuracy: f64,
    pub avg_completion_time_ms: u64,
    pub fastest_completion_ms: u64,
    pub slowest_completion_ms: u64,
    pub avg_difficulty: f64,
    /// Frequency histogram of submitted test types.
    pub test_types: BTreeMap<String, u64>,
}

/// Summary statistics for one window, as handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub window: AnalyticsWindow,
    pub since: DateTime<Utc>,
    pub snapshots: SnapshotAggregates,
    pub tests: TestAggregates,
}

/// Fold fetched records into a report. Callers are responsible for having
/// filtered the records to the window (and any session/test-type filter).
pub fn aggregate(
    window: AnalyticsWindow,
    since: DateTime<Utc>,
    snapshots: &[ConsciousnessSnapshot],
    results: &[TestResult],
) -> AggregateReport {
    AggregateReport {
        window,
        since,
        snapshots: aggregate_snapshots(snapshots),
        tests: aggregate_tests(results),
    }
}

fn aggregate_snapshots(snapshots: &[ConsciousnessSnapshot]) -> SnapshotAggregates {
    if snapshots.is_empty() {
        return SnapshotAggregates::default();
    }

    let n = snapshots.len() as f64;
    let mut emotional_states = BTreeMap::new();
    for snapshot in snapshots {
        *emotional_states
            .entry(snapshot.emotional_state.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mean_of = |f: &dyn Fn(&ConsciousnessSnapshot) -> f64| {
        round1(snapshots.iter().map(f).sum::<f64>() / n)
    };

    SnapshotAggregates {
        count: snapshots.len() as u64,
        mental_state: MentalStateSummary {
            focus: mean_of(&|s| s.mental_state.focus),
            creativity: mean_of(&|s| s.mental_state.creativity),
            stress: mean_of(&|s| s.mental_state.stress),
            energy: mean_of(&|s| s.mental_state.energy),
        },
        brainwaves: BrainwaveSummary {
            alpha: mean_of(&|s| s.brainwaves.alpha),
            beta: mean_of(&|s| s.brainwaves.beta),
            theta: mean_of(&|s| s.brainwaves.theta),
            gamma: mean_of(&|s| s.brainwaves.gamma),
            delta: mean_of(&|s| s.brainwaves.delta),
        },
        avg_consciousness_score: mean_of(&|s| s.consciousness_score as f64),
        avg_cognitive_load: mean_of(&|s| s.cognitive_load as f64),
        avg_attention_level: mean_of(&|s| s.attention_level as f64),
        emotional_states,
    }
}

fn aggregate_tests(results: &[TestResult]) -> TestAggregates {
    if results.is_empty() {
        return TestAggregates::default();
    }

    let n = results.len() as f64;
    let mut test_types = BTreeMap::new();
    for result in results {
        *test_types
            .entry(result.test_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let accuracies = results.iter().map(|r| r.accuracy);
    let completions = results.iter().map(|r| r.completion_time_ms);

    TestAggregates {
        count: results.len() as u64,
        avg_accuracy: round1(results.iter().map(|r| r.accuracy).sum::<f64>() / n),
        best_accuracy: accuracies.clone().fold(f64::MIN, f64::max),
        worst_accuracy: accuracies.fold(f64::MAX, f64::min),
        avg_completion_time_ms: (results.iter().map(|r| r.completion_time_ms).sum::<u64>() as f64
            / n)
            .round() as u64,
        fastest_completion_ms: completions.clone().min().unwrap_or(0),
        slowest_completion_ms: completions.max().unwrap_or(0),
        avg_difficulty: round1(results.iter().map(|r| r.difficulty as f64).sum::<f64>() / n),
        test_types,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{classify_emotion, derive_brainwaves};
    use crate::models::{
        EnvironmentalFactors, MentalState, TestMetrics, TestOutcome, TestType, TimeOfDay,
        TrialData,
    };

    fn snapshot(focus: f64, stress: f64) -> ConsciousnessSnapshot {
        let state = MentalState::new(focus, 50.0, stress, 50.0).unwrap();
        let waves = derive_brainwaves(&state, 0.5);
        ConsciousnessSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: "s1".to_string(),
            timestamp: Utc::now(),
            mental_state: state,
            brainwaves: waves,
            consciousness_score: crate::derive::consciousness_score(&state, &waves),
            cognitive_load: crate::derive::cognitive_load(&state),
            attention_level: crate::derive::attention_level(&state),
            emotional_state: classify_emotion(&state),
            environmental_factors: EnvironmentalFactors {
                time_of_day: TimeOfDay::Morning,
                session_progress: 0.1,
            },
        }
    }

    fn test_result(accuracy: f64, completion_time_ms: u64, difficulty: u8) -> TestResult {
        TestResult {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: "s1".to_string(),
            test_type: TestType::ColorPerception,
            results: TestOutcome {
                trials: TrialData::ColorPerception { trials: vec![] },
                metrics: TestMetrics::ColorPerception { correct_trials: 0 },
                performance_score: 0,
                efficiency: 0.0,
            },
            accuracy,
            completion_time_ms,
            difficulty,
            mental_state_at_start: MentalState::baseline(),
            mental_state_at_end: MentalState::baseline(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn window_parsing_round_trips() {
        for raw in ["15m", "1h", "24h", "7d", "30d"] {
            assert_eq!(AnalyticsWindow::parse(raw).unwrap().as_str(), raw);
        }
        assert!(AnalyticsWindow::parse("2h").is_err());
    }

    #[test]
    fn zero_records_produce_zeroed_report() {
        let now = Utc::now();
        let report = aggregate(
            AnalyticsWindow::OneHour,
            AnalyticsWindow::OneHour.cutoff(now),
            &[],
            &[],
        );

        assert_eq!(report.snapshots.count, 0);
        assert_eq!(report.tests.count, 0);
        assert_eq!(report.snapshots.mental_state.focus, 0.0);
        assert_eq!(report.tests.avg_accuracy, 0.0);
        assert!(report.snapshots.emotional_states.is_empty());
        assert!(report.tests.test_types.is_empty());
    }

    #[test]
    fn snapshot_means_are_rounded_to_one_decimal() {
        let snapshots = vec![snapshot(60.0, 30.0), snapshot(70.0, 40.0), snapshot(75.0, 20.0)];
        let report = aggregate(AnalyticsWindow::OneDay, Utc::now(), &snapshots, &[]);

        assert_eq!(report.snapshots.count, 3);
        // (60 + 70 + 75) / 3 = 68.333...
        assert_eq!(report.snapshots.mental_state.focus, 68.3);
        assert_eq!(report.snapshots.mental_state.stress, 30.0);
        let total: u64 = report.snapshots.emotional_states.values().sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_extremes_and_millisecond_rounding() {
        let results = vec![
            test_result(90.0, 8000, 5),
            test_result(60.0, 12_500, 3),
            test_result(75.0, 10_000, 4),
        ];
        let report = aggregate(AnalyticsWindow::OneWeek, Utc::now(), &[], &results);

        assert_eq!(report.tests.count, 3);
        assert_eq!(report.tests.avg_accuracy, 75.0);
        assert_eq!(report.tests.best_accuracy, 90.0);
        assert_eq!(report.tests.worst_accuracy, 60.0);
        assert_eq!(report.tests.avg_completion_time_ms, 10_167);
        assert_eq!(report.tests.fastest_completion_ms, 8000);
        assert_eq!(report.tests.slowest_completion_ms, 12_500);
        assert_eq!(report.tests.avg_difficulty, 4.0);
        assert_eq!(report.tests.test_types["color_perception"], 3);
    }
}
