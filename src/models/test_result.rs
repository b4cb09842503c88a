use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MentalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    ReactionTime,
    MemorySequence,
    ColorPerception,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::ReactionTime => "reaction_time",
            TestType::MemorySequence => "memory_sequence",
            TestType::ColorPerception => "color_perception",
        }
    }
}

/// Raw trial data submitted for one test, tagged by test type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "testType", rename_all = "snake_case")]
pub enum TrialData {
    /// Ordered per-trial latencies in milliseconds.
    ReactionTime { trials: Vec<f64> },
    MemorySequence { rounds: Vec<MemoryRound> },
    ColorPerception { trials: Vec<ColorTrial> },
}

impl TrialData {
    pub fn test_type(&self) -> TestType {
        match self {
            TrialData::ReactionTime { .. } => TestType::ReactionTime,
            TrialData::MemorySequence { .. } => TestType::MemorySequence,
            TrialData::ColorPerception { .. } => TestType::ColorPerception,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TrialData::ReactionTime { trials } => trials.is_empty(),
            TrialData::MemorySequence { rounds } => rounds.is_empty(),
            TrialData::ColorPerception { trials } => trials.is_empty(),
        }
    }
}

/// One round of the memory-sequence test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRound {
    /// Sequence length presented this round.
    pub length: u32,
    pub correct: bool,
    /// Response time in milliseconds.
    pub time: f64,
}

/// One trial of the color-perception test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTrial {
    /// Presented discrimination difficulty for the trial (informational).
    pub difficulty: u32,
    pub correct: bool,
    /// Response time in milliseconds.
    pub response_time: f64,
}

/// Response-time trend across memory rounds (early half vs late half).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementPattern {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl ImprovementPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementPattern::Improving => "improving",
            ImprovementPattern::Declining => "declining",
            ImprovementPattern::Stable => "stable",
            ImprovementPattern::InsufficientData => "insufficient_data",
        }
    }
}

/// Per-test-type detail metrics, persisted alongside the raw trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "testType", rename_all = "snake_case")]
pub enum TestMetrics {
    #[serde(rename_all = "camelCase")]
    ReactionTime {
        average_ms: f64,
        /// 0-1; 1 means identical latencies across trials.
        consistency: f64,
        speed_score: f64,
    },
    #[serde(rename_all = "camelCase")]
    MemorySequence {
        max_sequence: u32,
        correct_rounds: u32,
        improvement: ImprovementPattern,
    },
    #[serde(rename_all = "camelCase")]
    ColorPerception { correct_trials: u32 },
}

/// Scored outcome of one test, stored as the test result's tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub trials: TrialData,
    pub metrics: TestMetrics,
    /// Accuracy scaled by dynamic difficulty, with a fast-completion bonus.
    pub performance_score: u8,
    /// Accuracy per second of completion time, rounded to 2 decimals.
    pub efficiency: f64,
}

/// Immutable record of one test submission, owned by its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub session_id: String,
    pub test_type: TestType,
    pub results: TestOutcome,
    pub accuracy: f64,
    pub completion_time_ms: u64,
    /// Dynamic difficulty rating, 1..=5, derived post hoc from performance.
    pub difficulty: u8,
    pub mental_state_at_start: MentalState,
    pub mental_state_at_end: MentalState,
    pub timestamp: DateTime<Utc>,
}
