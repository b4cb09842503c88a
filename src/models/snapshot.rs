use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Brainwaves, MentalState};

/// Categorical label from the fixed-priority emotional rule cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    PeakPerformance,
    FlowState,
    HighlyCreative,
    FocusedCreative,
    ActiveConcentration,
    RelaxedFocus,
    Energetic,
    Overwhelmed,
    Stressed,
    Distracted,
    Focused,
    Relaxed,
    Creative,
}

impl EmotionalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalState::PeakPerformance => "peak_performance",
            EmotionalState::FlowState => "flow_state",
            EmotionalState::HighlyCreative => "highly_creative",
            EmotionalState::FocusedCreative => "focused_creative",
            EmotionalState::ActiveConcentration => "active_concentration",
            EmotionalState::RelaxedFocus => "relaxed_focus",
            EmotionalState::Energetic => "energetic",
            EmotionalState::Overwhelmed => "overwhelmed",
            EmotionalState::Stressed => "stressed",
            EmotionalState::Distracted => "distracted",
            EmotionalState::Focused => "focused",
            EmotionalState::Relaxed => "relaxed",
            EmotionalState::Creative => "creative",
        }
    }
}

/// Coarse time-of-day bucket derived from the snapshot timestamp (UTC hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Context tags attached to a snapshot at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalFactors {
    pub time_of_day: TimeOfDay,
    /// Fraction of the nominal 30-minute session window elapsed, clamped to [0, 1].
    pub session_progress: f64,
}

/// Immutable, timestamped record of derived state at one instant.
///
/// Created on session start and on every mental-state update, never mutated
/// afterwards, and deleted together with its owning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsciousnessSnapshot {
    pub id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub mental_state: MentalState,
    pub brainwaves: Brainwaves,
    /// Blended 0-100 figure from mental state and brainwave bands.
    pub consciousness_score: u8,
    pub cognitive_load: u8,
    pub attention_level: u8,
    pub emotional_state: EmotionalState,
    pub environmental_factors: EnvironmentalFactors,
}
