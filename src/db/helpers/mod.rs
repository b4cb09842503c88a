use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::models::{EmotionalState, TestType, TimeOfDay};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} is out of range: {value}"))
}

pub fn to_u8(value: i64, field: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| anyhow!("{field} is out of range: {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_emotional_state(value: &str) -> Result<EmotionalState> {
    match value {
        "peak_performance" => Ok(EmotionalState::PeakPerformance),
        "flow_state" => Ok(EmotionalState::FlowState),
        "highly_creative" => Ok(EmotionalState::HighlyCreative),
        "focused_creative" => Ok(EmotionalState::FocusedCreative),
        "active_concentration" => Ok(EmotionalState::ActiveConcentration),
        "relaxed_focus" => Ok(EmotionalState::RelaxedFocus),
        "energetic" => Ok(EmotionalState::Energetic),
        "overwhelmed" => Ok(EmotionalState::Overwhelmed),
        "stressed" => Ok(EmotionalState::Stressed),
        "distracted" => Ok(EmotionalState::Distracted),
        "focused" => Ok(EmotionalState::Focused),
        "relaxed" => Ok(EmotionalState::Relaxed),
        "creative" => Ok(EmotionalState::Creative),
        other => Err(anyhow!("unknown emotional state '{other}'")),
    }
}

pub fn parse_time_of_day(value: &str) -> Result<TimeOfDay> {
    match value {
        "morning" => Ok(TimeOfDay::Morning),
        "afternoon" => Ok(TimeOfDay::Afternoon),
        "evening" => Ok(TimeOfDay::Evening),
        "night" => Ok(TimeOfDay::Night),
        other => Err(anyhow!("unknown time of day '{other}'")),
    }
}

pub fn parse_test_type(value: &str) -> Result<TestType> {
    match value {
        "reaction_time" => Ok(TestType::ReactionTime),
        "memory_sequence" => Ok(TestType::MemorySequence),
        "color_perception" => Ok(TestType::ColorPerception),
        other => Err(anyhow!("unknown test type '{other}'")),
    }
}
