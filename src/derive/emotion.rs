//! First-match emotional rule cascade.
//!
//! The rules are an ordered table evaluated top to bottom; the order is part
//! of the contract, since several predicates overlap. Reordering entries
//! changes the label for overlapping inputs.

use crate::models::{EmotionalState, MentalState};

struct RuleInput {
    focus: f64,
    creativity: f64,
    stress: f64,
    energy: f64,
    mental_balance: f64,
}

/// Ordered (predicate, label) table. First match wins.
const RULES: &[(fn(&RuleInput) -> bool, EmotionalState)] = &[
    (
        |s| s.focus > 80.0 && s.creativity > 80.0 && s.stress < 30.0,
        EmotionalState::PeakPerformance,
    ),
    (
        |s| s.focus > 70.0 && s.creativity > 70.0 && s.stress < 40.0,
        EmotionalState::FlowState,
    ),
    (
        |s| s.creativity > 80.0 && s.stress < 40.0,
        EmotionalState::HighlyCreative,
    ),
    (
        |s| s.creativity > 60.0 && s.focus > 60.0,
        EmotionalState::FocusedCreative,
    ),
    (
        |s| s.focus > 70.0 && s.stress < 50.0,
        EmotionalState::ActiveConcentration,
    ),
    (
        |s| s.focus > 60.0 && s.stress < 30.0,
        EmotionalState::RelaxedFocus,
    ),
    (
        |s| s.energy > 70.0 && s.stress < 40.0,
        EmotionalState::Energetic,
    ),
    (|s| s.stress > 70.0, EmotionalState::Overwhelmed),
    (
        |s| s.stress > 50.0 && s.focus < 40.0,
        EmotionalState::Stressed,
    ),
    (
        |s| s.focus < 30.0 && s.energy < 40.0,
        EmotionalState::Distracted,
    ),
    (|s| s.mental_balance > 60.0, EmotionalState::Focused),
    (|s| s.stress < 30.0, EmotionalState::Relaxed),
];

/// Classify a mental state into its emotional label. Total: every input
/// maps to a label, with `creative` as the fallback.
pub fn classify_emotion(state: &MentalState) -> EmotionalState {
    let input = RuleInput {
        focus: state.focus,
        creativity: state.creativity,
        stress: state.stress,
        energy: state.energy,
        mental_balance: ((state.focus + state.creativity + state.energy
            + (100.0 - state.stress))
            / 4.0)
            .round(),
    };

    for (predicate, label) in RULES {
        if predicate(&input) {
            return *label;
        }
    }

    EmotionalState::Creative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(focus: f64, creativity: f64, stress: f64, energy: f64) -> EmotionalState {
        classify_emotion(&MentalState::new(focus, creativity, stress, energy).unwrap())
    }

    #[test]
    fn peak_performance_boundary() {
        assert_eq!(classify(81.0, 81.0, 29.0, 50.0), EmotionalState::PeakPerformance);
        // focus exactly 80 falls through to flow_state
        assert_eq!(classify(80.0, 81.0, 29.0, 50.0), EmotionalState::FlowState);
    }

    #[test]
    fn flow_state_boundary() {
        assert_eq!(classify(71.0, 71.0, 39.0, 50.0), EmotionalState::FlowState);
        // stress at 40 misses flow_state; focus>60 && creativity>60 matches focused_creative
        assert_eq!(classify(71.0, 71.0, 40.0, 50.0), EmotionalState::FocusedCreative);
    }

    #[test]
    fn priority_order_decides_overlaps() {
        // Matches both highly_creative (rule 3) and focused_creative (rule 4);
        // the earlier rule wins.
        assert_eq!(classify(65.0, 85.0, 35.0, 50.0), EmotionalState::HighlyCreative);

        // Matches active_concentration before relaxed_focus.
        assert_eq!(classify(75.0, 20.0, 25.0, 50.0), EmotionalState::ActiveConcentration);
    }

    #[test]
    fn stress_rules() {
        assert_eq!(classify(50.0, 50.0, 71.0, 50.0), EmotionalState::Overwhelmed);
        // High focus/creativity under heavy stress still reads focused_creative;
        // rule 4 carries no stress bound and outranks the overwhelmed rule.
        assert_eq!(classify(90.0, 90.0, 71.0, 90.0), EmotionalState::FocusedCreative);
        assert_eq!(classify(35.0, 40.0, 55.0, 50.0), EmotionalState::Stressed);
    }

    #[test]
    fn low_end_rules() {
        assert_eq!(classify(25.0, 40.0, 45.0, 35.0), EmotionalState::Distracted);
        // Balance ((55+55+65+70)/4 = 61) above 60 -> focused
        assert_eq!(classify(55.0, 55.0, 30.0, 65.0), EmotionalState::Focused);
        assert_eq!(classify(40.0, 30.0, 20.0, 45.0), EmotionalState::Relaxed);
    }

    #[test]
    fn fallback_is_creative() {
        // stress in [30,50], focus low-mid, balance <= 60: no rule fires
        assert_eq!(classify(40.0, 40.0, 45.0, 45.0), EmotionalState::Creative);
    }

    #[test]
    fn classification_is_deterministic() {
        let state = MentalState::new(62.0, 58.0, 33.0, 47.0).unwrap();
        let first = classify_emotion(&state);
        for _ in 0..10 {
            assert_eq!(classify_emotion(&state), first);
        }
    }
}
