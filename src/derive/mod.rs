//! Pure derivations from a self-reported mental state: synthetic brainwave
//! bands, the blended consciousness score, and the snapshot context tags.
//!
//! Everything here is deterministic; the one jittered term (delta band) takes
//! the sampled jitter as an argument so callers own the randomness.

pub mod emotion;

pub use emotion::classify_emotion;

use chrono::{DateTime, Timelike, Utc};

use crate::models::{Brainwaves, MentalState, TimeOfDay};

/// Nominal session length used to tag snapshot progress.
const SESSION_WINDOW_MS: f64 = 30.0 * 60.0 * 1000.0;

/// Map a mental state onto the five synthetic frequency bands.
///
/// `delta_jitter` is expected in `[0, 1)` (one uniform sample); out-of-range
/// values are clamped so the delta band stays within its 1-3 Hz band.
pub fn derive_brainwaves(state: &MentalState, delta_jitter: f64) -> Brainwaves {
    Brainwaves {
        alpha: 8.0 + (state.creativity / 100.0) * 5.0,
        beta: 13.0 + (state.focus / 100.0) * 17.0,
        theta: 4.0 + ((100.0 - state.stress) / 100.0) * 4.0,
        gamma: 30.0 + ((state.focus + state.creativity) / 200.0) * 70.0,
        delta: 1.0 + delta_jitter.clamp(0.0, 1.0) * 2.0,
    }
}

/// Blend the mental-state components (70%) with the derived bands (30%)
/// into a single 0-100 score. Clamped even for out-of-range inputs.
pub fn consciousness_score(state: &MentalState, waves: &Brainwaves) -> u8 {
    let mental = state.focus * 0.30
        + state.creativity * 0.25
        + state.energy * 0.20
        + (100.0 - state.stress) * 0.25;

    let wave = (waves.alpha / 12.0).min(1.0) * 25.0
        + (waves.beta / 25.0).min(1.0) * 30.0
        + (waves.theta / 8.0).min(1.0) * 20.0
        + (waves.gamma / 50.0).min(1.0) * 25.0;

    (mental * 0.7 + wave * 0.3).clamp(0.0, 100.0).round() as u8
}

pub fn cognitive_load(state: &MentalState) -> u8 {
    (((100.0 - state.focus + state.stress) / 2.0).clamp(0.0, 100.0)).round() as u8
}

pub fn attention_level(state: &MentalState) -> u8 {
    (((state.focus + state.energy) / 2.0).clamp(0.0, 100.0)).round() as u8
}

/// Bucket a timestamp's UTC hour into a coarse time-of-day tag.
pub fn time_of_day(timestamp: DateTime<Utc>) -> TimeOfDay {
    match timestamp.hour() {
        5..=11 => TimeOfDay::Morning,
        12..=16 => TimeOfDay::Afternoon,
        17..=20 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Fraction of the nominal 30-minute session window elapsed, clamped to [0, 1].
pub fn session_progress(started_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - started_at).num_milliseconds().max(0) as f64;
    (elapsed_ms / SESSION_WINDOW_MS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn state(focus: f64, creativity: f64, stress: f64, energy: f64) -> MentalState {
        MentalState::new(focus, creativity, stress, energy).unwrap()
    }

    #[test]
    fn bands_stay_within_documented_ranges() {
        for &focus in &[0.0, 25.0, 50.0, 75.0, 100.0] {
            for &creativity in &[0.0, 50.0, 100.0] {
                for &stress in &[0.0, 50.0, 100.0] {
                    let s = state(focus, creativity, stress, 50.0);
                    for &jitter in &[0.0, 0.5, 0.999] {
                        let w = derive_brainwaves(&s, jitter);
                        assert!((8.0..=13.0).contains(&w.alpha), "alpha {}", w.alpha);
                        assert!((13.0..=30.0).contains(&w.beta), "beta {}", w.beta);
                        assert!((4.0..=8.0).contains(&w.theta), "theta {}", w.theta);
                        assert!((30.0..=100.0).contains(&w.gamma), "gamma {}", w.gamma);
                        assert!((1.0..=3.0).contains(&w.delta), "delta {}", w.delta);
                    }
                }
            }
        }
    }

    #[test]
    fn delta_jitter_is_clamped() {
        let s = MentalState::baseline();
        let w = derive_brainwaves(&s, 7.5);
        assert!(w.delta <= 3.0);
        let w = derive_brainwaves(&s, -2.0);
        assert!(w.delta >= 1.0);
    }

    #[test]
    fn score_is_bounded_for_all_inputs() {
        for &focus in &[0.0, 50.0, 100.0] {
            for &creativity in &[0.0, 50.0, 100.0] {
                for &stress in &[0.0, 50.0, 100.0] {
                    for &energy in &[0.0, 50.0, 100.0] {
                        let s = state(focus, creativity, stress, energy);
                        let w = derive_brainwaves(&s, 0.5);
                        let score = consciousness_score(&s, &w);
                        assert!(score <= 100);
                    }
                }
            }
        }
    }

    #[test]
    fn score_is_monotone_in_each_component() {
        let base = state(50.0, 50.0, 50.0, 50.0);
        let jitter = 0.5;
        let base_score = {
            let w = derive_brainwaves(&base, jitter);
            consciousness_score(&base, &w)
        };

        // Raising focus, creativity, or energy never lowers the score.
        for raised in [
            state(70.0, 50.0, 50.0, 50.0),
            state(50.0, 70.0, 50.0, 50.0),
            state(50.0, 50.0, 50.0, 70.0),
        ] {
            let w = derive_brainwaves(&raised, jitter);
            assert!(consciousness_score(&raised, &w) >= base_score);
        }

        // Raising stress never raises it.
        let stressed = state(50.0, 50.0, 70.0, 50.0);
        let w = derive_brainwaves(&stressed, jitter);
        assert!(consciousness_score(&stressed, &w) <= base_score);
    }

    #[test]
    fn load_and_attention_formulas() {
        let s = state(80.0, 50.0, 20.0, 60.0);
        assert_eq!(cognitive_load(&s), 20); // (100 - 80 + 20) / 2
        assert_eq!(attention_level(&s), 70); // (80 + 60) / 2
    }

    #[test]
    fn time_of_day_boundaries() {
        let at = |hour| Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        assert_eq!(time_of_day(at(4)), TimeOfDay::Night);
        assert_eq!(time_of_day(at(5)), TimeOfDay::Morning);
        assert_eq!(time_of_day(at(11)), TimeOfDay::Morning);
        assert_eq!(time_of_day(at(12)), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(at(16)), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(at(17)), TimeOfDay::Evening);
        assert_eq!(time_of_day(at(20)), TimeOfDay::Evening);
        assert_eq!(time_of_day(at(21)), TimeOfDay::Night);
    }

    #[test]
    fn session_progress_clamps_to_window() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(session_progress(start, start), 0.0);

        let mid = start + Duration::minutes(15);
        assert!((session_progress(start, mid) - 0.5).abs() < 1e-9);

        let late = start + Duration::hours(2);
        assert_eq!(session_progress(start, late), 1.0);

        // Clock skew must not produce a negative fraction.
        let before = start - Duration::minutes(1);
        assert_eq!(session_progress(start, before), 0.0);
    }
}
