use serde::{Deserialize, Serialize};

/// Synthetic five-band frequency vector, in Hz. Derived from a
/// [`MentalState`](super::MentalState) via [`crate::derive::derive_brainwaves`];
/// never constructed from measured signals and never stored apart from the
/// state that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brainwaves {
    /// Relaxed awareness band, 8-13 Hz.
    pub alpha: f64,
    /// Active concentration band, 13-30 Hz.
    pub beta: f64,
    /// Drowsy/meditative band, 4-8 Hz.
    pub theta: f64,
    /// High-level integration band, 30-100 Hz.
    pub gamma: f64,
    /// Deep-sleep band, 1-3 Hz. Carries the one jittered term.
    pub delta: f64,
}
