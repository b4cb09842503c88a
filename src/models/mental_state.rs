use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Self-reported mental-state vector. All four components are bounded
/// percentages; a value is only constructed through [`MentalState::new`],
/// so a held `MentalState` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalState {
    pub focus: f64,
    pub creativity: f64,
    pub stress: f64,
    pub energy: f64,
}

impl MentalState {
    pub fn new(focus: f64, creativity: f64, stress: f64, energy: f64) -> EngineResult<Self> {
        let state = Self {
            focus,
            creativity,
            stress,
            energy,
        };
        state.validate()?;
        Ok(state)
    }

    /// Default state used when a session is created without one.
    pub fn baseline() -> Self {
        Self {
            focus: 50.0,
            creativity: 50.0,
            stress: 50.0,
            energy: 50.0,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (name, value) in [
            ("focus", self.focus),
            ("creativity", self.creativity),
            ("stress", self.stress),
            ("energy", self.energy),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(EngineError::validation(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Returns a new state with the update's present fields merged in.
    pub fn merged(&self, update: &MentalStateUpdate) -> EngineResult<Self> {
        Self::new(
            update.focus.unwrap_or(self.focus),
            update.creativity.unwrap_or(self.creativity),
            update.stress.unwrap_or(self.stress),
            update.energy.unwrap_or(self.energy),
        )
    }
}

/// Partial mental-state update. Absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateUpdate {
    pub focus: Option<f64>,
    pub creativity: Option<f64>,
    pub stress: Option<f64>,
    pub energy: Option<f64>,
}

impl MentalStateUpdate {
    pub fn is_empty(&self) -> bool {
        self.focus.is_none()
            && self.creativity.is_none()
            && self.stress.is_none()
            && self.energy.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_components() {
        assert!(MentalState::new(101.0, 50.0, 50.0, 50.0).is_err());
        assert!(MentalState::new(50.0, -1.0, 50.0, 50.0).is_err());
        assert!(MentalState::new(50.0, 50.0, f64::NAN, 50.0).is_err());
        assert!(MentalState::new(0.0, 100.0, 0.0, 100.0).is_ok());
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let base = MentalState::baseline();
        let update = MentalStateUpdate {
            focus: Some(80.0),
            stress: Some(20.0),
            ..Default::default()
        };

        let merged = base.merged(&update).unwrap();
        assert_eq!(merged.focus, 80.0);
        assert_eq!(merged.stress, 20.0);
        assert_eq!(merged.creativity, 50.0);
        assert_eq!(merged.energy, 50.0);
    }

    #[test]
    fn merge_validates_result() {
        let base = MentalState::baseline();
        let update = MentalStateUpdate {
            energy: Some(140.0),
            ..Default::default()
        };
        assert!(base.merged(&update).is_err());
    }
}
