use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MentalState;

/// The unit of a user's interaction lifetime.
///
/// A session is active while `ended_at` is `None` and terminal once it is
/// set; `duration_ms` is fixed at end time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub user_agent: Option<String>,
    pub location: Option<String>,
    /// Current self-reported state; replaced by state updates.
    pub mental_state: MentalState,
    pub interactions: u32,
    pub duration_ms: u64,
    pub total_tests: u32,
    /// Running mean of test accuracies; `None` until the first test completes.
    pub avg_performance: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
