//! Session lifecycle and the narrow contract the transport layer calls.
//!
//! The engine holds no mutable state of its own besides the injected RNG;
//! everything mutable lives in storage, keyed by session id. Per-session
//! serialization of the running-average update is handled inside the
//! storage layer (single atomic statement on the single-writer worker).

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use uuid::Uuid;

use crate::analytics::{self, AggregateReport, AnalyticsWindow};
use crate::db::{Database, SessionMutation};
use crate::derive;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ConsciousnessSnapshot, EnvironmentalFactors, MentalState, MentalStateUpdate, Session,
    TestResult, TestType, TrialData,
};
use crate::scoring;

/// Parameters for creating a session. The id is normally generated; callers
/// may supply their own, which must not already exist.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub session_id: Option<String>,
    pub mental_state: Option<MentalState>,
    pub user_agent: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct Engine {
    db: Database,
    rng: Arc<Mutex<StdRng>>,
}

impl Engine {
    pub fn new(db: Database) -> Self {
        Self::with_rng(db, StdRng::from_entropy())
    }

    /// Construct with a seeded RNG so derived jitter is reproducible.
    pub fn with_rng(db: Database, rng: StdRng) -> Self {
        Self {
            db,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn create_session(
        &self,
        request: NewSession,
    ) -> EngineResult<(Session, ConsciousnessSnapshot)> {
        let state = request.mental_state.unwrap_or_else(MentalState::baseline);
        state.validate()?;

        let session_id = match request.session_id {
            Some(id) if id.trim().is_empty() => {
                return Err(EngineError::validation("session id must not be blank"))
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };

        let now = Utc::now();
        let session = Session {
            id: session_id.clone(),
            started_at: now,
            ended_at: None,
            user_agent: request.user_agent,
            location: request.location,
            mental_state: state,
            interactions: 0,
            duration_ms: 0,
            total_tests: 0,
            avg_performance: None,
            created_at: now,
            updated_at: now,
        };
        let snapshot = self.build_snapshot(&session_id, &state, now, now);

        let created = self.db.insert_session(&session, &snapshot).await?;
        if !created {
            return Err(EngineError::Conflict(session_id));
        }

        info!("Created session {session_id}");
        Ok((session, snapshot))
    }

    pub async fn get_session(&self, session_id: &str) -> EngineResult<Session> {
        self.db
            .get_session(session_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(session_id.to_string()))
    }

    /// Merge a partial state update into an active session.
    ///
    /// A non-empty update produces a fresh snapshot (new brainwaves, score,
    /// and label); an empty update only adjusts the interaction counter and
    /// produces none. `interactions` overrides the default +1 increment.
    pub async fn update_state(
        &self,
        session_id: &str,
        update: MentalStateUpdate,
        interactions: Option<u32>,
    ) -> EngineResult<(Session, Option<ConsciousnessSnapshot>)> {
        let current = self.get_session(session_id).await?;
        if !current.is_active() {
            return Err(EngineError::InvalidState(format!(
                "session '{session_id}' already ended"
            )));
        }

        let merged = current.mental_state.merged(&update)?;
        let interactions = interactions.unwrap_or(current.interactions + 1);
        let now = Utc::now();

        let snapshot = if update.is_empty() {
            None
        } else {
            Some(self.build_snapshot(session_id, &merged, current.started_at, now))
        };

        let outcome = self
            .db
            .update_session_state(session_id, merged, interactions, now, snapshot.clone())
            .await?;

        match outcome {
            SessionMutation::Applied(session) => Ok((session, snapshot)),
            SessionMutation::NotFound => Err(EngineError::NotFound(session_id.to_string())),
            SessionMutation::AlreadyEnded => Err(EngineError::InvalidState(format!(
                "session '{session_id}' already ended"
            ))),
        }
    }

    /// Score submitted trials, persist the result, and fold its accuracy
    /// into the session's running performance average.
    pub async fn submit_test(
        &self,
        session_id: &str,
        trials: TrialData,
        mental_state_at_start: MentalState,
        mental_state_at_end: MentalState,
    ) -> EngineResult<TestResult> {
        mental_state_at_start.validate()?;
        mental_state_at_end.validate()?;
        let (scored, outcome) = scoring::build_outcome(trials)?;

        let result = TestResult {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            test_type: outcome.trials.test_type(),
            results: outcome,
            accuracy: scored.accuracy,
            completion_time_ms: scored.completion_time_ms,
            difficulty: scored.difficulty,
            mental_state_at_start,
            mental_state_at_end,
            timestamp: Utc::now(),
        };

        match self.db.record_test_completion(&result).await? {
            SessionMutation::Applied(session) => {
                info!(
                    "Recorded {} test for session {session_id} (accuracy {:.1}, avg {:.1})",
                    result.test_type.as_str(),
                    result.accuracy,
                    session.avg_performance.unwrap_or_default()
                );
                Ok(result)
            }
            SessionMutation::NotFound => Err(EngineError::NotFound(session_id.to_string())),
            SessionMutation::AlreadyEnded => Err(EngineError::InvalidState(format!(
                "session '{session_id}' already ended"
            ))),
        }
    }

    /// Terminal transition; fails if the session has already ended and
    /// never touches a fixed duration again.
    pub async fn end_session(&self, session_id: &str) -> EngineResult<Session> {
        match self.db.end_session(session_id, Utc::now()).await? {
            SessionMutation::Applied(session) => {
                info!(
                    "Ended session {session_id} after {}ms",
                    session.duration_ms
                );
                Ok(session)
            }
            SessionMutation::NotFound => Err(EngineError::NotFound(session_id.to_string())),
            SessionMutation::AlreadyEnded => Err(EngineError::InvalidState(format!(
                "session '{session_id}' already ended"
            ))),
        }
    }

    /// Delete a session and all snapshots and test results it owns.
    pub async fn delete_session(&self, session_id: &str) -> EngineResult<()> {
        let deleted = self.db.delete_session_cascade(session_id).await?;
        if !deleted {
            return Err(EngineError::NotFound(session_id.to_string()));
        }
        info!("Deleted session {session_id} and its dependents");
        Ok(())
    }

    /// Aggregate stored snapshots and test results over a time window.
    /// The test-type filter narrows test aggregates only.
    pub async fn analytics(
        &self,
        window: AnalyticsWindow,
        session_id: Option<String>,
        test_type: Option<TestType>,
    ) -> EngineResult<AggregateReport> {
        let since = window.cutoff(Utc::now());
        let snapshots = self.db.snapshots_since(since, session_id.clone()).await?;
        let results = self
            .db
            .test_results_since(since, session_id, test_type)
            .await?;

        Ok(analytics::aggregate(window, since, &snapshots, &results))
    }

    /// Ended sessions, newest first.
    pub async fn list_sessions(&self, limit: usize, offset: usize) -> EngineResult<Vec<Session>> {
        Ok(self.db.list_sessions_paginated(limit, offset).await?)
    }

    /// End sessions that have been open longer than `max_age`. Intended for
    /// startup recovery after a crash; never runs on its own.
    pub async fn close_stale_sessions(&self, max_age: Duration) -> EngineResult<Vec<Session>> {
        let cutoff = Utc::now() - max_age;
        let mut closed = Vec::new();

        for session in self.db.active_sessions().await? {
            if session.started_at >= cutoff {
                continue;
            }
            warn!("Recovered stale session {}; ending it", session.id);
            if let SessionMutation::Applied(session) =
                self.db.end_session(&session.id, Utc::now()).await?
            {
                closed.push(session);
            }
        }

        Ok(closed)
    }

    fn build_snapshot(
        &self,
        session_id: &str,
        state: &MentalState,
        started_at: chrono::DateTime<Utc>,
        now: chrono::DateTime<Utc>,
    ) -> ConsciousnessSnapshot {
        let waves = derive::derive_brainwaves(state, self.sample_jitter());
        ConsciousnessSnapshot {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            timestamp: now,
            mental_state: *state,
            brainwaves: waves,
            consciousness_score: derive::consciousness_score(state, &waves),
            cognitive_load: derive::cognitive_load(state),
            attention_level: derive::attention_level(state),
            emotional_state: derive::classify_emotion(state),
            environmental_factors: EnvironmentalFactors {
                time_of_day: derive::time_of_day(now),
                session_progress: derive::session_progress(started_at, now),
            },
        }
    }

    fn sample_jitter(&self) -> f64 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen::<f64>()
    }
}
