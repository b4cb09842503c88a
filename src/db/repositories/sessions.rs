use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, to_i64, to_u32, to_u64},
};
use crate::models::{ConsciousnessSnapshot, MentalState, Session, TestResult};

use super::{snapshots, test_results};

/// Result of a conditional mutation against a session row.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMutation {
    Applied(Session),
    NotFound,
    AlreadyEnded,
}

const SESSION_COLUMNS: &str = "id, started_at, ended_at, user_agent, location, \
     focus, creativity, stress, energy, interactions, duration_ms, total_tests, \
     avg_performance, created_at, updated_at";

fn row_to_session(row: &Row) -> Result<Session> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let interactions: i64 = row.get("interactions")?;
    let duration_ms: i64 = row.get("duration_ms")?;
    let total_tests: i64 = row.get("total_tests")?;

    Ok(Session {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        user_agent: row.get("user_agent")?,
        location: row.get("location")?,
        mental_state: MentalState {
            focus: row.get("focus")?,
            creativity: row.get("creativity")?,
            stress: row.get("stress")?,
            energy: row.get("energy")?,
        },
        interactions: to_u32(interactions, "interactions")?,
        duration_ms: to_u64(duration_ms, "duration_ms")?,
        total_tests: to_u32(total_tests, "total_tests")?,
        avg_performance: row.get("avg_performance")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub(crate) fn fetch_session(conn: &Connection, session_id: &str) -> Result<Option<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
    ))?;

    let mut rows = stmt.query(params![session_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_session(row)?)),
        None => Ok(None),
    }
}

fn insert_session_row(conn: &Connection, session: &Session) -> Result<usize> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO sessions (id, started_at, ended_at, user_agent, location,
             focus, creativity, stress, energy, interactions, duration_ms, total_tests,
             avg_performance, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            session.id,
            session.started_at.to_rfc3339(),
            session.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
            session.user_agent,
            session.location,
            session.mental_state.focus,
            session.mental_state.creativity,
            session.mental_state.stress,
            session.mental_state.energy,
            i64::from(session.interactions),
            to_i64(session.duration_ms)?,
            i64::from(session.total_tests),
            session.avg_performance,
            session.created_at.to_rfc3339(),
            session.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(rows)
}

impl Database {
    /// Insert a session and its initial snapshot atomically.
    /// Returns `false` without touching anything if the id is already taken.
    pub async fn insert_session(
        &self,
        session: &Session,
        snapshot: &ConsciousnessSnapshot,
    ) -> Result<bool> {
        let session = session.clone();
        let snapshot = snapshot.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let created = insert_session_row(&tx, &session)
                .with_context(|| "failed to insert session")?
                > 0;
            if created {
                snapshots::insert_snapshot(&tx, &snapshot)
                    .with_context(|| "failed to insert initial snapshot")?;
            }

            tx.commit()?;
            Ok(created)
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| fetch_session(conn, &session_id))
            .await
    }

    /// Apply a merged mental state (and interaction counter) to an active
    /// session, inserting the derived snapshot in the same transaction.
    pub async fn update_session_state(
        &self,
        session_id: &str,
        state: MentalState,
        interactions: u32,
        updated_at: DateTime<Utc>,
        snapshot: Option<ConsciousnessSnapshot>,
    ) -> Result<SessionMutation> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let rows = tx.execute(
                "UPDATE sessions
                 SET focus = ?1,
                     creativity = ?2,
                     stress = ?3,
                     energy = ?4,
                     interactions = ?5,
                     updated_at = ?6
                 WHERE id = ?7 AND ended_at IS NULL",
                params![
                    state.focus,
                    state.creativity,
                    state.stress,
                    state.energy,
                    i64::from(interactions),
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )?;

            if rows == 0 {
                let outcome = match fetch_session(&tx, &session_id)? {
                    Some(_) => SessionMutation::AlreadyEnded,
                    None => SessionMutation::NotFound,
                };
                tx.commit()?;
                return Ok(outcome);
            }

            if let Some(snapshot) = snapshot.as_ref() {
                snapshots::insert_snapshot(&tx, snapshot)
                    .with_context(|| "failed to insert state snapshot")?;
            }

            let session = fetch_session(&tx, &session_id)?
                .context("session vanished during state update")?;
            tx.commit()?;
            Ok(SessionMutation::Applied(session))
        })
        .await
    }

    /// Persist a test result and fold its accuracy into the session's
    /// running average in one statement. The increment and the incremental
    /// mean are recomputed from the pre-update row inside SQLite, so two
    /// concurrent submissions can never lose an update.
    pub async fn record_test_completion(&self, result: &TestResult) -> Result<SessionMutation> {
        let result = result.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let rows = tx.execute(
                "UPDATE sessions
                 SET total_tests = total_tests + 1,
                     avg_performance = COALESCE(avg_performance, 0.0)
                         + (?1 - COALESCE(avg_performance, 0.0)) / (total_tests + 1),
                     updated_at = ?2
                 WHERE id = ?3 AND ended_at IS NULL",
                params![
                    result.accuracy,
                    result.timestamp.to_rfc3339(),
                    result.session_id,
                ],
            )?;

            if rows == 0 {
                let outcome = match fetch_session(&tx, &result.session_id)? {
                    Some(_) => SessionMutation::AlreadyEnded,
                    None => SessionMutation::NotFound,
                };
                tx.commit()?;
                return Ok(outcome);
            }

            test_results::insert_test_result(&tx, &result)
                .with_context(|| "failed to insert test result")?;

            let session = fetch_session(&tx, &result.session_id)?
                .context("session vanished during test completion")?;
            tx.commit()?;
            Ok(SessionMutation::Applied(session))
        })
        .await
    }

    /// Terminal transition: fixes `ended_at` and `duration_ms` exactly once.
    pub async fn end_session(
        &self,
        session_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<SessionMutation> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let current = match fetch_session(&tx, &session_id)? {
                Some(session) => session,
                None => {
                    tx.commit()?;
                    return Ok(SessionMutation::NotFound);
                }
            };
            if current.ended_at.is_some() {
                tx.commit()?;
                return Ok(SessionMutation::AlreadyEnded);
            }

            let duration_ms = (ended_at - current.started_at).num_milliseconds().max(0) as u64;
            tx.execute(
                "UPDATE sessions
                 SET ended_at = ?1,
                     duration_ms = ?2,
                     updated_at = ?1
                 WHERE id = ?3",
                params![ended_at.to_rfc3339(), to_i64(duration_ms)?, session_id],
            )?;

            let session = fetch_session(&tx, &session_id)?
                .context("session vanished while ending")?;
            tx.commit()?;
            Ok(SessionMutation::Applied(session))
        })
        .await
    }

    /// Delete a session and everything it owns. Dependents go first so a
    /// failure mid-transaction never leaves orphaned records.
    pub async fn delete_session_cascade(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "DELETE FROM test_results WHERE session_id = ?1",
                params![session_id],
            )?;
            tx.execute(
                "DELETE FROM snapshots WHERE session_id = ?1",
                params![session_id],
            )?;
            let rows = tx.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;

            tx.commit()?;
            Ok(rows > 0)
        })
        .await
    }

    /// Ended sessions, newest first.
    pub async fn list_sessions_paginated(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Session>> {
        let limit = limit as i64;
        let offset = offset as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE ended_at IS NOT NULL
                 ORDER BY started_at DESC
                 LIMIT ?1 OFFSET ?2"
            ))?;

            let mut rows = stmt.query(params![limit, offset])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }

    /// Sessions still open, oldest first. Used by the stale-session sweep.
    pub async fn active_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE ended_at IS NULL
                 ORDER BY started_at ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
