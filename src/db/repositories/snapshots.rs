use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_emotional_state, parse_time_of_day, to_u8},
};
use crate::models::{Brainwaves, ConsciousnessSnapshot, EnvironmentalFactors, MentalState};

fn row_to_snapshot(row: &Row) -> Result<ConsciousnessSnapshot> {
    let timestamp: String = row.get("timestamp")?;
    let emotional_state: String = row.get("emotional_state")?;
    let time_of_day: String = row.get("time_of_day")?;
    let consciousness_score: i64 = row.get("consciousness_score")?;
    let cognitive_load: i64 = row.get("cognitive_load")?;
    let attention_level: i64 = row.get("attention_level")?;

    Ok(ConsciousnessSnapshot {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        mental_state: MentalState {
            focus: row.get("focus")?,
            creativity: row.get("creativity")?,
            stress: row.get("stress")?,
            energy: row.get("energy")?,
        },
        brainwaves: Brainwaves {
            alpha: row.get("alpha")?,
            beta: row.get("beta")?,
            theta: row.get("theta")?,
            gamma: row.get("gamma")?,
            delta: row.get("delta")?,
        },
        consciousness_score: to_u8(consciousness_score, "consciousness_score")?,
        cognitive_load: to_u8(cognitive_load, "cognitive_load")?,
        attention_level: to_u8(attention_level, "attention_level")?,
        emotional_state: parse_emotional_state(&emotional_state)?,
        environmental_factors: EnvironmentalFactors {
            time_of_day: parse_time_of_day(&time_of_day)?,
            session_progress: row.get("session_progress")?,
        },
    })
}

/// Insert a snapshot row. Runs inside the caller's transaction when a
/// session mutation creates one.
pub(crate) fn insert_snapshot(conn: &Connection, snapshot: &ConsciousnessSnapshot) -> Result<()> {
    conn.execute(
        "INSERT INTO snapshots (id, session_id, timestamp, focus, creativity, stress, energy,
             alpha, beta, theta, gamma, delta, consciousness_score, cognitive_load,
             attention_level, emotional_state, time_of_day, session_progress)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            snapshot.id,
            snapshot.session_id,
            snapshot.timestamp.to_rfc3339(),
            snapshot.mental_state.focus,
            snapshot.mental_state.creativity,
            snapshot.mental_state.stress,
            snapshot.mental_state.energy,
            snapshot.brainwaves.alpha,
            snapshot.brainwaves.beta,
            snapshot.brainwaves.theta,
            snapshot.brainwaves.gamma,
            snapshot.brainwaves.delta,
            i64::from(snapshot.consciousness_score),
            i64::from(snapshot.cognitive_load),
            i64::from(snapshot.attention_level),
            snapshot.emotional_state.as_str(),
            snapshot.environmental_factors.time_of_day.as_str(),
            snapshot.environmental_factors.session_progress,
        ],
    )?;
    Ok(())
}

const SNAPSHOT_COLUMNS: &str = "id, session_id, timestamp, focus, creativity, stress, energy, \
     alpha, beta, theta, gamma, delta, consciousness_score, cognitive_load, attention_level, \
     emotional_state, time_of_day, session_progress";

impl Database {
    /// Snapshots at or after `cutoff`, optionally limited to one session.
    pub async fn snapshots_since(
        &self,
        cutoff: DateTime<Utc>,
        session_id: Option<String>,
    ) -> Result<Vec<ConsciousnessSnapshot>> {
        self.execute(move |conn| {
            let cutoff = cutoff.to_rfc3339();
            let mut snapshots = Vec::new();

            match session_id {
                Some(session_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
                         WHERE timestamp >= ?1 AND session_id = ?2
                         ORDER BY timestamp ASC"
                    ))?;
                    let mut rows = stmt.query(params![cutoff, session_id])?;
                    while let Some(row) = rows.next()? {
                        snapshots.push(row_to_snapshot(row)?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
                         WHERE timestamp >= ?1
                         ORDER BY timestamp ASC"
                    ))?;
                    let mut rows = stmt.query(params![cutoff])?;
                    while let Some(row) = rows.next()? {
                        snapshots.push(row_to_snapshot(row)?);
                    }
                }
            }

            Ok(snapshots)
        })
        .await
    }

    /// All snapshots owned by one session, oldest first.
    pub async fn snapshots_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ConsciousnessSnapshot>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut snapshots = Vec::new();
            while let Some(row) = rows.next()? {
                snapshots.push(row_to_snapshot(row)?);
            }

            Ok(snapshots)
        })
        .await
    }
}
