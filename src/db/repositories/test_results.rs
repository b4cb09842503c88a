use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_test_type, to_i64, to_u64, to_u8},
};
use crate::models::{MentalState, TestOutcome, TestResult, TestType};

fn row_to_test_result(row: &Row) -> Result<TestResult> {
    let timestamp: String = row.get("timestamp")?;
    let test_type: String = row.get("test_type")?;
    let results_json: String = row.get("results")?;
    let completion_time_ms: i64 = row.get("completion_time_ms")?;
    let difficulty: i64 = row.get("difficulty")?;

    let results: TestOutcome = serde_json::from_str(&results_json)
        .with_context(|| "failed to decode test result payload")?;

    Ok(TestResult {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        test_type: parse_test_type(&test_type)?,
        results,
        accuracy: row.get("accuracy")?,
        completion_time_ms: to_u64(completion_time_ms, "completion_time_ms")?,
        difficulty: to_u8(difficulty, "difficulty")?,
        mental_state_at_start: MentalState {
            focus: row.get("start_focus")?,
            creativity: row.get("start_creativity")?,
            stress: row.get("start_stress")?,
            energy: row.get("start_energy")?,
        },
        mental_state_at_end: MentalState {
            focus: row.get("end_focus")?,
            creativity: row.get("end_creativity")?,
            stress: row.get("end_stress")?,
            energy: row.get("end_energy")?,
        },
        timestamp: parse_datetime(&timestamp, "timestamp")?,
    })
}

/// Insert a test result row. Runs inside the session-update transaction of
/// `record_test_completion`.
pub(crate) fn insert_test_result(conn: &Connection, result: &TestResult) -> Result<()> {
    let results_json = serde_json::to_string(&result.results)
        .with_context(|| "failed to encode test result payload")?;

    conn.execute(
        "INSERT INTO test_results (id, session_id, test_type, results, accuracy,
             completion_time_ms, difficulty, start_focus, start_creativity, start_stress,
             start_energy, end_focus, end_creativity, end_stress, end_energy, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            result.id,
            result.session_id,
            result.test_type.as_str(),
            results_json,
            result.accuracy,
            to_i64(result.completion_time_ms)?,
            i64::from(result.difficulty),
            result.mental_state_at_start.focus,
            result.mental_state_at_start.creativity,
            result.mental_state_at_start.stress,
            result.mental_state_at_start.energy,
            result.mental_state_at_end.focus,
            result.mental_state_at_end.creativity,
            result.mental_state_at_end.stress,
            result.mental_state_at_end.energy,
            result.timestamp.to_rfc3339(),
        ],
    )?;
    Ok(())
}

const TEST_RESULT_COLUMNS: &str = "id, session_id, test_type, results, accuracy, \
     completion_time_ms, difficulty, start_focus, start_creativity, start_stress, start_energy, \
     end_focus, end_creativity, end_stress, end_energy, timestamp";

impl Database {
    /// Test results at or after `cutoff`, optionally filtered by session
    /// and/or test type.
    pub async fn test_results_since(
        &self,
        cutoff: DateTime<Utc>,
        session_id: Option<String>,
        test_type: Option<TestType>,
    ) -> Result<Vec<TestResult>> {
        self.execute(move |conn| {
            let mut sql = format!(
                "SELECT {TEST_RESULT_COLUMNS} FROM test_results WHERE timestamp >= ?1"
            );
            let mut values: Vec<Box<dyn rusqlite::ToSql>> =
                vec![Box::new(cutoff.to_rfc3339())];

            if let Some(session_id) = session_id {
                values.push(Box::new(session_id));
                sql.push_str(&format!(" AND session_id = ?{}", values.len()));
            }
            if let Some(test_type) = test_type {
                values.push(Box::new(test_type.as_str()));
                sql.push_str(&format!(" AND test_type = ?{}", values.len()));
            }
            sql.push_str(" ORDER BY timestamp ASC");

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|v| v.as_ref()).collect();

            let mut rows = stmt.query(params.as_slice())?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_test_result(row)?);
            }

            Ok(results)
        })
        .await
    }

    /// All test results owned by one session, oldest first.
    pub async fn test_results_for_session(&self, session_id: &str) -> Result<Vec<TestResult>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEST_RESULT_COLUMNS} FROM test_results
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_test_result(row)?);
            }

            Ok(results)
        })
        .await
    }
}
