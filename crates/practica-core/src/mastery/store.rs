//! Mastery record persistence.
//!
//! Provides SQLite-backed storage for per-learner mastery records. One
//! database holds every learner; a [`MasteryStore`] is the view of a single
//! learner and is the only writer of that learner's rows.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::rule::MasteryRule;
use crate::error::{PracticaError, PracticaResult};
use crate::types::MasteryRecord;

/// Shared handle to the mastery database.
#[derive(Clone)]
pub struct MasteryDb {
    conn: Arc<Mutex<Connection>>,
}

impl MasteryDb {
    /// Open (or create) the database at `path`.
    ///
    /// Creates parent directories and the schema if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> PracticaResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> PracticaResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> PracticaResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> PracticaResult<()> {
        let conn = lock(&self.conn)?;

        conn.execute_batch(
            "
            -- One row per (learner, skill); seq keeps first-attempt order
            CREATE TABLE IF NOT EXISTS mastery_records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                skill_id TEXT NOT NULL,
                score REAL NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                last_seen_at TEXT NOT NULL,
                due_review_at TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, skill_id)
            );

            CREATE INDEX IF NOT EXISTS idx_mastery_records_user ON mastery_records(user_id);
            ",
        )?;

        Ok(())
    }

    /// Open the view of one learner's records.
    pub fn store(&self, user_id: impl Into<String>, rule: MasteryRule) -> MasteryStore {
        MasteryStore {
            conn: self.conn.clone(),
            user_id: user_id.into(),
            rule,
        }
    }

    /// Number of distinct learners with at least one record.
    pub fn learner_count(&self) -> PracticaResult<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM mastery_records",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// A learner's mastery records together with the rule that updates them.
#[derive(Clone)]
pub struct MasteryStore {
    conn: Arc<Mutex<Connection>>,
    user_id: String,
    rule: MasteryRule,
}

impl MasteryStore {
    /// Create a store on a private in-memory database.
    pub fn in_memory(user_id: impl Into<String>) -> PracticaResult<Self> {
        Ok(MasteryDb::in_memory()?.store(user_id, MasteryRule::default()))
    }

    /// The learner this store belongs to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The update rule applied by [`record_attempt`](Self::record_attempt).
    pub fn rule(&self) -> &MasteryRule {
        &self.rule
    }

    /// Apply one graded attempt and persist the result.
    ///
    /// Creates the record on the first attempt. The read and the write run
    /// in one transaction.
    pub fn record_attempt(
        &self,
        skill_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> PracticaResult<MasteryRecord> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let previous = select_record(&tx, &self.user_id, skill_id)?;
        let record = self.rule.apply(previous, skill_id, correct, now);

        tx.execute(
            "INSERT INTO mastery_records
             (user_id, skill_id, score, attempts, last_seen_at, due_review_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id, skill_id) DO UPDATE SET
                score = excluded.score,
                attempts = excluded.attempts,
                last_seen_at = excluded.last_seen_at,
                due_review_at = excluded.due_review_at,
                updated_at = excluded.updated_at",
            params![
                self.user_id,
                skill_id,
                record.score,
                record.attempts,
                format_ts(record.last_seen_at),
                record.due_review_at.map(format_ts),
                format_ts(Utc::now()),
            ],
        )?;
        tx.commit()?;

        debug!(
            user_id = %self.user_id,
            skill_id,
            correct,
            score = record.score,
            attempts = record.attempts,
            "Recorded attempt"
        );

        Ok(record)
    }

    /// Get the record for a skill, if it has ever been attempted.
    pub fn get(&self, skill_id: &str) -> PracticaResult<Option<MasteryRecord>> {
        let conn = lock(&self.conn)?;
        select_record(&conn, &self.user_id, skill_id)
    }

    /// All records in the order their skills were first attempted.
    pub fn records(&self) -> PracticaResult<Vec<MasteryRecord>> {
        let conn = lock(&self.conn)?;

        let mut stmt = conn.prepare(
            "SELECT skill_id, score, attempts, last_seen_at, due_review_at
             FROM mastery_records
             WHERE user_id = ?1
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map(params![self.user_id], RawRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }

    /// Number of stored records.
    pub fn count(&self) -> PracticaResult<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM mastery_records WHERE user_id = ?1",
            params![self.user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete every record of this learner. Returns the number removed.
    pub fn reset(&self) -> PracticaResult<usize> {
        let conn = lock(&self.conn)?;
        let deleted = conn.execute(
            "DELETE FROM mastery_records WHERE user_id = ?1",
            params![self.user_id],
        )?;
        debug!(user_id = %self.user_id, deleted, "Reset mastery records");
        Ok(deleted)
    }
}

fn lock(conn: &Mutex<Connection>) -> PracticaResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| PracticaError::database(e.to_string()))
}

fn select_record(
    conn: &Connection,
    user_id: &str,
    skill_id: &str,
) -> PracticaResult<Option<MasteryRecord>> {
    conn.query_row(
        "SELECT skill_id, score, attempts, last_seen_at, due_review_at
         FROM mastery_records WHERE user_id = ?1 AND skill_id = ?2",
        params![user_id, skill_id],
        RawRecord::from_row,
    )
    .optional()?
    .map(RawRecord::into_record)
    .transpose()
}

/// Row as stored, before timestamp parsing.
struct RawRecord {
    skill_id: String,
    score: f64,
    attempts: u32,
    last_seen_at: String,
    due_review_at: Option<String>,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            skill_id: row.get(0)?,
            score: row.get(1)?,
            attempts: row.get(2)?,
            last_seen_at: row.get(3)?,
            due_review_at: row.get(4)?,
        })
    }

    fn into_record(self) -> PracticaResult<MasteryRecord> {
        Ok(MasteryRecord {
            skill_id: self.skill_id,
            score: self.score,
            attempts: self.attempts,
            last_seen_at: parse_ts(&self.last_seen_at)?,
            due_review_at: self.due_review_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(s: &str) -> PracticaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PracticaError::invalid_timestamp(s, e))
}
