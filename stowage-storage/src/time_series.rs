//! Profiler time series: timestamped JSON rows keyed by `(subject FQN, extension)`.
//!
//! A row may carry an operation discriminator (system profiles use the DML
//! kind). Rows are ordered by timestamp; rows with the same timestamp keep
//! insertion order in the requested direction.

use crate::error::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use stowage_types::TimeRange;
use tracing::debug;

/// Result ordering for range reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One stored time-series row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRecord {
    pub subject: String,
    pub extension: String,
    pub timestamp: i64,
    pub operation: Option<String>,
    pub json: String,
}

pub struct TimeSeriesStore<'c> {
    conn: &'c Connection,
}

impl<'c> TimeSeriesStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Appends a row without an operation discriminator.
    pub fn insert(&self, subject: &str, extension: &str, timestamp: i64, payload: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO profiler_time_series (entity_fqn, extension, timestamp, operation, json)
             VALUES (?1, ?2, ?3, NULL, ?4)",
            params![subject, extension, timestamp, payload],
        )?;
        Ok(())
    }

    /// Writes a row at `timestamp`.
    ///
    /// With `replace_if_exists` the payload of the row matching
    /// `(subject, extension, timestamp, operation)` is overwritten; otherwise
    /// a new row is appended.
    pub fn store_at_timestamp(
        &self,
        subject: &str,
        extension: &str,
        timestamp: i64,
        operation: Option<&str>,
        payload: &str,
        replace_if_exists: bool,
    ) -> StorageResult<()> {
        if replace_if_exists {
            let updated = self.conn.execute(
                "UPDATE profiler_time_series SET json = ?5
                 WHERE entity_fqn = ?1 AND extension = ?2 AND timestamp = ?3 AND operation IS ?4",
                params![subject, extension, timestamp, operation, payload],
            )?;
            debug!(subject, extension, timestamp, updated, "time-series row replaced");
        } else {
            self.conn.execute(
                "INSERT INTO profiler_time_series (entity_fqn, extension, timestamp, operation, json)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![subject, extension, timestamp, operation, payload],
            )?;
        }
        Ok(())
    }

    /// Writes at most one row per `(subject, extension, timestamp, operation)`:
    /// replaces the payload when the row exists, appends otherwise.
    pub fn upsert_with_operation(
        &self,
        subject: &str,
        extension: &str,
        timestamp: i64,
        operation: &str,
        payload: &str,
    ) -> StorageResult<()> {
        let exists = self
            .get_at_timestamp_with_operation(subject, extension, timestamp, operation)?
            .is_some();
        self.store_at_timestamp(subject, extension, timestamp, Some(operation), payload, exists)
    }

    pub fn get_at_timestamp_with_operation(
        &self,
        subject: &str,
        extension: &str,
        timestamp: i64,
        operation: &str,
    ) -> StorageResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT json FROM profiler_time_series
                 WHERE entity_fqn = ?1 AND extension = ?2 AND timestamp = ?3 AND operation = ?4
                 ORDER BY seq DESC LIMIT 1",
                params![subject, extension, timestamp, operation],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }

    /// The payload with the greatest timestamp (latest insert on ties).
    pub fn get_latest(&self, subject: &str, extension: &str) -> StorageResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT json FROM profiler_time_series
                 WHERE entity_fqn = ?1 AND extension = ?2
                 ORDER BY timestamp DESC, seq DESC LIMIT 1",
                params![subject, extension],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }

    /// Payloads with `range.start() <= timestamp <= range.end()`.
    pub fn list_between(
        &self,
        subject: &str,
        extension: &str,
        range: TimeRange,
        order: SortOrder,
    ) -> StorageResult<Vec<String>> {
        Ok(self
            .records_between(subject, extension, range, order)?
            .into_iter()
            .map(|r| r.json)
            .collect())
    }

    /// Full rows with `range.start() <= timestamp <= range.end()`.
    pub fn records_between(
        &self,
        subject: &str,
        extension: &str,
        range: TimeRange,
        order: SortOrder,
    ) -> StorageResult<Vec<TimeSeriesRecord>> {
        let sql = format!(
            "SELECT entity_fqn, extension, timestamp, operation, json FROM profiler_time_series
             WHERE entity_fqn = ?1 AND extension = ?2 AND timestamp >= ?3 AND timestamp <= ?4
             ORDER BY timestamp {dir}, seq {dir}",
            dir = order.as_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![subject, extension, range.start(), range.end()],
            |row| {
                Ok(TimeSeriesRecord {
                    subject: row.get(0)?,
                    extension: row.get(1)?,
                    timestamp: row.get(2)?,
                    operation: row.get(3)?,
                    json: row.get(4)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Removes every row at exactly `timestamp`. Returns the number removed.
    pub fn delete_at(&self, subject: &str, extension: &str, timestamp: i64) -> StorageResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM profiler_time_series
             WHERE entity_fqn = ?1 AND extension = ?2 AND timestamp = ?3",
            params![subject, extension, timestamp],
        )?)
    }

    /// Removes every row strictly older than `timestamp`.
    pub fn delete_before(&self, subject: &str, extension: &str, timestamp: i64) -> StorageResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM profiler_time_series
             WHERE entity_fqn = ?1 AND extension = ?2 AND timestamp < ?3",
            params![subject, extension, timestamp],
        )?)
    }

    /// Removes every row of `subject` across all extensions.
    pub fn delete_subject(&self, subject: &str) -> StorageResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM profiler_time_series WHERE entity_fqn = ?1",
            params![subject],
        )?;
        debug!(subject, removed, "time series cleared");
        Ok(removed)
    }

    /// Re-keys every row of `from` to `to`, across all extensions.
    pub fn rename_subject(&self, from: &str, to: &str) -> StorageResult<usize> {
        let moved = self.conn.execute(
            "UPDATE profiler_time_series SET entity_fqn = ?2 WHERE entity_fqn = ?1",
            params![from, to],
        )?;
        debug!(from, to, moved, "time series re-keyed");
        Ok(moved)
    }

    /// Number of rows stored for `(subject, extension)`.
    pub fn count(&self, subject: &str, extension: &str) -> StorageResult<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM profiler_time_series WHERE entity_fqn = ?1 AND extension = ?2",
            params![subject, extension],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn get_latest_json<T: DeserializeOwned>(&self, subject: &str, extension: &str) -> StorageResult<Option<T>> {
        match self.get_latest(subject, extension)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn list_between_json<T: DeserializeOwned>(
        &self,
        subject: &str,
        extension: &str,
        range: TimeRange,
        order: SortOrder,
    ) -> StorageResult<Vec<T>> {
        self.list_between(subject, extension, range, order)?
            .iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }
}
