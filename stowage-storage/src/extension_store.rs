//! Extension store: named JSON blobs attached to an entity id.
//!
//! Keys are `(owner, extension name)`; writing an existing key replaces it.
//! Prefix reads use a literal `substr` comparison so names containing
//! `%` or `_` never act as wildcards.

use crate::error::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stowage_types::EntityId;

/// One row returned by a prefix read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    pub extension: String,
    pub json: String,
}

pub struct ExtensionStore<'c> {
    conn: &'c Connection,
}

impl<'c> ExtensionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Writes `payload` under `(owner, name)`, replacing any existing value.
    pub fn put(&self, owner: EntityId, name: &str, payload: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO entity_extension (id, extension, json) VALUES (?1, ?2, ?3)",
            params![owner.to_string(), name, payload],
        )?;
        Ok(())
    }

    pub fn get(&self, owner: EntityId, name: &str) -> StorageResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT json FROM entity_extension WHERE id = ?1 AND extension = ?2",
                params![owner.to_string(), name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }

    /// All extensions of `owner` whose name starts with `prefix`, ordered by name.
    pub fn get_all_with_prefix(
        &self,
        owner: EntityId,
        prefix: &str,
    ) -> StorageResult<Vec<ExtensionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT extension, json FROM entity_extension
             WHERE id = ?1 AND substr(extension, 1, length(?2)) = ?2
             ORDER BY extension",
        )?;
        let rows = stmt.query_map(params![owner.to_string(), prefix], |row| {
            Ok(ExtensionRecord {
                extension: row.get(0)?,
                json: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Removes `(owner, name)`. Returns whether a row existed.
    pub fn delete(&self, owner: EntityId, name: &str) -> StorageResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM entity_extension WHERE id = ?1 AND extension = ?2",
            params![owner.to_string(), name],
        )?;
        Ok(removed > 0)
    }

    /// Removes every extension of `owner`. Returns the number of rows removed.
    pub fn delete_all(&self, owner: EntityId) -> StorageResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM entity_extension WHERE id = ?1",
            params![owner.to_string()],
        )?)
    }

    pub fn put_json<T: Serialize>(&self, owner: EntityId, name: &str, value: &T) -> StorageResult<()> {
        self.put(owner, name, &serde_json::to_string(value)?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, owner: EntityId, name: &str) -> StorageResult<Option<T>> {
        match self.get(owner, name)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
