//! Primary entity records, relationships, tag usage and version history.

use crate::error::{StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use stowage_model::{ChangeDescription, EntityRecord, EntityReference, TagLabel};
use stowage_types::EntityId;

/// Which rows a lookup may return with respect to soft deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Include {
    #[default]
    NonDeleted,
    Deleted,
    All,
}

impl Include {
    fn admits(self, deleted: bool) -> bool {
        match self {
            Self::NonDeleted => !deleted,
            Self::Deleted => deleted,
            Self::All => true,
        }
    }
}

/// Kinds of edges in the entity relationship graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// Service → container, container → child container.
    Contains,
    /// Container → the test suite that checks it.
    Has,
}

impl Relationship {
    fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Has => "has",
        }
    }
}

/// One entry of an entity's version history.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionEntry {
    pub version: f64,
    pub json: serde_json::Value,
    pub change_description: Option<ChangeDescription>,
    pub updated_at: i64,
}

pub struct EntityStore<'c> {
    conn: &'c Connection,
}

const RECORD_COLUMNS: &str =
    "id, entity_type, name, fqn, json, version, updated_at, updated_by, deleted";

impl<'c> EntityStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ── Records ──────────────────────────────────────────────────

    /// Inserts or replaces the record with `record.id`.
    pub fn store(&self, record: &EntityRecord) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO entity (
                id, entity_type, name, fqn, json, version, updated_at, updated_by, deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id.to_string(),
                record.entity_type,
                record.name,
                record.fqn,
                serde_json::to_string(&record.json)?,
                record.version,
                record.updated_at,
                record.updated_by,
                record.deleted,
            ],
        )?;
        Ok(())
    }

    /// Looks up a record by id; a missing or excluded record is an error.
    pub fn find(&self, id: EntityId, include: Include) -> StorageResult<EntityRecord> {
        self.find_optional(id, include)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    pub fn find_optional(&self, id: EntityId, include: Include) -> StorageResult<Option<EntityRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM entity WHERE id = ?1"),
                params![id.to_string()],
                RawRecord::from_row,
            )
            .optional()?
            .map(RawRecord::decode)
            .transpose()?;
        Ok(record.filter(|r| include.admits(r.deleted)))
    }

    /// Looks up a record by type and fully qualified name.
    pub fn find_by_name(&self, entity_type: &str, fqn: &str, include: Include) -> StorageResult<EntityRecord> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM entity WHERE entity_type = ?1 AND fqn = ?2"),
                params![entity_type, fqn],
                RawRecord::from_row,
            )
            .optional()?
            .map(RawRecord::decode)
            .transpose()?;
        record
            .filter(|r| include.admits(r.deleted))
            .ok_or_else(|| StorageError::NotFound(format!("{entity_type} {fqn}")))
    }

    /// The current stored version of `id`, ignoring soft deletion.
    pub fn current_version(&self, id: EntityId) -> StorageResult<Option<f64>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM entity WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    /// Lists records of one type ordered by FQN.
    pub fn list(&self, entity_type: &str, include: Include) -> StorageResult<Vec<EntityRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM entity WHERE entity_type = ?1 ORDER BY fqn"
        ))?;
        let rows = stmt.query_map(params![entity_type], RawRecord::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            let record = row?.decode()?;
            if include.admits(record.deleted) {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn set_deleted(&self, id: EntityId, deleted: bool) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE entity SET deleted = ?2 WHERE id = ?1",
            params![id.to_string(), deleted],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Removes the record together with its relationships and version history.
    pub fn delete(&self, id: EntityId) -> StorageResult<()> {
        let id = id.to_string();
        self.conn.execute(
            "DELETE FROM entity_relationship WHERE from_id = ?1 OR to_id = ?1",
            params![id],
        )?;
        self.conn
            .execute("DELETE FROM entity_version_history WHERE id = ?1", params![id])?;
        let removed = self.conn.execute("DELETE FROM entity WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    // ── Relationships ────────────────────────────────────────────

    pub fn add_relationship(
        &self,
        from: &EntityReference,
        to: &EntityReference,
        relation: Relationship,
    ) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO entity_relationship (from_id, to_id, from_entity, to_entity, relation)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                from.id.to_string(),
                to.id.to_string(),
                from.entity_type,
                to.entity_type,
                relation.as_str(),
            ],
        )?;
        Ok(())
    }

    /// The single entity of `from_type` with a `relation` edge into `to`.
    pub fn get_from(
        &self,
        to: EntityId,
        relation: Relationship,
        from_type: &str,
    ) -> StorageResult<Option<EntityReference>> {
        let refs = self.references(
            "SELECT e.id, e.entity_type, e.name, e.fqn, e.json, e.deleted
             FROM entity_relationship r JOIN entity e ON e.id = r.from_id
             WHERE r.to_id = ?1 AND r.relation = ?2 AND r.from_entity = ?3",
            to,
            relation,
            from_type,
        )?;
        Ok(refs.into_iter().next())
    }

    /// Every entity of `to_type` that `from` has a `relation` edge into.
    pub fn get_to(
        &self,
        from: EntityId,
        relation: Relationship,
        to_type: &str,
    ) -> StorageResult<Vec<EntityReference>> {
        self.references(
            "SELECT e.id, e.entity_type, e.name, e.fqn, e.json, e.deleted
             FROM entity_relationship r JOIN entity e ON e.id = r.to_id
             WHERE r.from_id = ?1 AND r.relation = ?2 AND r.to_entity = ?3
             ORDER BY e.fqn",
            from,
            relation,
            to_type,
        )
    }

    fn references(
        &self,
        sql: &str,
        id: EntityId,
        relation: Relationship,
        entity_type: &str,
    ) -> StorageResult<Vec<EntityReference>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(
            params![id.to_string(), relation.as_str(), entity_type],
            RawReference::from_row,
        )?;
        let mut refs = Vec::new();
        for row in rows {
            refs.push(row?.decode()?);
        }
        Ok(refs)
    }

    // ── Tag usage ────────────────────────────────────────────────

    pub fn apply_tag(&self, target_fqn: &str, label: &TagLabel) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tag_usage (target_fqn, tag_fqn, json) VALUES (?1, ?2, ?3)",
            params![target_fqn, label.tag_fqn, serde_json::to_string(label)?],
        )?;
        Ok(())
    }

    /// Tags applied to exactly `target_fqn`, ordered by tag FQN.
    pub fn get_tags(&self, target_fqn: &str) -> StorageResult<Vec<TagLabel>> {
        let mut stmt = self
            .conn
            .prepare("SELECT json FROM tag_usage WHERE target_fqn = ?1 ORDER BY tag_fqn")?;
        let rows = stmt.query_map(params![target_fqn], |row| row.get::<_, String>(0))?;
        let mut tags = Vec::new();
        for json in rows {
            tags.push(serde_json::from_str(&json?)?);
        }
        Ok(tags)
    }

    /// Removes every tag applied to exactly `target_fqn`.
    pub fn delete_tags(&self, target_fqn: &str) -> StorageResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM tag_usage WHERE target_fqn = ?1",
            params![target_fqn],
        )?)
    }

    // ── Version history ──────────────────────────────────────────

    pub fn store_version(
        &self,
        id: EntityId,
        version: f64,
        json: &serde_json::Value,
        change: Option<&ChangeDescription>,
        updated_at: i64,
    ) -> StorageResult<()> {
        let change = change.map(serde_json::to_string).transpose()?;
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO entity_version_history (id, version, json, change_description, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![id.to_string(), version, serde_json::to_string(json)?, change, updated_at],
        )?;
        Ok(())
    }

    /// History of `id`, newest version first.
    pub fn list_versions(&self, id: EntityId) -> StorageResult<Vec<VersionEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, json, change_description, updated_at FROM entity_version_history
             WHERE id = ?1 ORDER BY version DESC",
        )?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, f64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (version, json, change, updated_at) = row?;
            entries.push(VersionEntry {
                version,
                json: serde_json::from_str(&json)?,
                change_description: change.as_deref().map(serde_json::from_str).transpose()?,
                updated_at,
            });
        }
        Ok(entries)
    }
}

fn parse_id(raw: &str) -> StorageResult<EntityId> {
    EntityId::parse(raw).map_err(|e| StorageError::InvalidData(format!("bad entity id {raw:?}: {e}")))
}

/// Column values of one `entity` row before id and JSON decoding.
struct RawRecord {
    id: String,
    entity_type: String,
    name: String,
    fqn: String,
    json: String,
    version: f64,
    updated_at: i64,
    updated_by: String,
    deleted: bool,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            name: row.get(2)?,
            fqn: row.get(3)?,
            json: row.get(4)?,
            version: row.get(5)?,
            updated_at: row.get(6)?,
            updated_by: row.get(7)?,
            deleted: row.get(8)?,
        })
    }

    fn decode(self) -> StorageResult<EntityRecord> {
        Ok(EntityRecord {
            id: parse_id(&self.id)?,
            entity_type: self.entity_type,
            name: self.name,
            fqn: self.fqn,
            json: serde_json::from_str(&self.json)?,
            version: self.version,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
            deleted: self.deleted,
        })
    }
}

/// Column values of a joined reference row.
struct RawReference {
    id: String,
    entity_type: String,
    name: String,
    fqn: String,
    json: String,
    deleted: bool,
}

impl RawReference {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            name: row.get(2)?,
            fqn: row.get(3)?,
            json: row.get(4)?,
            deleted: row.get(5)?,
        })
    }

    fn decode(self) -> StorageResult<EntityReference> {
        let json: serde_json::Value = serde_json::from_str(&self.json)?;
        Ok(EntityReference {
            id: parse_id(&self.id)?,
            entity_type: self.entity_type,
            name: self.name,
            fully_qualified_name: self.fqn,
            display_name: json.get("displayName").and_then(|v| v.as_str()).map(str::to_string),
            deleted: self.deleted,
        })
    }
}
