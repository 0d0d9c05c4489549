use crate::EntityReference;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stowage_types::EntityId;

/// A generic persisted entity row.
///
/// Every entity type flows through this shape on its way to and from the
/// primary-record table. `json` holds the entity's own serialized fields with
/// relationship and read-time facets already stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub entity_type: String,
    pub name: String,
    pub fqn: String,
    pub json: serde_json::Value,
    pub version: f64,
    pub updated_at: i64,
    pub updated_by: String,
    pub deleted: bool,
}

impl EntityRecord {
    /// Extract a string value from `json` using a JSON pointer (e.g., "/prefix").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.json.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a numeric value from `json` using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.json.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Deserializes the record back into its typed entity.
    pub fn decode<T: EntityKind>(&self) -> serde_json::Result<T> {
        T::from_record(self)
    }
}

/// A typed entity that can be stored as an [`EntityRecord`].
pub trait EntityKind: Serialize + DeserializeOwned {
    /// The `entity_type` column value, also used in relationship rows.
    const ENTITY_TYPE: &'static str;

    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn fully_qualified_name(&self) -> &str;
    fn version(&self) -> f64;
    fn updated_at(&self) -> i64;
    fn updated_by(&self) -> &str;

    fn deleted(&self) -> bool {
        false
    }

    fn display_name(&self) -> Option<&str> {
        None
    }

    /// A weak reference to this entity.
    fn entity_reference(&self) -> EntityReference {
        EntityReference {
            id: self.id(),
            entity_type: Self::ENTITY_TYPE.to_string(),
            name: self.name().to_string(),
            fully_qualified_name: self.fully_qualified_name().to_string(),
            display_name: self.display_name().map(str::to_string),
            deleted: self.deleted(),
        }
    }

    fn to_record(&self) -> serde_json::Result<EntityRecord> {
        Ok(EntityRecord {
            id: self.id(),
            entity_type: Self::ENTITY_TYPE.to_string(),
            name: self.name().to_string(),
            fqn: self.fully_qualified_name().to_string(),
            json: serde_json::to_value(self)?,
            version: self.version(),
            updated_at: self.updated_at(),
            updated_by: self.updated_by().to_string(),
            deleted: self.deleted(),
        })
    }

    fn from_record(record: &EntityRecord) -> serde_json::Result<Self> {
        serde_json::from_value(record.json.clone())
    }
}
