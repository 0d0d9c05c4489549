use serde::{Deserialize, Serialize};

/// One field-level entry of a [`ChangeDescription`].
///
/// `name` is a dotted field path such as `fileFormats` or
/// `dataModel.columns.address.city.description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
}

/// The audit form of a changeset, stored on the entity and in its history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescription {
    #[serde(default)]
    pub fields_added: Vec<FieldChange>,
    #[serde(default)]
    pub fields_updated: Vec<FieldChange>,
    #[serde(default)]
    pub fields_deleted: Vec<FieldChange>,
    pub previous_version: f64,
}

impl ChangeDescription {
    pub fn new(previous_version: f64) -> Self {
        Self {
            previous_version,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields_added.is_empty() && self.fields_updated.is_empty() && self.fields_deleted.is_empty()
    }
}
