//! PII masking for unauthorized reads.
//!
//! The repository re-derives column tags from tag usage before calling a
//! [`PiiMasker`], so maskers can decide purely from the tags they are handed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stowage_model::{ColumnProfile, Container, SampleData, TagLabel};

/// Replacement for every masked sample value.
pub const MASKED_VALUE: &str = "********";

/// Redacts sensitive values from read results.
pub trait PiiMasker: Send + Sync {
    /// Masks the structured sample rows attached to `container`.
    fn mask_sample_rows(&self, container: Container) -> Container;

    /// Masks a column's profile history, given the tags of the owning
    /// container and of the column itself.
    fn mask_column_profiles(
        &self,
        column_fqn: &str,
        container_tags: &[TagLabel],
        column_tags: &[TagLabel],
        profiles: Vec<ColumnProfile>,
    ) -> Vec<ColumnProfile>;

    /// Masks the column profiles attached to `container`'s columns.
    fn mask_table_profile(&self, container: Container) -> Container;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    /// Tag FQN that marks a column (or a whole container) as sensitive.
    pub sensitive_tag: String,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            sensitive_tag: "PII.Sensitive".to_string(),
        }
    }
}

/// Masks columns carrying the configured sensitive tag. A container carrying
/// the tag has every column masked.
#[derive(Debug, Clone, Default)]
pub struct SensitiveTagMasker {
    config: MaskingConfig,
}

impl SensitiveTagMasker {
    pub fn new(config: MaskingConfig) -> Self {
        Self { config }
    }

    fn is_sensitive(&self, tags: &[TagLabel]) -> bool {
        tags.iter().any(|t| t.tag_fqn == self.config.sensitive_tag)
    }
}

impl PiiMasker for SensitiveTagMasker {
    fn mask_sample_rows(&self, mut container: Container) -> Container {
        let whole = self.is_sensitive(&container.tags);
        let Some(data) = container.sample_data.as_ref().and_then(SampleData::as_table) else {
            return container;
        };
        let hidden: Vec<bool> = data
            .columns
            .iter()
            .map(|name| {
                whole
                    || container
                        .columns()
                        .and_then(|tree| tree.resolve(name).map(|id| tree.node(id)))
                        .is_some_and(|node| self.is_sensitive(&node.tags))
            })
            .collect();
        if !hidden.contains(&true) {
            return container;
        }

        if let Some(SampleData::Structured(data)) = container.sample_data.as_mut() {
            for row in &mut data.rows {
                for (value, _) in row.iter_mut().zip(&hidden).filter(|(_, hide)| **hide) {
                    *value = Value::String(MASKED_VALUE.to_string());
                }
            }
        }
        container
    }

    fn mask_column_profiles(
        &self,
        _column_fqn: &str,
        container_tags: &[TagLabel],
        column_tags: &[TagLabel],
        mut profiles: Vec<ColumnProfile>,
    ) -> Vec<ColumnProfile> {
        if self.is_sensitive(container_tags) || self.is_sensitive(column_tags) {
            profiles.iter_mut().for_each(ColumnProfile::redact_values);
        }
        profiles
    }

    fn mask_table_profile(&self, mut container: Container) -> Container {
        let whole = self.is_sensitive(&container.tags);
        if let Some(tree) = container.columns_mut() {
            for id in tree.depth_first() {
                let node = tree.node_mut(id);
                if whole || self.is_sensitive(&node.tags) {
                    if let Some(profile) = node.profile.as_mut() {
                        profile.redact_values();
                    }
                }
            }
        }
        container
    }
}
