use serde::{Deserialize, Serialize};

/// A tag or glossary term applied to an entity or column.
///
/// Tags are never persisted inside the primary record; they live in the
/// relationship graph keyed by the target's FQN and are re-attached on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLabel {
    #[serde(rename = "tagFQN")]
    pub tag_fqn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub source: TagSource,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(default)]
    pub state: TagState,
}

impl TagLabel {
    /// A manually applied, confirmed classification tag.
    pub fn classification(tag_fqn: impl Into<String>) -> Self {
        Self {
            tag_fqn: tag_fqn.into(),
            description: None,
            source: TagSource::Classification,
            label_type: LabelType::Manual,
            state: TagState::Confirmed,
        }
    }

    /// A manually applied, confirmed glossary term.
    pub fn glossary(term_fqn: impl Into<String>) -> Self {
        Self {
            source: TagSource::Glossary,
            ..Self::classification(term_fqn)
        }
    }

    /// Identity used when diffing tag lists: the tag FQN only.
    pub fn same_tag(a: &TagLabel, b: &TagLabel) -> bool {
        a.tag_fqn == b.tag_fqn
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagSource {
    #[default]
    Classification,
    Glossary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelType {
    #[default]
    Manual,
    Propagated,
    Automated,
    Derived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagState {
    Suggested,
    #[default]
    Confirmed,
}
