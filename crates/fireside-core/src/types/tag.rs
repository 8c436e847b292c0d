//! Tag records and the references content entities hold to them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest allowed reference weight
pub const MIN_WEIGHT: u8 = 1;
/// Highest allowed reference weight
pub const MAX_WEIGHT: u8 = 10;

/// Opaque, store-assigned tag identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id in the `tag:<uuid>` format used by every backend
    pub fn generate() -> Self {
        Self(format!("tag:{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TagId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A named label with a persisted usage counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    /// Display name, as first typed
    pub name: String,
    /// Number of live references from snippets and deepenings
    pub reference_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// New tag with no references
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TagId::generate(),
            name: name.into(),
            reference_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Key used for uniqueness and lookup
    pub fn name_key(&self) -> String {
        canonical_name(&self.name)
    }
}

/// Canonical collation for tag names: trimmed and lowercased.
///
/// Both resolution and lookup go through this, so "Soul", "soul " and
/// "SOUL" all name the same tag.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An entity's embedded pointer to a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReference {
    pub tag_id: TagId,
    pub weight: u8,
    pub distance: u32,
}

impl TagReference {
    pub fn new(tag_id: impl Into<TagId>, weight: u8, distance: u32) -> Self {
        Self {
            tag_id: tag_id.into(),
            weight,
            distance,
        }
    }
}

/// What a submitted tag entry points at before resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum TagTarget {
    /// A tag id the caller already knows
    Existing(TagId),
    /// A typed name that may or may not exist yet
    Named(String),
}

/// One user-submitted tag entry, prior to resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub target: TagTarget,
    pub weight: u8,
    pub distance: u32,
}

impl TagRequest {
    /// Request by name with the default weight 1 and distance 0
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            target: TagTarget::Named(name.into()),
            weight: MIN_WEIGHT,
            distance: 0,
        }
    }

    /// Request for a known tag id with the default weight and distance
    pub fn existing(id: impl Into<TagId>) -> Self {
        Self {
            target: TagTarget::Existing(id.into()),
            weight: MIN_WEIGHT,
            distance: 0,
        }
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_folds_case_and_whitespace() {
        assert_eq!(canonical_name("  Soul "), "soul");
        assert_eq!(canonical_name("SOUL"), canonical_name("soul"));
    }

    #[test]
    fn test_tag_reference_serializes_camel_case() {
        let reference = TagReference::new("tag:1", 3, 2);
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["tagId"], "tag:1");
        assert_eq!(json["weight"], 3);
        assert_eq!(json["distance"], 2);
    }

    #[test]
    fn test_generated_ids_are_prefixed() {
        let id = TagId::generate();
        assert!(id.as_str().starts_with("tag:"));
        assert_ne!(id, TagId::generate());
    }
}
