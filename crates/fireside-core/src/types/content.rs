//! Content entities: families, firesides, snippets, deepenings, outlines, media

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::record::{Record, Tagged};
use crate::types::tag::TagReference;
use crate::validation::{check_finite, Missing, ValidationError};

/// Grouping container for firesides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiresideFamily {
    pub uid: String,
    pub name: String,
    pub description: String,
}

impl FiresideFamily {
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Record for FiresideFamily {
    const COLLECTION: &'static str = "fireside_family";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("uid", &self.uid)
            .check("name", &self.name)
            .check("description", &self.description)
            .finish()
    }
}

/// A dated talk belonging to a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fireside {
    pub fireside_family_id: String,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl Fireside {
    /// New fireside dated now
    pub fn new(
        fireside_family_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            fireside_family_id: fireside_family_id.into(),
            name: name.into(),
            description: description.into(),
            date: Utc::now(),
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

impl Record for Fireside {
    const COLLECTION: &'static str = "fireside";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("firesideFamilyId", &self.fireside_family_id)
            .check("name", &self.name)
            .check("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// Atomic unit of archived content, belonging to a fireside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub fireside_id: String,
    pub name: String,
    /// Markdown body
    pub text: String,
    pub natural_order: f64,
    #[serde(default)]
    pub tags: Vec<TagReference>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Snippet {
    /// Public snippet with no tags
    pub fn new(
        fireside_id: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
        natural_order: f64,
    ) -> Self {
        Self {
            fireside_id: fireside_id.into(),
            name: name.into(),
            text: text.into(),
            natural_order,
            tags: Vec::new(),
            visibility: Visibility::Public,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl Record for Snippet {
    const COLLECTION: &'static str = "snippet";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("firesideId", &self.fireside_id)
            .check("name", &self.name)
            .check("text", &self.text)
            .finish()?;
        check_finite("naturalOrder", self.natural_order)
    }
}

impl Tagged for Snippet {
    fn tags(&self) -> &[TagReference] {
        &self.tags
    }

    fn set_tags(&mut self, tags: Vec<TagReference>) {
        self.tags = tags;
    }
}

/// Supplementary content attached to a snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deepening {
    pub snippet_id: String,
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<TagReference>,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

impl Deepening {
    pub fn new(
        snippet_id: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            snippet_id: snippet_id.into(),
            name: name.into(),
            text: text.into(),
            tags: Vec::new(),
            media_ids: Vec::new(),
        }
    }
}

impl Record for Deepening {
    const COLLECTION: &'static str = "deepening";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("snippetId", &self.snippet_id)
            .check("name", &self.name)
            .check("text", &self.text)
            .finish()
    }
}

impl Tagged for Deepening {
    fn tags(&self) -> &[TagReference] {
        &self.tags
    }

    fn set_tags(&mut self, tags: Vec<TagReference>) {
        self.tags = tags;
    }
}

/// Kind of content an outline item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineItemKind {
    Snippet,
    Deepening,
}

impl fmt::Display for OutlineItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineItemKind::Snippet => f.write_str("snippet"),
            OutlineItemKind::Deepening => f.write_str("deepening"),
        }
    }
}

impl FromStr for OutlineItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snippet" => Ok(OutlineItemKind::Snippet),
            "deepening" => Ok(OutlineItemKind::Deepening),
            other => Err(format!("unknown outline item kind '{}'", other)),
        }
    }
}

/// Node of a user-composed outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    pub item_id: String,
    #[serde(rename = "type")]
    pub kind: OutlineItemKind,
    pub ref_id: String,
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineItem>,
}

/// User-composed arrangement of snippets and deepenings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<OutlineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl Outline {
    /// Empty private outline
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            items: Vec::new(),
            markdown: None,
            is_public: false,
        }
    }
}

impl Record for Outline {
    const COLLECTION: &'static str = "outline";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("userId", &self.user_id)
            .check("title", &self.title)
            .finish()
    }
}

/// Attached media (audio, video, documents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub name: String,
    pub url: String,
    pub media_type: String,
}

impl Record for Media {
    const COLLECTION: &'static str = "media";

    fn validate(&self) -> Result<(), ValidationError> {
        Missing::default()
            .check("name", &self.name)
            .check("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_snippet_requires_fields() {
        let snippet = Snippet::new("", "Title", "", 1.0);
        let err = snippet.validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["firesideId", "text"]));
    }

    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinity")]
    #[test_case(f64::NEG_INFINITY ; "negative infinity")]
    fn test_snippet_order_must_be_finite(order: f64) {
        let err = Snippet::new("f1", "Title", "text", order).validate().unwrap_err();
        assert_eq!(err, ValidationError::NotFinite { field: "naturalOrder" });
    }

    #[test]
    fn test_snippet_defaults_when_fields_absent() {
        let json = serde_json::json!({
            "firesideId": "f1",
            "name": "Purpose",
            "text": "# Purpose",
            "naturalOrder": 1.0
        });
        let snippet: Snippet = serde_json::from_value(json).unwrap();
        assert!(snippet.tags.is_empty());
        assert_eq!(snippet.visibility, Visibility::Public);
    }

    #[test]
    fn test_outline_item_kind_serializes_as_type() {
        let item = OutlineItem {
            item_id: "i1".into(),
            kind: OutlineItemKind::Deepening,
            ref_id: "d1".into(),
            is_visible: true,
            children: Vec::new(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "deepening");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("Private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!("hidden".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_family_and_outline_validation() {
        let family = FiresideFamily::new("family-general", "General", "Intro topics");
        assert!(family.validate().is_ok());
        let err = Outline::new("user-1", " ").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["title"]));
    }
}
