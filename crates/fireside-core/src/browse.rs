//! Search, filter and sort over loaded records
//!
//! These work on lists already fetched through [`crate::archive::Archive`];
//! none of them touch storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{Fireside, Snippet, Stored, Tag};

/// Sort key for firesides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiresideSort {
    /// Newest first
    #[default]
    Date,
    /// Alphabetical, case-insensitive
    Name,
}

/// Sort key for tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSort {
    #[default]
    Name,
    /// Most referenced first
    Count,
}

impl FromStr for FiresideSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(FiresideSort::Date),
            "name" => Ok(FiresideSort::Name),
            other => Err(format!("unknown sort '{}', expected date or name", other)),
        }
    }
}

impl FromStr for TagSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(TagSort::Name),
            "count" => Ok(TagSort::Count),
            other => Err(format!("unknown sort '{}', expected name or count", other)),
        }
    }
}

impl fmt::Display for FiresideSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiresideSort::Date => f.write_str("date"),
            FiresideSort::Name => f.write_str("name"),
        }
    }
}

impl fmt::Display for TagSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSort::Name => f.write_str("name"),
            TagSort::Count => f.write_str("count"),
        }
    }
}

/// Filters applied to a fireside list
#[derive(Debug, Clone, Default)]
pub struct FiresideQuery {
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub family_id: Option<String>,
    pub sort: FiresideSort,
}

impl FiresideQuery {
    pub fn apply(&self, firesides: Vec<Stored<Fireside>>) -> Vec<Stored<Fireside>> {
        let needle = self.search.as_deref().map(str::to_lowercase);

        let mut matched: Vec<_> = firesides
            .into_iter()
            .filter(|f| match &self.family_id {
                Some(family) => &f.fireside_family_id == family,
                None => true,
            })
            .filter(|f| match &needle {
                Some(needle) => {
                    contains_folded(&f.name, needle) || contains_folded(&f.description, needle)
                }
                None => true,
            })
            .collect();

        match self.sort {
            FiresideSort::Date => matched.sort_by(|a, b| b.date.cmp(&a.date)),
            FiresideSort::Name => matched.sort_by_key(|f| f.name.to_lowercase()),
        }
        matched
    }
}

/// Snippets whose name or text contains `search`, newest first
pub fn search_snippets(
    snippets: Vec<Stored<Snippet>>,
    search: Option<&str>,
) -> Vec<Stored<Snippet>> {
    let needle = search.map(str::to_lowercase);
    let mut matched: Vec<_> = snippets
        .into_iter()
        .filter(|s| match &needle {
            Some(needle) => contains_folded(&s.name, needle) || contains_folded(&s.text, needle),
            None => true,
        })
        .collect();
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matched
}

pub fn sort_tags(mut tags: Vec<Tag>, sort: TagSort) -> Vec<Tag> {
    match sort {
        TagSort::Name => tags.sort_by_key(|t| t.name_key()),
        TagSort::Count => tags.sort_by(|a, b| {
            b.reference_count
                .cmp(&a.reference_count)
                .then_with(|| a.name_key().cmp(&b.name_key()))
        }),
    }
    tags
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
