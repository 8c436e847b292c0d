//! Table and JSON rendering shared by the commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use std::collections::HashMap;

use fireside_core::{ReconcileReport, Tag, TagId, TagReference};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "Success:".green().bold(), message.as_ref());
}

pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// First line of `text`, cut to `max` characters
pub fn preview(text: &str, max: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Tag names keyed by id, for rendering references
pub fn tag_names(tags: &[Tag]) -> HashMap<TagId, String> {
    tags.iter().map(|t| (t.id.clone(), t.name.clone())).collect()
}

/// `Purpose (10), Evolution (9, d2)`; deleted tags show as `?<id>`
pub fn tag_list(references: &[TagReference], names: &HashMap<TagId, String>) -> String {
    references
        .iter()
        .map(|r| {
            let name = names
                .get(&r.tag_id)
                .cloned()
                .unwrap_or_else(|| format!("?{}", r.tag_id));
            if r.distance == 0 {
                format!("{} ({})", name, r.weight)
            } else {
                format!("{} ({}, d{})", name, r.weight, r.distance)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Warn about counter adjustments that could not be applied
pub fn report_skipped(report: &ReconcileReport) {
    for skipped in &report.skipped {
        eprintln!(
            "{} tag {} not adjusted: {}",
            "Warning:".yellow().bold(),
            skipped.tag_id,
            skipped.reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("short", 10, "short" ; "fits")]
    #[test_case("\n\n# Heading\nbody", 20, "# Heading" ; "skips blank lines")]
    #[test_case("abcdefghij", 5, "abcd…" ; "truncated")]
    #[test_case("", 5, "" ; "empty")]
    fn test_preview(text: &str, max: usize, expected: &str) {
        assert_eq!(preview(text, max), expected);
    }

    #[test]
    fn test_tag_list_marks_unknown_ids() {
        let tag = Tag::new("Purpose");
        let names = tag_names(std::slice::from_ref(&tag));
        let refs = vec![
            TagReference::new(tag.id.clone(), 10, 0),
            TagReference::new("gone", 3, 2),
        ];
        assert_eq!(tag_list(&refs, &names), "Purpose (10), ?gone (3, d2)");
    }
}
