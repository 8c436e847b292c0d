//! Parsing of `--tag` entries.
//!
//! An entry is `NAME[:WEIGHT[:DISTANCE]]`, or `@ID[:WEIGHT[:DISTANCE]]` to
//! reference an existing tag by id. Up to two trailing all-digit segments
//! are taken as numbers, so a name that itself ends in `:<digits>` must be
//! followed by both: `Genesis 1:1:5:0` is "Genesis 1:1" with weight 5.

use anyhow::{bail, Context, Result};

use fireside_core::{TagReference, TagRequest};

pub fn parse_tag_arg(arg: &str) -> Result<TagRequest> {
    let mut rest = arg;
    let mut numbers = Vec::new();
    while numbers.len() < 2 {
        match rest.rsplit_once(':') {
            Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
                numbers.push(tail);
                rest = head;
            }
            _ => break,
        }
    }
    numbers.reverse();

    let target = rest.trim();
    let mut request = match target.strip_prefix('@') {
        Some(id) if !id.trim().is_empty() => TagRequest::existing(id.trim()),
        Some(_) => bail!("Tag entry '{}' has an empty id", arg),
        None if target.is_empty() => bail!("Tag entry '{}' has an empty name", arg),
        None => TagRequest::named(target),
    };

    if let Some(weight) = numbers.first() {
        let weight: u32 = weight
            .parse()
            .with_context(|| format!("Invalid weight in tag entry '{}'", arg))?;
        let weight = u8::try_from(weight)
            .with_context(|| format!("Weight {} in tag entry '{}' is out of range", weight, arg))?;
        request = request.with_weight(weight);
    }
    if let Some(distance) = numbers.get(1) {
        let distance = distance
            .parse()
            .with_context(|| format!("Invalid distance in tag entry '{}'", arg))?;
        request = request.with_distance(distance);
    }

    Ok(request)
}

pub fn parse_tag_args(args: &[String]) -> Result<Vec<TagRequest>> {
    args.iter().map(|arg| parse_tag_arg(arg)).collect()
}

/// Existing references resubmitted by id, keeping weight and distance
pub fn keep_existing(references: &[TagReference]) -> Vec<TagRequest> {
    references
        .iter()
        .map(|r| {
            TagRequest::existing(r.tag_id.clone())
                .with_weight(r.weight)
                .with_distance(r.distance)
        })
        .collect()
}
