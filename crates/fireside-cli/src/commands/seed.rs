//! Sample content for a fresh archive

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use fireside_core::storage::Backend;
use fireside_core::{
    Archive, ArchiveResult, Deepening, Fireside, FiresideFamily, Snippet, TagRequest,
};

use crate::context::CliContext;
use crate::output;

/// Uid of the first sample family; its presence means the archive is seeded
pub const SEED_MARKER_UID: &str = "family-general";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub families: usize,
    pub firesides: usize,
    pub snippets: usize,
    pub deepenings: usize,
}

struct SampleSnippet {
    name: &'static str,
    text: &'static str,
    order: f64,
    tags: &'static [(&'static str, u8, u32)],
}

const WHY_LIFE: &[SampleSnippet] = &[
    SampleSnippet {
        name: "The Purpose of Creation",
        text: "# The Purpose of Creation\n\n\
               The purpose of God in creating man hath been, and will ever be, \
               to enable him to know his Creator \
               and to attain His Presence.\n\n\
               This fundamental truth reveals that humanity's existence is not accidental, \
               but purposeful and meaningful.",
        order: 1.0,
        tags: &[("Purpose", 10, 1), ("Creation", 9, 1)],
    },
    SampleSnippet {
        name: "Spiritual Evolution",
        text: "# Spiritual Evolution\n\n\
               All beings, whether great or small, were created perfect \
               and complete from the first, \
               but their perfections appear in them by degrees.\n\n\
               The journey of life is one of manifesting latent spiritual capacities and virtues.",
        order: 2.0,
        tags: &[("Evolution", 9, 2), ("Spiritual Growth", 9, 1)],
    },
    SampleSnippet {
        name: "The Soul's Journey",
        text: "# The Soul's Journey\n\n\
               Know thou of a truth that the soul, after its separation from the body, \
               will continue to progress \
               until it attaineth the presence of God.\n\n\
               Death is not an end but a transition to continued spiritual development.",
        order: 3.0,
        tags: &[("Soul", 10, 1), ("Afterlife", 8, 2)],
    },
    SampleSnippet {
        name: "Testing and Growth",
        text: "# Testing and Growth\n\n\
               The mind and spirit of man advance when he is tried by suffering. \
               The more the ground is ploughed the better the seed will grow, \
               the better the harvest will be.\n\n\
               Difficulties are opportunities for spiritual refinement and development.",
        order: 4.0,
        tags: &[("Tests", 9, 1), ("Suffering", 8, 2)],
    },
];

const NATURE_OF_THE_SOUL: &[SampleSnippet] = &[SampleSnippet {
    name: "Immortality of the Soul",
    text: "# The Immortal Soul\n\n\
           The soul is not a combination of elements, it is not composed of many atoms, \
           it is of one indivisible substance and therefore eternal.\n\n\
           The human soul transcends physical reality and exists beyond material constraints.",
    order: 1.0,
    tags: &[("Soul", 10, 1), ("Immortality", 10, 1)],
}];

const CREATION_CONTEXT: &str = "# Historical Context\n\n\
This teaching on the purpose of creation reflects a consistent theme \
found across major world religions:\n\n\
## Comparative Perspectives\n\
- **Christianity**: \"The chief end of man is to glorify God\" (Westminster Catechism)\n\
- **Islam**: \"I have not created jinn and mankind except to worship Me\" (Quran 51:56)\n\
- **Hinduism**: The soul's journey toward union with the divine (moksha)\n\n\
## Bahá'í Unique Contribution\n\
The Bahá'í teaching emphasizes that knowing God happens through:\n\
1. Recognition of His Manifestations\n\
2. Service to humanity\n\
3. Development of spiritual virtues\n\n\
This moves beyond mere worship to active participation in civilization building.";

fn requests(tags: &[(&str, u8, u32)]) -> Vec<TagRequest> {
    tags.iter()
        .map(|(name, weight, distance)| {
            TagRequest::named(*name)
                .with_weight(*weight)
                .with_distance(*distance)
        })
        .collect()
}

fn day(year: i32, month: u32, day: u32) -> chrono::DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(Utc::now)
}

/// Load the sample archive.
///
/// Returns `None` without writing anything when the sample family already
/// exists, so running it twice never doubles the tag counts.
pub async fn seed_archive<B: Backend>(archive: &Archive<B>) -> ArchiveResult<Option<SeedSummary>> {
    if archive.family_by_uid(SEED_MARKER_UID).await?.is_some() {
        info!("Archive already seeded");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();

    let general = archive
        .create_family(FiresideFamily::new(
            SEED_MARKER_UID,
            "General Firesides",
            "A collection of general introductory firesides covering fundamental topics.",
        ))
        .await?;
    archive
        .create_family(FiresideFamily::new(
            "family-deepening",
            "Deepening Series",
            "In-depth study of Bahá'í teachings and principles.",
        ))
        .await?;
    summary.families = 2;

    let why_life = archive
        .create_fireside(
            Fireside::new(
                &general.id,
                "Why Life?",
                "The purpose of life and the study of the spiritual evolution of mankind",
            )
            .with_date(day(2024, 1, 15)),
        )
        .await?;
    let soul = archive
        .create_fireside(
            Fireside::new(
                &general.id,
                "The Nature of the Soul",
                "Understanding the immortal essence within each human being",
            )
            .with_date(day(2024, 2, 20)),
        )
        .await?;
    summary.firesides = 2;

    for (fireside_id, samples) in [(&why_life.id, WHY_LIFE), (&soul.id, NATURE_OF_THE_SOUL)] {
        for sample in samples {
            let saved = archive
                .create_snippet(
                    Snippet::new(fireside_id.as_str(), sample.name, sample.text, sample.order),
                    requests(sample.tags),
                )
                .await?;
            summary.snippets += 1;

            if sample.name == "The Purpose of Creation" {
                archive
                    .create_deepening(
                        Deepening::new(
                            &saved.stored.id,
                            "Historical Context of Creation Teachings",
                            CREATION_CONTEXT,
                        ),
                        requests(&[("Historical Context", 7, 3), ("Comparative Religion", 7, 4)]),
                    )
                    .await?;
                summary.deepenings += 1;
            }
        }
    }

    info!(?summary, "Seeded archive");
    Ok(Some(summary))
}

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let summary = seed_archive(&ctx.archive).await?;

    if ctx.json() {
        return output::print_json(&summary);
    }

    match summary {
        Some(summary) => {
            output::success("Seed complete");
            println!("   - {} fireside families", summary.families);
            println!("   - {} firesides", summary.firesides);
            println!("   - {} snippets", summary.snippets);
            println!("   - {} deepening", summary.deepenings);
        }
        None => println!(
            "{}",
            "Archive already contains the sample content; nothing to do.".dimmed()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireside_core::MemoryBackend;

    #[tokio::test]
    async fn test_seed_creates_sample_archive() {
        let archive = Archive::new(MemoryBackend::new());
        let summary = seed_archive(&archive).await.unwrap().unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                families: 2,
                firesides: 2,
                snippets: 5,
                deepenings: 1
            }
        );

        let soul = archive.tag_by_name("soul").await.unwrap().unwrap();
        assert_eq!(soul.reference_count, 2);
        assert_eq!(archive.tags().await.unwrap().len(), 11);

        let firesides = archive.firesides().await.unwrap();
        assert_eq!(firesides[0].name, "The Nature of the Soul");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let archive = Archive::new(MemoryBackend::new());
        seed_archive(&archive).await.unwrap();
        assert!(seed_archive(&archive).await.unwrap().is_none());

        let purpose = archive.tag_by_name("Purpose").await.unwrap().unwrap();
        assert_eq!(purpose.reference_count, 1);
        assert_eq!(archive.list::<Snippet>().await.unwrap().len(), 5);
    }
}
