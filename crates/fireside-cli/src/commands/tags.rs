use anyhow::Result;
use colored::Colorize;

use fireside_core::storage::Backend;
use fireside_core::{sort_tags, Archive, ArchiveError, Tag, TagId};

use crate::cli::TagsCommands;
use crate::context::CliContext;
use crate::output;

pub async fn execute(ctx: &CliContext, cmd: TagsCommands) -> Result<()> {
    match cmd {
        TagsCommands::List { sort } => {
            let tags = sort_tags(ctx.archive.tags().await?, sort);
            if ctx.json() {
                return output::print_json(&tags);
            }
            if tags.is_empty() {
                println!("{}", "No tags yet.".dimmed());
                return Ok(());
            }
            let mut table = output::table(vec!["Name", "Count", "Id"]);
            for tag in &tags {
                table.add_row(vec![
                    tag.name.clone(),
                    tag.reference_count.to_string(),
                    tag.id.to_string(),
                ]);
            }
            println!("{table}");
        }

        TagsCommands::Show { tag } => {
            let tag = find_tag(&ctx.archive, &tag).await?;
            if ctx.json() {
                return output::print_json(&tag);
            }
            println!("{} {}", "Tag:".bold(), tag.name);
            println!("  id:         {}", tag.id);
            println!("  references: {}", tag.reference_count);
            println!("  created:    {}", output::date(&tag.created_at));
        }

        TagsCommands::Delete { tag } => {
            let tag = find_tag(&ctx.archive, &tag).await?;
            ctx.archive.delete_tag(&tag.id).await?;
            if tag.reference_count > 0 {
                eprintln!(
                    "{} {} entities still reference '{}'; \
                     run `fireside tags recount` after re-tagging them",
                    "Warning:".yellow().bold(),
                    tag.reference_count,
                    tag.name
                );
            }
            output::success(format!("Deleted tag '{}'", tag.name));
        }

        TagsCommands::Recount => {
            let drift = ctx.archive.recount_tags().await?;
            if ctx.json() {
                return output::print_json(&drift);
            }
            if drift.is_empty() {
                output::success("All tag counts match their references");
                return Ok(());
            }
            let mut table = output::table(vec!["Name", "Stored", "Actual"]);
            for entry in &drift {
                table.add_row(vec![
                    entry.name.clone(),
                    entry.stored.to_string(),
                    entry.actual.to_string(),
                ]);
            }
            println!("{table}");
            output::success(format!("Corrected {} tag counts", drift.len()));
        }
    }
    Ok(())
}

/// `@<id>` looks up by id, anything else by case-insensitive name
pub async fn find_tag<B: Backend>(archive: &Archive<B>, arg: &str) -> Result<Tag> {
    match arg.strip_prefix('@') {
        Some(id) => Ok(archive.tag(&TagId::new(id)).await?),
        None => Ok(archive
            .tag_by_name(arg)
            .await?
            .ok_or_else(|| ArchiveError::not_found("tag", arg))?),
    }
}
