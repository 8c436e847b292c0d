use anyhow::Result;
use colored::Colorize;

use fireside_core::{Deepening, Snippet};

use crate::cli::DeepeningCommands;
use crate::commands::read_body;
use crate::context::CliContext;
use crate::output;
use crate::tag_args::parse_tag_args;

pub async fn execute(ctx: &CliContext, cmd: DeepeningCommands) -> Result<()> {
    match cmd {
        DeepeningCommands::Add {
            snippet,
            name,
            text,
            file,
            media_ids,
            tags,
        } => {
            let requests = parse_tag_args(&tags.tags)?;
            let body = read_body(text, file.as_deref())?.unwrap_or_default();
            ctx.archive.get::<Snippet>(&snippet).await?;

            let mut deepening = Deepening::new(snippet, name, body);
            deepening.media_ids = media_ids;
            let saved = ctx.archive.create_deepening(deepening, requests).await?;
            output::report_skipped(&saved.report);

            if ctx.json() {
                return output::print_json(&saved.stored);
            }
            output::success(format!(
                "Created deepening '{}' ({})",
                saved.stored.name, saved.stored.id
            ));
        }

        DeepeningCommands::Delete { id } => {
            let report = ctx.archive.delete_deepening(&id).await?;
            output::report_skipped(&report);
            if ctx.json() {
                return output::print_json(&report);
            }
            output::success(format!("Deleted deepening {}", id));
        }

        DeepeningCommands::List { snippet } => {
            let deepenings = ctx.archive.deepenings_by_snippet(&snippet).await?;
            if ctx.json() {
                return output::print_json(&deepenings);
            }
            if deepenings.is_empty() {
                println!("{}", "No deepenings for this snippet.".dimmed());
                return Ok(());
            }

            let names = output::tag_names(&ctx.archive.tags().await?);
            let mut table = output::table(vec!["Name", "Preview", "Tags", "Media", "Id"]);
            for deepening in &deepenings {
                table.add_row(vec![
                    deepening.name.clone(),
                    output::preview(&deepening.text, 40),
                    output::tag_list(&deepening.tags, &names),
                    deepening.media_ids.len().to_string(),
                    deepening.id.clone(),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
