use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use fireside_core::{search_snippets, Deepening, Fireside, Snippet, Stored, Visibility};

use crate::cli::SnippetCommands;
use crate::commands::read_body;
use crate::context::CliContext;
use crate::output;
use crate::tag_args::{keep_existing, parse_tag_args};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnippetDetail {
    #[serde(flatten)]
    snippet: Stored<Snippet>,
    deepenings: Vec<Stored<Deepening>>,
}

pub async fn execute(ctx: &CliContext, cmd: SnippetCommands) -> Result<()> {
    match cmd {
        SnippetCommands::Add {
            fireside,
            name,
            text,
            file,
            order,
            private,
            tags,
        } => {
            let requests = parse_tag_args(&tags.tags)?;
            let body = read_body(text, file.as_deref())?.unwrap_or_default();
            // Reject unknown firesides before any tag is touched
            ctx.archive.get::<Fireside>(&fireside).await?;

            let visibility = if private {
                Visibility::Private
            } else {
                Visibility::Public
            };
            let snippet = Snippet::new(fireside, name, body, order).with_visibility(visibility);
            let saved = ctx.archive.create_snippet(snippet, requests).await?;
            output::report_skipped(&saved.report);

            if ctx.json() {
                return output::print_json(&saved.stored);
            }
            output::success(format!(
                "Created snippet '{}' ({})",
                saved.stored.name, saved.stored.id
            ));
        }

        SnippetCommands::Edit {
            id,
            name,
            text,
            file,
            order,
            visibility,
            tags,
            clear_tags,
        } => {
            let existing = ctx.archive.get::<Snippet>(&id).await?;
            let requests = if clear_tags {
                Vec::new()
            } else if !tags.tags.is_empty() {
                parse_tag_args(&tags.tags)?
            } else {
                keep_existing(&existing.tags)
            };

            let mut snippet = existing.into_inner();
            if let Some(name) = name {
                snippet.name = name;
            }
            if let Some(body) = read_body(text, file.as_deref())? {
                snippet.text = body;
            }
            if let Some(order) = order {
                snippet.natural_order = order;
            }
            if let Some(visibility) = visibility {
                snippet.visibility = visibility;
            }

            let saved = ctx.archive.update_snippet(&id, snippet, requests).await?;
            output::report_skipped(&saved.report);

            if ctx.json() {
                return output::print_json(&saved.stored);
            }
            output::success(format!("Updated snippet '{}'", saved.stored.name));
        }

        SnippetCommands::Delete { id } => {
            let report = ctx.archive.delete_snippet(&id).await?;
            output::report_skipped(&report);
            if ctx.json() {
                return output::print_json(&report);
            }
            output::success(format!("Deleted snippet {}", id));
        }

        SnippetCommands::List {
            fireside,
            public,
            search,
        } => {
            let snippets = match &fireside {
                Some(fireside_id) => {
                    let snippets = ctx.archive.snippets_by_fireside(fireside_id, public).await?;
                    match &search {
                        Some(_) => search_snippets(snippets, search.as_deref()),
                        None => snippets,
                    }
                }
                None => search_snippets(ctx.archive.list::<Snippet>().await?, search.as_deref()),
            };

            if ctx.json() {
                return output::print_json(&snippets);
            }
            if snippets.is_empty() {
                println!("{}", "No snippets found.".dimmed());
                return Ok(());
            }

            let names = output::tag_names(&ctx.archive.tags().await?);
            let mut table = output::table(vec!["Order", "Name", "Tags", "Visibility", "Id"]);
            for snippet in &snippets {
                table.add_row(vec![
                    snippet.natural_order.to_string(),
                    snippet.name.clone(),
                    output::tag_list(&snippet.tags, &names),
                    snippet.visibility.to_string(),
                    snippet.id.clone(),
                ]);
            }
            println!("{table}");
        }

        SnippetCommands::Show { id } => {
            let (snippet, deepenings) = tokio::try_join!(
                ctx.archive.get::<Snippet>(&id),
                ctx.archive.deepenings_by_snippet(&id)
            )
            .context("Failed to load snippet")?;

            if ctx.json() {
                return output::print_json(&SnippetDetail { snippet, deepenings });
            }

            let names = output::tag_names(&ctx.archive.tags().await?);
            println!("{} {}", "Snippet:".bold(), snippet.name);
            println!("  id:         {}", snippet.id);
            println!("  fireside:   {}", snippet.fireside_id);
            println!("  order:      {}", snippet.natural_order);
            println!("  visibility: {}", snippet.visibility);
            println!("  tags:       {}", output::tag_list(&snippet.tags, &names));
            println!();
            println!("{}", snippet.text);

            if !deepenings.is_empty() {
                println!();
                println!("{}", "Deepenings:".bold());
                for deepening in &deepenings {
                    println!("  - {} ({})", deepening.name, deepening.id);
                }
            }
        }
    }
    Ok(())
}
