use anyhow::{bail, Result};
use colored::Colorize;

use fireside_core::{Deepening, Outline, OutlineItem, OutlineItemKind, Snippet};

use crate::cli::OutlineCommands;
use crate::context::CliContext;
use crate::output;

pub async fn execute(ctx: &CliContext, cmd: OutlineCommands) -> Result<()> {
    match cmd {
        OutlineCommands::List { user, public } => {
            let outlines = match user {
                Some(user) if !public => ctx.archive.outlines_by_user(&user).await?,
                _ => ctx.archive.public_outlines().await?,
            };
            if ctx.json() {
                return output::print_json(&outlines);
            }
            if outlines.is_empty() {
                println!("{}", "No outlines found.".dimmed());
                return Ok(());
            }

            let mut table = output::table(vec!["Title", "Items", "Public", "User", "Id"]);
            for outline in &outlines {
                table.add_row(vec![
                    outline.title.clone(),
                    outline.item_count().to_string(),
                    if outline.is_public { "yes" } else { "no" }.to_string(),
                    outline.user_id.clone(),
                    outline.id.clone(),
                ]);
            }
            println!("{table}");
        }

        OutlineCommands::Create {
            user,
            title,
            public,
        } => {
            let mut outline = Outline::new(user, title);
            outline.is_public = public;
            let stored = ctx.archive.create_outline(outline).await?;
            if ctx.json() {
                return output::print_json(&stored);
            }
            output::success(format!("Created outline '{}' ({})", stored.title, stored.id));
        }

        OutlineCommands::AddItem {
            outline,
            kind,
            ref_id,
            parent,
        } => {
            match kind {
                OutlineItemKind::Snippet => ctx.archive.get::<Snippet>(&ref_id).await.map(|_| ())?,
                OutlineItemKind::Deepening => {
                    ctx.archive.get::<Deepening>(&ref_id).await.map(|_| ())?
                }
            }

            let mut record = ctx.archive.get::<Outline>(&outline).await?.into_inner();
            let item_id = match parent {
                Some(parent) => match record.add_child(&parent, kind, ref_id) {
                    Some(item_id) => item_id,
                    None => bail!("Outline has no item '{}'", parent),
                },
                None => record.add_item(kind, ref_id),
            };
            ctx.archive.update_outline(&outline, record).await?;

            if ctx.json() {
                return output::print_json(&serde_json::json!({ "itemId": item_id }));
            }
            output::success(format!("Added {} item {}", kind, item_id));
        }

        OutlineCommands::RemoveItem { outline, item } => {
            let mut record = ctx.archive.get::<Outline>(&outline).await?.into_inner();
            let Some(removed) = record.remove_item(&item) else {
                bail!("Outline has no item '{}'", item);
            };
            ctx.archive.update_outline(&outline, record).await?;

            if ctx.json() {
                return output::print_json(&removed);
            }
            output::success(format!(
                "Removed item {} and {} nested items",
                removed.item_id,
                count_nested(&removed)
            ));
        }

        OutlineCommands::Toggle { outline, item } => {
            let mut record = ctx.archive.get::<Outline>(&outline).await?.into_inner();
            let Some(visible) = record.toggle_visibility(&item) else {
                bail!("Outline has no item '{}'", item);
            };
            ctx.archive.update_outline(&outline, record).await?;

            if ctx.json() {
                return output::print_json(&serde_json::json!({
                    "itemId": item,
                    "isVisible": visible,
                }));
            }
            output::success(format!(
                "Item {} is now {}",
                item,
                if visible { "visible" } else { "hidden" }
            ));
        }

        OutlineCommands::Show { outline } => {
            let stored = ctx.archive.get::<Outline>(&outline).await?;
            if ctx.json() {
                return output::print_json(&stored);
            }

            println!("{} {}", "Outline:".bold(), stored.title);
            if stored.items.is_empty() {
                println!("{}", "  (empty)".dimmed());
            }
            for item in &stored.items {
                print_item(item, 1);
            }
            println!(
                "{}",
                format!(
                    "{} of {} items visible",
                    stored.visible_refs().len(),
                    stored.item_count()
                )
                .dimmed()
            );
        }
    }
    Ok(())
}

fn print_item(item: &OutlineItem, depth: usize) {
    let line = format!(
        "{}- [{}] {} ({})",
        "  ".repeat(depth),
        item.kind,
        item.ref_id,
        item.item_id
    );
    if item.is_visible {
        println!("{}", line);
    } else {
        println!("{}", line.dimmed());
    }
    for child in &item.children {
        print_item(child, depth + 1);
    }
}

fn count_nested(item: &OutlineItem) -> usize {
    item.children.iter().map(|c| 1 + count_nested(c)).sum()
}
