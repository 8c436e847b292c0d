use anyhow::{bail, Result};
use colored::Colorize;

use fireside_core::FiresideFamily;

use crate::cli::FamilyCommands;
use crate::context::CliContext;
use crate::output;

pub async fn execute(ctx: &CliContext, cmd: FamilyCommands) -> Result<()> {
    match cmd {
        FamilyCommands::Add {
            uid,
            name,
            description,
        } => {
            if ctx.archive.family_by_uid(&uid).await?.is_some() {
                bail!("A family with uid '{}' already exists", uid);
            }
            let stored = ctx
                .archive
                .create_family(FiresideFamily::new(uid, name, description))
                .await?;

            if ctx.json() {
                return output::print_json(&stored);
            }
            output::success(format!("Created family '{}' ({})", stored.name, stored.id));
        }

        FamilyCommands::List => {
            let families = ctx.archive.list::<FiresideFamily>().await?;
            if ctx.json() {
                return output::print_json(&families);
            }
            if families.is_empty() {
                println!("{}", "No families yet. Run `fireside seed` for sample content.".dimmed());
                return Ok(());
            }

            let mut table = output::table(vec!["Uid", "Name", "Description", "Id"]);
            for family in &families {
                table.add_row(vec![
                    family.uid.clone(),
                    family.name.clone(),
                    output::preview(&family.description, 48),
                    family.id.clone(),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
