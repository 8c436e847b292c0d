use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;
use std::collections::HashMap;

use fireside_core::{Fireside, FiresideFamily, FiresideQuery};

use crate::cli::FiresideCommands;
use crate::context::CliContext;
use crate::output;

pub async fn execute(ctx: &CliContext, cmd: FiresideCommands) -> Result<()> {
    match cmd {
        FiresideCommands::List {
            search,
            family,
            sort,
        } => {
            let query = FiresideQuery {
                search,
                family_id: family,
                sort,
            };
            let firesides = query.apply(ctx.archive.firesides().await?);

            if ctx.json() {
                return output::print_json(&firesides);
            }
            if firesides.is_empty() {
                println!("{}", "No firesides found.".dimmed());
                return Ok(());
            }

            let families: HashMap<String, String> = ctx
                .archive
                .list::<FiresideFamily>()
                .await?
                .into_iter()
                .map(|f| (f.id.clone(), f.record.name))
                .collect();

            let mut table = output::table(vec!["Date", "Name", "Family", "Description", "Id"]);
            for fireside in &firesides {
                table.add_row(vec![
                    output::date(&fireside.date),
                    fireside.name.clone(),
                    families
                        .get(&fireside.fireside_family_id)
                        .cloned()
                        .unwrap_or_default(),
                    output::preview(&fireside.description, 48),
                    fireside.id.clone(),
                ]);
            }
            println!("{table}");
        }

        FiresideCommands::Add {
            family,
            name,
            description,
            date,
        } => {
            ctx.archive.get::<FiresideFamily>(&family).await?;

            let mut fireside = Fireside::new(family, name, description);
            if let Some(date) = date {
                fireside = fireside.with_date(parse_date(&date)?);
            }
            let stored = ctx.archive.create_fireside(fireside).await?;

            if ctx.json() {
                return output::print_json(&stored);
            }
            output::success(format!("Created fireside '{}' ({})", stored.name, stored.id));
        }
    }
    Ok(())
}

/// `YYYY-MM-DD` at midnight UTC
pub fn parse_date(value: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date '{}'", value))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-02-20").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 20));
        assert!(parse_date("20/02/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
