// `opencode-launcher catalog [--provider P]`: browse models.dev.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::model_catalog::{fetch_catalog, find_provider};
use anyhow::Context;
use prettytable::{Table, format, row};
use serde_json::json;

pub fn run(ctx: &CommandContext, provider: Option<String>) -> CommandResult {
    let catalog = fetch_catalog().context("Failed to fetch the model catalog")?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let data = match provider {
        Some(id) => {
            let entry = find_provider(&catalog, &id)?;
            table.set_titles(row!["Model", "Name"]);
            for model in &entry.models {
                table.add_row(row![model.id, model.name]);
            }
            json!(entry)
        }
        None => {
            table.set_titles(row!["Provider", "Name", "Models", "Package"]);
            for entry in &catalog {
                table.add_row(row![
                    entry.id,
                    entry.name,
                    entry.models.len(),
                    entry.npm.as_deref().unwrap_or("-")
                ]);
            }
            json!({ "providers": catalog })
        }
    };

    if !ctx.json {
        table.printstd();
    }
    Ok(data)
}
