// `opencode-launcher skills ...`: the skills CLI run through the private runtime.

use crate::cli::cmd_enums::SkillsCommands;
use crate::commands::{CommandContext, CommandResult};
use crate::libs::npm::Npm;
use crate::libs::skills::{self, SkillsAction};
use crate::schemas::skills::SkillRecord;
use anyhow::Context;
use prettytable::{Table, format, row};
use serde_json::json;

impl From<SkillsCommands> for SkillsAction {
    fn from(command: SkillsCommands) -> Self {
        match command {
            SkillsCommands::Add { source, global } => SkillsAction::Add { source, global },
            SkillsCommands::List => SkillsAction::List { json: true },
            SkillsCommands::Find { query } => SkillsAction::Find { query },
            SkillsCommands::Check => SkillsAction::Check,
            SkillsCommands::Update => SkillsAction::Update,
        }
    }
}

pub fn run(ctx: &CommandContext, command: SkillsCommands) -> CommandResult {
    let action = SkillsAction::from(command);
    let npm = Npm::new(&ctx.paths);
    let report = skills::run(&npm, &action).with_context(|| format!("{} failed", action.label()))?;

    if !ctx.json {
        if report.records.is_empty() {
            // Nothing recognizable; show what the CLI said.
            print!("{}", report.raw);
        } else {
            print_records(&report.records);
        }
    }
    Ok(json!({ "skills": report.records }))
}

fn print_records(records: &[SkillRecord]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Skill", "Version", "Details"]);
    for record in records {
        let details = record
            .path
            .as_deref()
            .or(record.description.as_deref())
            .unwrap_or("");
        table.add_row(row![record.name, record.version.as_deref().unwrap_or("-"), details]);
    }
    table.printstd();
}
