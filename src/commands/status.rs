// `opencode-launcher status`: what is installed and where.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::environment::{ComponentStatus, probe_runtime, probe_tool};
use crate::libs::launcher_config;
use crate::libs::npm::{Npm, UNKNOWN_REGISTRY};
use crate::log_debug;
use anyhow::Context;
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

pub fn run(ctx: &CommandContext) -> CommandResult {
    log_debug!("Entered status::run() function.");
    let config = launcher_config::load_or_initialize(&ctx.paths.config_file)
        .context("Failed to load launcher config")?;

    let runtime = probe_runtime(&ctx.paths, &config);
    let tool = probe_tool(&ctx.paths, &config);
    // npm can only answer once the runtime exists.
    let registry = if runtime.present {
        Npm::new(&ctx.paths).get_registry()
    } else {
        UNKNOWN_REGISTRY.to_string()
    };

    if !ctx.json {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.add_row(row!["Node.js runtime", describe(&runtime), runtime.path.display()]);
        table.add_row(row!["opencode", describe(&tool), tool.path.display()]);
        table.add_row(row!["npm registry", registry, ""]);
        table.add_row(row!["Work directory", or_unset(&config.work_dir), ""]);
        table.add_row(row!["Web port", config.web_port, ""]);
        table.printstd();
    }

    Ok(json!({
        "runtime": runtime,
        "opencode": tool,
        "registry": registry,
        "config": config,
    }))
}

fn describe(status: &ComponentStatus) -> String {
    match (status.present, &status.version) {
        (true, Some(version)) => format!("{} {}", "installed".green(), version),
        (true, None) => "installed".green().to_string(),
        (false, _) => "not installed".yellow().to_string(),
    }
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}
