// `opencode-launcher watch`: report edits to opencode.json until interrupted.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::config_watcher::{ConfigWatcher, summarize};
use crate::libs::utilities::timestamps::current_timestamp;
use crate::{log_info, log_warn};
use anyhow::Context;
use colored::Colorize;

pub fn run(ctx: &CommandContext) -> CommandResult {
    let watcher = ConfigWatcher::start(&ctx.paths.tool_config_file).context("Failed to start file watcher")?;
    log_info!(
        "Watching {} (Ctrl-C to stop)",
        watcher.path().display().to_string().cyan()
    );

    while watcher.wait_for_change(None) {
        match summarize(watcher.path()) {
            Ok(summary) => {
                if ctx.json {
                    println!("{}", serde_json::to_string(&summary)?);
                } else {
                    log_info!(
                        "[{}] opencode.json changed: {} providers, {} models, default {}",
                        current_timestamp(),
                        summary.providers,
                        summary.models,
                        summary.default_model.as_deref().unwrap_or("(none)").green()
                    );
                }
            }
            Err(e) => log_warn!("[{}] opencode.json could not be read: {}", current_timestamp(), e),
        }
    }

    log_warn!("File watcher stopped");
    Ok(serde_json::Value::Null)
}
