// `opencode-launcher reset`: remove the private runtime and opencode install and restore
// default launcher settings. The private npmrc goes too, so the registry falls back to npm's
// default. opencode.json and auth.json belong to opencode and are kept.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::launcher_config;
use crate::libs::utilities::file_operations::{remove_dir_if_exists, remove_file_if_exists};
use crate::{log_debug, log_info, log_warn};
use anyhow::{Context, bail};
use dialoguer::Confirm;
use serde_json::json;

pub fn run(ctx: &CommandContext, yes: bool) -> CommandResult {
    log_debug!("Entered reset::run() function.");
    if !yes {
        if ctx.json {
            bail!("Refusing to reset without confirmation; pass --yes");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} and {} and reset launcher settings?",
                ctx.paths.runtime_dir.display(),
                ctx.paths.tool_prefix.display()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            log_warn!("Reset cancelled");
            return Ok(json!({ "reset": false }));
        }
    }

    let runtime_removed = remove_dir_if_exists(&ctx.paths.runtime_dir)
        .with_context(|| format!("Failed to remove {}", ctx.paths.runtime_dir.display()))?;
    let tool_removed = remove_dir_if_exists(&ctx.paths.tool_prefix)
        .with_context(|| format!("Failed to remove {}", ctx.paths.tool_prefix.display()))?;
    let npmrc = ctx.paths.npm_userconfig();
    let registry_cleared =
        remove_file_if_exists(&npmrc).with_context(|| format!("Failed to remove {}", npmrc.display()))?;
    launcher_config::reset(&ctx.paths.config_file).context("Failed to rewrite launcher config")?;

    log_info!("Launcher reset to a clean state");
    Ok(json!({
        "reset": true,
        "runtimeRemoved": runtime_removed,
        "toolRemoved": tool_removed,
        "registryCleared": registry_cleared,
    }))
}
