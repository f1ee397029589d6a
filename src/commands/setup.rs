// `opencode-launcher setup`: extract the bundled Node.js runtime.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::launcher_config;
use crate::libs::npm::Npm;
use crate::libs::progress::ConsoleProgress;
use crate::libs::provisioner::{NODE_VERSION, provision_runtime};
use crate::{log_debug, log_info, log_warn};
use anyhow::Context;
use serde_json::json;

pub fn run(ctx: &CommandContext) -> CommandResult {
    log_debug!("Entered setup::run() function.");
    let archive = provision_runtime(&ctx.paths, &ConsoleProgress).context("Failed to extract Node.js")?;

    let config = launcher_config::update(&ctx.paths.config_file, |c| c.nodejs_extracted = true)
        .context("Failed to save launcher config")?;

    // A fresh runtime has a fresh npmrc; carry the remembered registry over.
    if !config.npm_registry.is_empty() {
        match Npm::new(&ctx.paths).set_registry(&config.npm_registry) {
            Ok(()) => log_info!("[Setup] Restored npm registry {}", config.npm_registry),
            Err(e) => log_warn!("[Setup] Could not restore npm registry: {}", e),
        }
    }

    log_info!("Node.js is ready. Next: {}", "opencode-launcher install");
    Ok(json!({
        "nodeVersion": NODE_VERSION,
        "archive": archive,
        "runtimeDir": ctx.paths.runtime_dir,
    }))
}
