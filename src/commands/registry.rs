// `opencode-launcher registry get|set`.

use crate::cli::cmd_enums::RegistryCommands;
use crate::commands::{CommandContext, CommandResult};
use crate::libs::launcher_config;
use crate::libs::npm::Npm;
use anyhow::{Context, bail};
use serde_json::json;

pub fn run(ctx: &CommandContext, action: RegistryCommands) -> CommandResult {
    let npm = Npm::new(&ctx.paths);
    match action {
        RegistryCommands::Get => {
            let registry = npm.get_registry();
            if !ctx.json {
                println!("{registry}");
            }
            Ok(json!({ "registry": registry }))
        }
        RegistryCommands::Set { url } => {
            let url = url.trim();
            if url.is_empty() {
                bail!("Registry URL must not be empty");
            }
            npm.set_registry(url).context("Failed to set npm registry")?;
            launcher_config::update(&ctx.paths.config_file, |c| c.npm_registry = url.to_string())
                .context("Failed to save launcher config")?;
            Ok(json!({ "registry": url }))
        }
    }
}
