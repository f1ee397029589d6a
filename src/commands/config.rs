// `opencode-launcher config show|set-work-dir|set-port`.

use crate::cli::cmd_enums::ConfigCommands;
use crate::commands::{CommandContext, CommandResult};
use crate::libs::launcher_config;
use crate::libs::utilities::file_operations::expand_user_path;
use crate::log_info;
use anyhow::{Context, bail};
use serde_json::json;

pub fn run(ctx: &CommandContext, action: ConfigCommands) -> CommandResult {
    let path = &ctx.paths.config_file;
    match action {
        ConfigCommands::Show => {
            let config = launcher_config::load_or_initialize(path).context("Failed to load launcher config")?;
            if !ctx.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(json!({ "path": path, "config": config }))
        }
        ConfigCommands::SetWorkDir { dir } => {
            let dir = expand_user_path(&dir);
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            let dir = dir.canonicalize().unwrap_or(dir);
            let value = dir.display().to_string();
            let config = launcher_config::update(path, |c| c.work_dir = value)
                .context("Failed to save launcher config")?;
            log_info!("Work directory set to {}", config.work_dir);
            Ok(json!({ "workDir": config.work_dir }))
        }
        ConfigCommands::SetPort { port } => {
            let config = launcher_config::update(path, |c| c.web_port = port)
                .context("Failed to save launcher config")?;
            log_info!("Web port set to {}", config.web_port);
            Ok(json!({ "webPort": config.web_port }))
        }
    }
}
