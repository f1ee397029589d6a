// `opencode-launcher launch`: open opencode in a terminal, TUI or loopback web server.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::environment::probe_tool;
use crate::libs::launcher_config;
use crate::libs::terminal::{LOOPBACK_HOST, LaunchMode, LaunchRequest, launch};
use crate::libs::utilities::file_operations::expand_user_path;
use crate::{log_debug, log_info};
use anyhow::{Context, bail};
use serde_json::json;
use std::env;
use std::path::PathBuf;

pub fn run(ctx: &CommandContext, web: bool, port: Option<u16>, dir: Option<String>) -> CommandResult {
    log_debug!("Entered launch::run() function.");
    let config = launcher_config::load_or_initialize(&ctx.paths.config_file)
        .context("Failed to load launcher config")?;

    if !probe_tool(&ctx.paths, &config).present {
        bail!("opencode is not installed. Run `opencode-launcher install` first");
    }

    let work_dir: PathBuf = match dir.as_deref().or((!config.work_dir.is_empty()).then_some(config.work_dir.as_str())) {
        Some(dir) => expand_user_path(dir),
        None => env::current_dir().context("Failed to read the current directory")?,
    };
    if !work_dir.is_dir() {
        bail!("Work directory {} does not exist", work_dir.display());
    }

    let port = port.unwrap_or(config.web_port);
    let mode = if web { LaunchMode::Web { port } } else { LaunchMode::Interactive };

    let remembered_dir = work_dir.display().to_string();
    launcher_config::update(&ctx.paths.config_file, |c| {
        c.work_dir = remembered_dir;
        if web {
            c.web_port = port;
        }
    })
    .context("Failed to save launcher config")?;

    let request = LaunchRequest::new(&ctx.paths, &work_dir, mode);
    let handle = launch(&request).context("Failed to open a terminal")?;

    let url = web.then(|| format!("http://{LOOPBACK_HOST}:{port}"));
    if let Some(url) = &url {
        log_info!("opencode web will be served at {}", url);
    }
    let script = handle.script.clone();
    // Exit only after the temporary launch script is gone.
    handle.wait_for_cleanup();

    Ok(json!({
        "workDir": work_dir,
        "mode": if web { "web" } else { "tui" },
        "url": url,
        "script": script,
    }))
}
