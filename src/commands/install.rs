// `opencode-launcher install | upgrade | uninstall`: manage opencode in the private prefix.

use crate::commands::{CommandContext, CommandResult};
use crate::libs::environment::{probe_runtime, probe_tool, read_version};
use crate::libs::launcher_config;
use crate::libs::npm::{Npm, TOOL_PACKAGE};
use crate::libs::paths::LauncherPaths;
use crate::libs::progress::ConsoleProgress;
use crate::libs::utilities::versions::is_newer;
use crate::{log_debug, log_info};
use anyhow::{Context, bail};
use colored::Colorize;
use serde_json::json;

fn require_runtime(paths: &LauncherPaths) -> anyhow::Result<()> {
    let config = launcher_config::load_or_initialize(&paths.config_file)?;
    if !probe_runtime(paths, &config).present {
        bail!("Node.js runtime is not set up. Run `opencode-launcher setup` first");
    }
    Ok(())
}

/// Installs `version` (or the latest) and records the result.
fn install_version(paths: &LauncherPaths, version: Option<&str>) -> anyhow::Result<Option<String>> {
    let npm = Npm::new(paths);
    npm.install(TOOL_PACKAGE, version, &ConsoleProgress)
        .context("Failed to install opencode")?;

    let tool = paths.tool_executable();
    if !tool.is_file() {
        bail!(
            "npm reported success but {} does not exist",
            tool.display()
        );
    }
    launcher_config::update(&paths.config_file, |c| c.opencode_installed = true)
        .context("Failed to save launcher config")?;

    let installed = read_version(&tool, npm.environment());
    log_info!(
        "opencode {} installed",
        installed.as_deref().unwrap_or("(unknown version)").green()
    );
    Ok(installed)
}

pub fn install(ctx: &CommandContext, version: Option<String>) -> CommandResult {
    log_debug!("Entered install::install() function.");
    require_runtime(&ctx.paths)?;
    let installed = install_version(&ctx.paths, version.as_deref())?;
    Ok(json!({ "version": installed, "prefix": ctx.paths.tool_prefix }))
}

pub fn upgrade(ctx: &CommandContext, check: bool) -> CommandResult {
    log_debug!("Entered install::upgrade() function.");
    require_runtime(&ctx.paths)?;
    let config = launcher_config::load_or_initialize(&ctx.paths.config_file)?;
    let current = probe_tool(&ctx.paths, &config).version;

    let latest = Npm::new(&ctx.paths)
        .latest_version(TOOL_PACKAGE)
        .context("Failed to query the latest opencode version")?;

    let available = match &current {
        Some(current) => is_newer(&latest, current),
        None => true,
    };
    log_info!(
        "Installed: {}, latest: {}",
        current.as_deref().unwrap_or("none").cyan(),
        latest.cyan()
    );

    if check || !available {
        if !available {
            log_info!("opencode is up to date");
        }
        return Ok(json!({
            "current": current,
            "latest": latest,
            "updateAvailable": available,
            "upgraded": false,
        }));
    }

    let installed = install_version(&ctx.paths, Some(&latest))?;
    Ok(json!({
        "current": installed,
        "latest": latest,
        "updateAvailable": false,
        "upgraded": true,
    }))
}

pub fn uninstall(ctx: &CommandContext) -> CommandResult {
    log_debug!("Entered install::uninstall() function.");
    require_runtime(&ctx.paths)?;
    Npm::new(&ctx.paths)
        .uninstall(TOOL_PACKAGE, &ConsoleProgress)
        .context("Failed to uninstall opencode")?;
    launcher_config::update(&ctx.paths.config_file, |c| c.opencode_installed = false)
        .context("Failed to save launcher config")?;
    log_info!("opencode removed from {}", ctx.paths.tool_prefix.display());
    Ok(json!({ "prefix": ctx.paths.tool_prefix }))
}
