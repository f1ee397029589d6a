mod cli;
mod commands;
mod libs;
mod logger;
mod schemas;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use commands::{CommandContext, report};
use libs::paths::LauncherPaths;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.debug);
    log_debug!("Parsed CLI arguments, dispatching command");

    let paths = match LauncherPaths::resolve(cli.data_dir.as_deref(), cli.resources.as_deref()) {
        Ok(paths) => paths,
        Err(e) => return exit_code(report(cli.json, Err(e.into()))),
    };
    let ctx = CommandContext { paths, json: cli.json };

    let result = match cli.command {
        Commands::Status => commands::status::run(&ctx),
        Commands::Setup => commands::setup::run(&ctx),
        Commands::Registry { action } => commands::registry::run(&ctx, action),
        Commands::Install { version } => commands::install::install(&ctx, version),
        Commands::Upgrade { check } => commands::install::upgrade(&ctx, check),
        Commands::Uninstall => commands::install::uninstall(&ctx),
        Commands::Launch { web, port, dir } => commands::launch::run(&ctx, web, port, dir),
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::Reset { yes } => commands::reset::run(&ctx, yes),
        Commands::Models { action } => commands::models::run(&ctx, action),
        Commands::Catalog { provider } => commands::catalog::run(&ctx, provider),
        Commands::Auth { action } => commands::auth::run(&ctx, action),
        Commands::Skills { action } => commands::skills::run(&ctx, action),
        Commands::Watch => commands::watch::run(&ctx),
    };

    exit_code(report(ctx.json, result))
}

fn exit_code(code: i32) -> ExitCode {
    if code == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
