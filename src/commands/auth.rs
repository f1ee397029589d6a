// `opencode-launcher auth set|show`: the API key in opencode's auth.json.

use crate::cli::cmd_enums::AuthCommands;
use crate::commands::{CommandContext, CommandResult};
use crate::libs::credentials;
use crate::log_info;
use crate::schemas::credentials::ApiCredential;
use anyhow::{Context, bail};
use serde_json::json;

pub fn run(ctx: &CommandContext, action: AuthCommands) -> CommandResult {
    let path = &ctx.paths.auth_file;
    match action {
        AuthCommands::Set { key, provider } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            let credential = ApiCredential::api(key);
            credentials::set(path, &provider, &credential).context("Failed to write auth.json")?;
            log_info!("Stored API key for '{}' ({})", provider, credential.masked_key());
            Ok(json!({ "provider": provider, "key": credential.masked_key() }))
        }
        AuthCommands::Show { provider } => {
            let credential = credentials::get(path, &provider).context("Failed to read auth.json")?;
            let masked = credential.as_ref().map(ApiCredential::masked_key);
            if !ctx.json {
                match &masked {
                    Some(masked) => println!("{provider}: {masked}"),
                    None => println!("{provider}: (no API key stored)"),
                }
            }
            Ok(json!({ "provider": provider, "key": masked }))
        }
    }
}
