// `opencode-launcher models ...`: edit providers and models in opencode.json.
//
// Every mutation loads the document, patches it, and saves with the concurrency guard. The
// launcher's `modelMetadata` is stamped for each model touched so `models list` shows
// recently used entries first.

use crate::cli::cmd_enums::ModelsCommands;
use crate::cli::type_enums::ModelRef;
use crate::commands::{CommandContext, CommandResult};
use crate::libs::launcher_config::{self, forget_models, touch_model};
use crate::libs::model_catalog::{fetch_catalog, find_provider};
use crate::libs::paths::LauncherPaths;
use crate::libs::tool_config::{EMBEDDED_TEMPLATE, ProviderUpdate, ToolConfigDocument, generate_from_template};
use crate::{log_debug, log_info};
use anyhow::{Context, bail};
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;
use std::borrow::Cow;
use std::fs;

pub fn run(ctx: &CommandContext, action: ModelsCommands) -> CommandResult {
    match action {
        ModelsCommands::Init { force } => init(ctx, force),
        ModelsCommands::List => list(ctx),
        ModelsCommands::AddProvider {
            id,
            name,
            npm,
            base_url,
            api_key,
            models,
            from_catalog,
            force,
        } => {
            let update = ProviderUpdate {
                name,
                npm,
                base_url,
                api_key,
                models: models.into_iter().map(|m| (m.id, m.name)).collect(),
            };
            add_provider(ctx, &id, update, from_catalog, force)
        }
        ModelsCommands::RemoveProvider { id, force } => remove_provider(ctx, &id, force),
        ModelsCommands::AddModel { reference, name, force } => add_model(ctx, &reference, name, force),
        ModelsCommands::RemoveModel { reference, force } => remove_model(ctx, &reference, force),
        ModelsCommands::Default { reference, force } => set_default(ctx, &reference, force),
    }
}

/// Bundled template from the resources directory, or the one compiled in.
fn template(paths: &LauncherPaths) -> anyhow::Result<Cow<'static, [u8]>> {
    let bundled = paths.bundled_tool_config_template();
    if bundled.is_file() {
        log_debug!("[Models] Using template {}", bundled.display());
        let bytes = fs::read(&bundled).with_context(|| format!("Failed to read {}", bundled.display()))?;
        Ok(Cow::Owned(bytes))
    } else {
        Ok(Cow::Borrowed(EMBEDDED_TEMPLATE))
    }
}

fn init(ctx: &CommandContext, force: bool) -> CommandResult {
    let template = template(&ctx.paths)?;
    generate_from_template(&template, &ctx.paths.tool_config_file, force)
        .context("Failed to generate opencode.json")?;
    Ok(json!({ "path": ctx.paths.tool_config_file }))
}

fn load(paths: &LauncherPaths) -> anyhow::Result<ToolConfigDocument> {
    ToolConfigDocument::load(&paths.tool_config_file).context("Failed to load opencode.json")
}

/// Applies `change` to the launcher's `modelMetadata`.
fn stamp<F>(paths: &LauncherPaths, change: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut crate::schemas::launcher_config::LauncherConfig),
{
    launcher_config::update(&paths.config_file, change).context("Failed to save launcher config")?;
    Ok(())
}

fn list(ctx: &CommandContext) -> CommandResult {
    let doc = load(&ctx.paths)?;
    let config = launcher_config::load_or_initialize(&ctx.paths.config_file)
        .context("Failed to load launcher config")?;
    let entries = doc.config.model_entries(&config.model_metadata);

    if !ctx.json {
        if entries.is_empty() {
            log_info!(
                "No models configured in {}. Try `opencode-launcher models init`",
                ctx.paths.tool_config_file.display()
            );
        } else {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
            table.set_titles(row!["", "Model", "Name", "Provider"]);
            for entry in &entries {
                let marker = if entry.is_default { "*".green().to_string() } else { String::new() };
                table.add_row(row![marker, entry.key(), entry.model_name, entry.provider_name]);
            }
            table.printstd();
        }
    }

    Ok(json!({ "default": doc.config.model, "models": entries }))
}

fn add_provider(
    ctx: &CommandContext,
    id: &str,
    mut update: ProviderUpdate,
    from_catalog: bool,
    force: bool,
) -> CommandResult {
    if from_catalog {
        let catalog = fetch_catalog().context("Failed to fetch the model catalog")?;
        let entry = find_provider(&catalog, id)?;
        update.name = update.name.or_else(|| Some(entry.name.clone()));
        update.npm = update.npm.or_else(|| entry.npm.clone());
        update.base_url = update.base_url.or_else(|| entry.api.clone());
        if update.models.is_empty() {
            update.models = entry
                .models
                .iter()
                .map(|m| (m.id.clone(), Some(m.name.clone())))
                .collect();
        }
        log_debug!("[Models] Seeded '{}' from the catalog with {} models", id, update.models.len());
    }

    let model_ids: Vec<String> = update.models.iter().map(|(model, _)| model.clone()).collect();
    let mut doc = load(&ctx.paths)?;
    let created = doc.config.upsert_provider(id, update);
    doc.save(force).context("Failed to save opencode.json")?;

    stamp(&ctx.paths, |c| {
        for model in &model_ids {
            touch_model(c, id, model);
        }
    })?;

    log_info!(
        "Provider {} {} with {} model(s)",
        id.cyan(),
        if created { "added" } else { "updated" },
        model_ids.len()
    );
    Ok(json!({ "provider": id, "created": created, "models": model_ids }))
}

fn remove_provider(ctx: &CommandContext, id: &str, force: bool) -> CommandResult {
    let mut doc = load(&ctx.paths)?;
    if !doc.config.remove_provider(id) {
        bail!("Provider '{}' is not configured", id);
    }
    doc.save(force).context("Failed to save opencode.json")?;
    stamp(&ctx.paths, |c| forget_models(c, id, None))?;
    log_info!("Provider {} removed", id.cyan());
    Ok(json!({ "provider": id, "default": doc.config.model }))
}

fn add_model(ctx: &CommandContext, reference: &ModelRef, name: Option<String>, force: bool) -> CommandResult {
    let mut doc = load(&ctx.paths)?;
    doc.config.add_model(&reference.provider, &reference.model, name)?;
    doc.save(force).context("Failed to save opencode.json")?;
    stamp(&ctx.paths, |c| touch_model(c, &reference.provider, &reference.model))?;
    log_info!("Model {} added", reference.to_string().cyan());
    Ok(json!({ "model": reference.to_string() }))
}

fn remove_model(ctx: &CommandContext, reference: &ModelRef, force: bool) -> CommandResult {
    let mut doc = load(&ctx.paths)?;
    if !doc.config.remove_model(&reference.provider, &reference.model)? {
        bail!("Model '{}' is not configured", reference);
    }
    doc.save(force).context("Failed to save opencode.json")?;
    stamp(&ctx.paths, |c| forget_models(c, &reference.provider, Some(&reference.model)))?;
    log_info!("Model {} removed", reference.to_string().cyan());
    Ok(json!({ "model": reference.to_string(), "default": doc.config.model }))
}

fn set_default(ctx: &CommandContext, reference: &ModelRef, force: bool) -> CommandResult {
    let mut doc = load(&ctx.paths)?;
    doc.config.set_default_model(&reference.to_string())?;
    doc.save(force).context("Failed to save opencode.json")?;
    stamp(&ctx.paths, |c| touch_model(c, &reference.provider, &reference.model))?;
    log_info!("Default model set to {}", reference.to_string().green());
    Ok(json!({ "default": reference.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::tool_config::ToolConfigDocument;

    fn context(root: &std::path::Path) -> CommandContext {
        CommandContext {
            paths: LauncherPaths::rooted(&root.join("data"), &root.join("res"), &root.join("home")),
            json: true,
        }
    }

    fn model(reference: &str) -> ModelRef {
        reference.parse().unwrap()
    }

    #[test]
    fn init_prefers_bundled_template() {
        let root = tempfile::tempdir().unwrap();
        let ctx = context(root.path());
        fs::create_dir_all(&ctx.paths.resources_dir).unwrap();
        fs::write(ctx.paths.bundled_tool_config_template(), b"{\"provider\":{}}\n").unwrap();

        init(&ctx, false).unwrap();

        assert_eq!(
            fs::read(&ctx.paths.tool_config_file).unwrap(),
            b"{\"provider\":{}}\n"
        );
        assert!(init(&ctx, false).is_err());
    }

    #[test]
    fn provider_lifecycle_updates_config_and_metadata() {
        let root = tempfile::tempdir().unwrap();
        let ctx = context(root.path());

        add_provider(
            &ctx,
            "proxy",
            ProviderUpdate {
                base_url: Some("https://proxy/v1".to_string()),
                models: vec![("m1".to_string(), None), ("m2".to_string(), Some("M2".to_string()))],
                ..ProviderUpdate::default()
            },
            false,
            false,
        )
        .unwrap();
        set_default(&ctx, &model("proxy/m2"), false).unwrap();

        let listed = list(&ctx).unwrap();
        assert_eq!(listed["default"], "proxy/m2");
        assert_eq!(listed["models"].as_array().unwrap().len(), 2);

        remove_model(&ctx, &model("proxy/m2"), false).unwrap();
        let doc = ToolConfigDocument::load(&ctx.paths.tool_config_file).unwrap();
        assert_eq!(doc.config.model, None);
        let config = launcher_config::load_or_initialize(&ctx.paths.config_file).unwrap();
        assert!(config.model_metadata.contains_key("proxy/m1"));
        assert!(!config.model_metadata.contains_key("proxy/m2"));

        remove_provider(&ctx, "proxy", false).unwrap();
        let config = launcher_config::load_or_initialize(&ctx.paths.config_file).unwrap();
        assert!(config.model_metadata.is_empty());
        assert!(remove_provider(&ctx, "proxy", false).is_err());
    }

    #[test]
    fn adding_model_to_unknown_provider_fails() {
        let root = tempfile::tempdir().unwrap();
        let ctx = context(root.path());
        let err = add_model(&ctx, &model("ghost/m"), None, false).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown provider 'ghost'"));
    }
}
