// Loading and saving the launcher's own `config.json`.
//
// The record is read whole, changed in memory and rewritten whole (atomically) after every
// change. A missing file is created with defaults on first use.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::utilities::file_operations::write_atomic;
use crate::libs::utilities::timestamps::now_millis;
use crate::log_debug;
use crate::schemas::launcher_config::{LauncherConfig, model_key};
use std::fs;
use std::path::Path;

/// Loads `config.json`, writing defaults first if it doesn't exist yet.
pub fn load_or_initialize(path: &Path) -> LauncherResult<LauncherConfig> {
    if !path.exists() {
        log_debug!("[Config] {} not found, creating defaults", path.display());
        let config = LauncherConfig::default();
        save(path, &config)?;
        return Ok(config);
    }

    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents).map_err(|source| LauncherError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log_debug!("[Config] Loaded {}: {:?}", path.display(), config);
    Ok(config)
}

pub fn save(path: &Path, config: &LauncherConfig) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(|source| LauncherError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, json.as_bytes())?;
    Ok(())
}

/// Loads, applies `change`, saves, and returns the updated record.
pub fn update<F>(path: &Path, change: F) -> LauncherResult<LauncherConfig>
where
    F: FnOnce(&mut LauncherConfig),
{
    let mut config = load_or_initialize(path)?;
    change(&mut config);
    save(path, &config)?;
    Ok(config)
}

/// Overwrites `config.json` with defaults.
pub fn reset(path: &Path) -> LauncherResult<LauncherConfig> {
    let config = LauncherConfig::default();
    save(path, &config)?;
    Ok(config)
}

/// Stamps `provider/model` with the current time so listings show it first.
pub fn touch_model(config: &mut LauncherConfig, provider_id: &str, model_id: &str) {
    config
        .model_metadata
        .insert(model_key(provider_id, model_id), now_millis());
}

/// Drops every `modelMetadata` entry belonging to `provider_id`, or just one model of it.
pub fn forget_models(config: &mut LauncherConfig, provider_id: &str, model_id: Option<&str>) {
    match model_id {
        Some(model_id) => {
            config.model_metadata.remove(&model_key(provider_id, model_id));
        }
        None => {
            let prefix = format!("{provider_id}/");
            config.model_metadata.retain(|key, _| !key.starts_with(&prefix));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = load_or_initialize(&path).unwrap();

        assert_eq!(config, LauncherConfig::default());
        assert!(path.is_file());
    }

    #[test]
    fn update_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        update(&path, |c| {
            c.nodejs_extracted = true;
            c.work_dir = "/tmp/work".to_string();
        })
        .unwrap();

        let reloaded = load_or_initialize(&path).unwrap();
        assert!(reloaded.nodejs_extracted);
        assert_eq!(reloaded.work_dir, "/tmp/work");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_or_initialize(&path), Err(LauncherError::Json { .. })));
    }

    #[test]
    fn forgetting_a_provider_drops_all_its_models() {
        let mut config = LauncherConfig::default();
        touch_model(&mut config, "a", "m1");
        touch_model(&mut config, "a", "m2");
        touch_model(&mut config, "ab", "m1");

        forget_models(&mut config, "a", None);

        assert_eq!(config.model_metadata.keys().collect::<Vec<_>>(), vec!["ab/m1"]);
    }
}
