// Reads, patches and rewrites opencode's `opencode.json`.
//
// The document is rewritten whole. To avoid silently discarding edits made by opencode (or a
// second launcher) between load and save, every load records a SHA-256 fingerprint of the
// bytes read and every save re-reads the file and compares. A mismatch is refused with
// `ConcurrentModification` unless the caller forces the write.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::utilities::file_operations::write_atomic;
use crate::schemas::launcher_config::model_key;
use crate::schemas::tool_config::ToolConfig;
use crate::{log_debug, log_info};
use colored::Colorize;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Template shipped inside the binary, used when the resources directory has none.
pub const EMBEDDED_TEMPLATE: &[u8] = include_bytes!("../../resources/opencode.example.json");

/// `opencode.json` as loaded, plus what it looked like on disk at load time.
#[derive(Debug, Clone)]
pub struct ToolConfigDocument {
    pub path: PathBuf,
    pub config: ToolConfig,
    /// SHA-256 of the bytes read; `None` when the file didn't exist.
    fingerprint: Option<String>,
}

impl ToolConfigDocument {
    /// Loads the document. A missing file yields an empty config.
    pub fn load(path: &Path) -> LauncherResult<Self> {
        let (config, fingerprint) = match fs::read(path) {
            Ok(bytes) => {
                let config = serde_json::from_slice(&bytes).map_err(|source| LauncherError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
                (config, Some(fingerprint(&bytes)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (ToolConfig::default(), None),
            Err(e) => return Err(e.into()),
        };
        log_debug!("[ToolConfig] Loaded {} (fingerprint {:?})", path.display(), fingerprint);
        Ok(Self {
            path: path.to_path_buf(),
            config,
            fingerprint,
        })
    }

    /// True if the file on disk no longer matches what was loaded.
    pub fn changed_on_disk(&self) -> LauncherResult<bool> {
        Ok(current_fingerprint(&self.path)? != self.fingerprint)
    }

    /// Writes the document back. Refuses if it changed on disk since `load`, unless `force`.
    pub fn save(&mut self, force: bool) -> LauncherResult<()> {
        if !force && self.changed_on_disk()? {
            return Err(LauncherError::ConcurrentModification {
                path: self.path.clone(),
            });
        }
        let mut json = serde_json::to_string_pretty(&self.config).map_err(|source| LauncherError::Json {
            path: self.path.clone(),
            source,
        })?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        self.fingerprint = Some(fingerprint(json.as_bytes()));
        log_info!("[ToolConfig] Saved {}", self.path.display().to_string().cyan());
        Ok(())
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn current_fingerprint(path: &Path) -> LauncherResult<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(fingerprint(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Copies `template` byte-for-byte to `path`. Refuses to overwrite unless `force`.
pub fn generate_from_template(template: &[u8], path: &Path, force: bool) -> LauncherResult<()> {
    if path.exists() && !force {
        return Err(LauncherError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    write_atomic(path, template)?;
    log_info!("[ToolConfig] Generated {}", path.display().to_string().green());
    Ok(())
}

/// Splits `provider/model`. Only the first `/` separates; model ids may contain more.
pub fn parse_model_reference(reference: &str) -> LauncherResult<(&str, &str)> {
    match reference.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok((provider, model)),
        _ => Err(LauncherError::InvalidModel {
            reference: reference.to_string(),
            reason: "expected <provider>/<model>".to_string(),
        }),
    }
}

/// Fields for creating or updating a provider. `None` leaves an existing value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProviderUpdate {
    pub name: Option<String>,
    pub npm: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub models: Vec<(String, Option<String>)>,
}

/// One configured model, flattened for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub provider_id: String,
    pub provider_name: String,
    pub model_id: String,
    pub model_name: String,
    pub is_default: bool,
    pub last_used: Option<i64>,
}

impl ModelEntry {
    pub fn key(&self) -> String {
        model_key(&self.provider_id, &self.model_id)
    }
}

impl ToolConfig {
    /// Creates `id` or merges `update` into it. Returns `true` if the provider was new.
    pub fn upsert_provider(&mut self, id: &str, update: ProviderUpdate) -> bool {
        let created = !self.provider.contains_key(id);
        let provider = self.provider.entry(id.to_string()).or_default();
        if update.name.is_some() {
            provider.name = update.name;
        }
        if update.npm.is_some() {
            provider.npm = update.npm;
        }
        if update.base_url.is_some() {
            provider.options.base_url = update.base_url;
        }
        if update.api_key.is_some() {
            provider.options.api_key = update.api_key;
        }
        for (model_id, name) in update.models {
            let model = provider.models.entry(model_id).or_default();
            if name.is_some() {
                model.name = name;
            }
        }
        created
    }

    /// Removes a provider. Clears the default model if it pointed there.
    pub fn remove_provider(&mut self, id: &str) -> bool {
        let removed = self.provider.remove(id).is_some();
        if removed && self.default_provider() == Some(id) {
            self.model = None;
        }
        removed
    }

    pub fn add_model(&mut self, provider_id: &str, model_id: &str, name: Option<String>) -> LauncherResult<()> {
        let provider = self
            .provider
            .get_mut(provider_id)
            .ok_or_else(|| LauncherError::UnknownProvider(provider_id.to_string()))?;
        let model = provider.models.entry(model_id.to_string()).or_default();
        if name.is_some() {
            model.name = name;
        }
        Ok(())
    }

    /// Removes one model. Clears the default model if it was this one.
    pub fn remove_model(&mut self, provider_id: &str, model_id: &str) -> LauncherResult<bool> {
        let provider = self
            .provider
            .get_mut(provider_id)
            .ok_or_else(|| LauncherError::UnknownProvider(provider_id.to_string()))?;
        let removed = provider.models.remove(model_id).is_some();
        if removed && self.model.as_deref() == Some(model_key(provider_id, model_id).as_str()) {
            self.model = None;
        }
        Ok(removed)
    }

    /// Points `model` at `provider/model`, which must already be configured.
    pub fn set_default_model(&mut self, reference: &str) -> LauncherResult<()> {
        let (provider_id, model_id) = parse_model_reference(reference)?;
        let provider = self
            .provider
            .get(provider_id)
            .ok_or_else(|| LauncherError::UnknownProvider(provider_id.to_string()))?;
        if !provider.models.contains_key(model_id) {
            return Err(LauncherError::InvalidModel {
                reference: reference.to_string(),
                reason: format!("provider '{provider_id}' has no model '{model_id}'"),
            });
        }
        self.model = Some(reference.to_string());
        Ok(())
    }

    fn default_provider(&self) -> Option<&str> {
        self.model
            .as_deref()
            .and_then(|m| m.split_once('/'))
            .map(|(provider, _)| provider)
    }

    /// Every configured model, most recently touched first (per `metadata`), then by key.
    pub fn model_entries(&self, metadata: &BTreeMap<String, i64>) -> Vec<ModelEntry> {
        let mut entries: Vec<ModelEntry> = self
            .provider
            .iter()
            .flat_map(|(provider_id, provider)| {
                provider.models.iter().map(move |(model_id, model)| {
                    let key = model_key(provider_id, model_id);
                    ModelEntry {
                        provider_id: provider_id.clone(),
                        provider_name: provider.display_name(provider_id).to_string(),
                        model_id: model_id.clone(),
                        model_name: model.name.clone().unwrap_or_else(|| model_id.clone()),
                        is_default: self.model.as_deref() == Some(key.as_str()),
                        last_used: metadata.get(&key).copied(),
                    }
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.last_used
                .unwrap_or(i64::MIN)
                .cmp(&a.last_used.unwrap_or(i64::MIN))
                .then_with(|| a.key().cmp(&b.key()))
        });
        entries
    }
}
