//! # Launcher Configuration (`config.json`)
//!
//! Flat settings record kept in the launcher's data directory. Read whole, mutated in memory,
//! rewritten whole after every change.
//!
//! ```json
//! {
//!   "npmRegistry": "https://registry.npmmirror.com/",
//!   "workDir": "/Users/me/projects/app",
//!   "webPort": 4096,
//!   "nodejsExtracted": true,
//!   "opencodeInstalled": true,
//!   "modelMetadata": { "anthropic/claude-sonnet-4": 1760000000000 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port `opencode web` binds to when none was chosen.
pub const DEFAULT_WEB_PORT: u16 = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LauncherConfig {
    /// Registry last set through the launcher. Empty when never set.
    pub npm_registry: String,
    /// Working directory opencode is launched in. Empty when never chosen.
    pub work_dir: String,
    pub web_port: u16,
    /// Persisted claim that the runtime was extracted; cross-checked against disk.
    pub nodejs_extracted: bool,
    /// Persisted claim that opencode was installed; cross-checked against disk.
    pub opencode_installed: bool,
    /// `provider/model` → last-touched time in epoch milliseconds. Only used for list ordering.
    pub model_metadata: BTreeMap<String, i64>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            npm_registry: String::new(),
            work_dir: String::new(),
            web_port: DEFAULT_WEB_PORT,
            nodejs_extracted: false,
            opencode_installed: false,
            model_metadata: BTreeMap::new(),
        }
    }
}

/// Key used in `modelMetadata` and in opencode's `model` field.
pub fn model_key(provider_id: &str, model_id: &str) -> String {
    format!("{provider_id}/{model_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: LauncherConfig =
            serde_json::from_str(r#"{"npmRegistry":"https://r/","nodejsExtracted":true}"#).unwrap();
        assert_eq!(config.npm_registry, "https://r/");
        assert!(config.nodejs_extracted);
        assert!(!config.opencode_installed);
        assert_eq!(config.web_port, DEFAULT_WEB_PORT);
        assert!(config.model_metadata.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut config = LauncherConfig::default();
        config.model_metadata.insert(model_key("openai", "gpt-4.1"), 7);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["webPort"], 4096);
        assert_eq!(json["opencodeInstalled"], false);
        assert_eq!(json["modelMetadata"]["openai/gpt-4.1"], 7);
    }
}
