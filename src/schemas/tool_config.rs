//! # opencode Configuration (`opencode.json`)
//!
//! The schema belongs to opencode; only the parts the launcher edits are modeled. Every
//! struct carries a flattened `extra` map so keys the launcher doesn't know about survive a
//! wholesale rewrite.
//!
//! ```json
//! {
//!   "$schema": "https://opencode.ai/config.json",
//!   "provider": {
//!     "myproxy": {
//!       "npm": "@ai-sdk/openai-compatible",
//!       "name": "My Proxy",
//!       "options": { "baseURL": "https://proxy.example/v1", "apiKey": "{env:PROXY_KEY}" },
//!       "models": { "gpt-4.1": { "name": "GPT-4.1" } }
//!     }
//!   },
//!   "model": "myproxy/gpt-4.1"
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider: BTreeMap<String, ProviderRecord>,
    /// Default model as `providerId/modelId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// AI SDK package opencode loads for this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub options: ProviderOptions,
    #[serde(default)]
    pub models: BTreeMap<String, ModelRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOptions {
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderRecord {
    /// Display name, falling back to the provider id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(id)
    }
}
