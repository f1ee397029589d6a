// Public model catalog (models.dev). Used to pre-fill provider entries so users don't have to
// type base URLs, SDK package names and model ids by hand.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::log_debug;
use crate::schemas::catalog::{CatalogModel, CatalogProvider};
use serde_json::Value;
use std::time::Duration;

pub const CATALOG_URL: &str = "https://models.dev/api.json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads and parses the catalog.
pub fn fetch_catalog() -> LauncherResult<Vec<CatalogProvider>> {
    let agent = ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("opencode-launcher/", env!("CARGO_PKG_VERSION")))
        .build();

    log_debug!("[Catalog] GET {}", CATALOG_URL);
    let response = agent
        .get(CATALOG_URL)
        .call()
        .map_err(|e| LauncherError::Http(e.to_string()))?;
    let body: Value = response
        .into_json()
        .map_err(|e| LauncherError::Http(format!("invalid catalog body: {e}")))?;

    let providers = parse_catalog(&body);
    log_debug!("[Catalog] {} providers", providers.len());
    Ok(providers)
}

/// Turns the catalog document (`{providerId: {name, api, npm, models: {modelId: {name}}}}`)
/// into providers sorted by id. Entries that aren't objects are skipped.
pub fn parse_catalog(body: &Value) -> Vec<CatalogProvider> {
    let Some(entries) = body.as_object() else {
        return Vec::new();
    };

    let mut providers: Vec<CatalogProvider> = entries
        .iter()
        .filter_map(|(key, entry)| {
            let entry = entry.as_object()?;
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or(key.as_str())
                .to_string();
            let text = |field: &str| entry.get(field).and_then(Value::as_str).map(str::to_string);

            let mut models: Vec<CatalogModel> = entry
                .get("models")
                .and_then(Value::as_object)
                .map(|models| {
                    models
                        .iter()
                        .filter(|(_, model)| model.is_object())
                        .map(|(model_key, model)| {
                            let model_id = model
                                .get("id")
                                .and_then(Value::as_str)
                                .unwrap_or(model_key.as_str())
                                .to_string();
                            let name = model
                                .get("name")
                                .and_then(Value::as_str)
                                .map(str::to_string)
                                .unwrap_or_else(|| model_id.clone());
                            CatalogModel { id: model_id, name }
                        })
                        .collect()
                })
                .unwrap_or_default();
            models.sort_by(|a, b| a.id.cmp(&b.id));

            Some(CatalogProvider {
                name: text("name").unwrap_or_else(|| id.clone()),
                api: text("api"),
                npm: text("npm"),
                id,
                models,
            })
        })
        .collect();

    providers.sort_by(|a, b| a.id.cmp(&b.id));
    providers
}

/// Looks up `id` in an already fetched catalog.
pub fn find_provider<'a>(catalog: &'a [CatalogProvider], id: &str) -> LauncherResult<&'a CatalogProvider> {
    catalog
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| LauncherError::UnknownProvider(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "zai": {
                "id": "zai",
                "name": "Z.AI",
                "api": "https://api.z.ai/api/paas/v4",
                "npm": "@ai-sdk/openai-compatible",
                "env": ["ZHIPU_API_KEY"],
                "models": {
                    "glm-4.6": { "id": "glm-4.6", "name": "GLM-4.6", "limit": { "context": 204800 } },
                    "glm-4.5": { "id": "glm-4.5" }
                }
            },
            "anthropic": {
                "name": "Anthropic",
                "npm": "@ai-sdk/anthropic",
                "models": {}
            },
            "broken": "not an object"
        })
    }

    #[test]
    fn providers_and_models_are_sorted() {
        let catalog = parse_catalog(&sample());

        assert_eq!(
            catalog.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["anthropic", "zai"]
        );
        let zai = &catalog[1];
        assert_eq!(zai.api.as_deref(), Some("https://api.z.ai/api/paas/v4"));
        assert_eq!(zai.models[0].id, "glm-4.5");
        assert_eq!(zai.models[0].name, "glm-4.5");
        assert_eq!(zai.models[1].name, "GLM-4.6");
    }

    #[test]
    fn missing_id_falls_back_to_key() {
        let catalog = parse_catalog(&sample());
        let anthropic = find_provider(&catalog, "anthropic").unwrap();
        assert_eq!(anthropic.name, "Anthropic");
        assert_eq!(anthropic.api, None);
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let catalog = parse_catalog(&sample());
        assert!(matches!(
            find_provider(&catalog, "nope"),
            Err(LauncherError::UnknownProvider(_))
        ));
    }

    #[test]
    fn non_object_body_is_empty() {
        assert!(parse_catalog(&json!([1, 2])).is_empty());
    }
}
