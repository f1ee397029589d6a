use serde::Serialize;

/// A provider entry from the public model catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogProvider {
    pub id: String,
    pub name: String,
    /// OpenAI-compatible base URL, when the catalog lists one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// AI SDK package opencode should load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm: Option<String>,
    pub models: Vec<CatalogModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogModel {
    pub id: String,
    pub name: String,
}
