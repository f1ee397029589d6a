use serde::Serialize;

/// One skill as reported by the skills CLI, normalized from JSON or text output.
///
/// `description` holds the human description when the CLI prints one, or the skill's URL for
/// `owner/repo@skill` listings. `path` is set for installed skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SkillRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
