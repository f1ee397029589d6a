//! # opencode Credentials (`auth.json`)
//!
//! One API key stored under a fixed provider namespace:
//!
//! ```json
//! { "opencode": { "type": "api", "key": "sk-..." } }
//! ```

use serde::{Deserialize, Serialize};

/// Provider namespace the launcher stores its key under.
pub const DEFAULT_AUTH_NAMESPACE: &str = "opencode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredential {
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
}

impl ApiCredential {
    pub fn api(key: impl Into<String>) -> Self {
        Self {
            kind: "api".to_string(),
            key: key.into(),
        }
    }

    /// First and last four characters with the middle hidden; short keys are fully hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(ApiCredential::api("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "api", "key": "abc"}));
    }

    #[test]
    fn masks_middle_of_key() {
        assert_eq!(ApiCredential::api("sk-123456789").masked_key(), "sk-1****6789");
        assert_eq!(ApiCredential::api("short").masked_key(), "*****");
    }
}
