use std::fmt;
use std::str::FromStr;

/// A `provider/model` pair as typed on the command line.
/// Only the first `/` separates; model ids such as `anthropic/claude-sonnet-4` keep theirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

impl FromStr for ModelRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok(ModelRef {
                provider: provider.to_string(),
                model: model.to_string(),
            }),
            _ => Err(format!(
                "Invalid model reference '{s}'. Expected <provider>/<model>"
            )),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// A model to seed a provider with: `id` or `id=Display Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub id: String,
    pub name: Option<String>,
}

impl FromStr for ModelSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, name) = match s.split_once('=') {
            Some((id, name)) => (id.trim(), Some(name.trim().to_string()).filter(|n| !n.is_empty())),
            None => (s.trim(), None),
        };
        if id.is_empty() {
            return Err(format!("Invalid model '{s}'. Expected <id> or <id>=<name>"));
        }
        Ok(ModelSpec {
            id: id.to_string(),
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ref_parses_and_displays() {
        let r: ModelRef = "openrouter/anthropic/claude".parse().unwrap();
        assert_eq!(r.provider, "openrouter");
        assert_eq!(r.model, "anthropic/claude");
        assert_eq!(r.to_string(), "openrouter/anthropic/claude");
        assert!("nomodel".parse::<ModelRef>().is_err());
        assert!("/x".parse::<ModelRef>().is_err());
    }

    #[test]
    fn model_spec_optional_name() {
        assert_eq!(
            "gpt-4.1=GPT 4.1".parse::<ModelSpec>().unwrap(),
            ModelSpec {
                id: "gpt-4.1".to_string(),
                name: Some("GPT 4.1".to_string())
            }
        );
        assert_eq!("o3".parse::<ModelSpec>().unwrap().name, None);
        assert!("=x".parse::<ModelSpec>().is_err());
    }
}
