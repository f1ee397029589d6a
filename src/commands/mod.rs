// Register application subcommands.
// Each module corresponds to a specific `opencode-launcher` command-line action.
//
// Every handler returns `anyhow::Result<Value>`: the `Value` is the command's data payload.
// `report` is the single place where a failure becomes a flat `{success:false, error}`
// outcome; nothing below this layer prints errors or decides exit codes.

use crate::libs::paths::LauncherPaths;
use crate::log_error;
use serde::Serialize;
use serde_json::Value;

// Manage the API key in opencode's auth.json.
pub mod auth;
// Browse the public model catalog.
pub mod catalog;
// Show and edit the launcher's config.json.
pub mod config;
// Install, upgrade and uninstall opencode through the private npm.
pub mod install;
// Open opencode in a terminal window.
pub mod launch;
// Manage providers and models in opencode.json.
pub mod models;
// Read and set the npm registry.
pub mod registry;
// Wipe the private runtime and tool install.
pub mod reset;
// Extract the bundled Node.js runtime.
pub mod setup;
// Skills CLI passthrough.
pub mod skills;
// Report what is installed.
pub mod status;
// Watch opencode.json for external edits.
pub mod watch;

/// Shared by every handler.
pub struct CommandContext {
    pub paths: LauncherPaths,
    /// Machine-readable mode: handlers skip tables and prompts.
    pub json: bool,
}

pub type CommandResult = anyhow::Result<Value>;

/// `{success, error?, data?}` printed on stdout in `--json` mode.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Outcome {
    pub fn from_result(result: CommandResult) -> Self {
        match result {
            Ok(data) => Outcome {
                success: true,
                error: None,
                data: (!data.is_null()).then_some(data),
            },
            Err(e) => Outcome {
                success: false,
                // `{:#}` keeps the context chain on one line: "while X: cause".
                error: Some(format!("{e:#}")),
                data: None,
            },
        }
    }
}

/// Converts a handler result into output and a process exit code.
pub fn report(json: bool, result: CommandResult) -> i32 {
    let outcome = Outcome::from_result(result);
    let code = if outcome.success { 0 } else { 1 };

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{text}"),
            Err(e) => log_error!("Could not serialize outcome: {}", e),
        }
    } else if let Some(error) = &outcome.error {
        log_error!("{}", error);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::json;

    #[test]
    fn success_carries_data() {
        let outcome = Outcome::from_result(Ok(json!({"port": 4096})));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "data": {"port": 4096}})
        );
    }

    #[test]
    fn null_data_is_omitted() {
        let outcome = Outcome::from_result(Ok(Value::Null));
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"success": true}));
    }

    #[test]
    fn failure_flattens_context_chain() {
        let result: CommandResult =
            Err::<Value, _>(std::io::Error::other("disk full")).context("Failed to save config.json");
        let outcome = Outcome::from_result(result);
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Failed to save config.json: disk full")
        );
        assert_eq!(report(true, Err(anyhow::anyhow!("boom"))), 1);
    }
}
