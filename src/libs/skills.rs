// Skills sub-ecosystem. Runs `npx --yes skills <sub>` through the private runtime and turns
// whatever it prints into `SkillRecord`s.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::npm::{CapturedOutput, Npm};
use crate::libs::output_parser::parse_skill_output;
use crate::schemas::skills::SkillRecord;
use crate::{log_debug, log_info};
use serde::Serialize;

/// npm package providing the `skills` CLI.
pub const SKILLS_PACKAGE: &str = "skills";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillsAction {
    /// Install a skill from `owner/repo` or `owner/repo@skill`.
    Add { source: String, global: bool },
    List { json: bool },
    Find { query: String },
    Check,
    Update,
}

impl SkillsAction {
    pub fn label(&self) -> &'static str {
        match self {
            SkillsAction::Add { .. } => "skills add",
            SkillsAction::List { .. } => "skills list",
            SkillsAction::Find { .. } => "skills find",
            SkillsAction::Check => "skills check",
            SkillsAction::Update => "skills update",
        }
    }

    /// Arguments for `npx-cli.js`.
    pub fn npx_args(&self) -> Vec<String> {
        let mut args = vec!["--yes".to_string(), SKILLS_PACKAGE.to_string()];
        match self {
            SkillsAction::Add { source, global } => {
                args.extend(["add".to_string(), source.clone(), "-y".to_string()]);
                if *global {
                    args.push("-g".to_string());
                }
            }
            SkillsAction::List { json } => {
                args.push("list".to_string());
                if *json {
                    args.push("--json".to_string());
                }
            }
            SkillsAction::Find { query } => {
                args.extend(["find".to_string(), query.clone()]);
            }
            SkillsAction::Check => args.push("check".to_string()),
            SkillsAction::Update => args.push("update".to_string()),
        }
        args
    }
}

/// Parsed records plus the raw stdout they came from.
#[derive(Debug, Clone, Serialize)]
pub struct SkillsReport {
    pub records: Vec<SkillRecord>,
    pub raw: String,
}

pub fn run(npm: &Npm<'_>, action: &SkillsAction) -> LauncherResult<SkillsReport> {
    if let SkillsAction::List { json: true } = action {
        return list(npm);
    }
    let output = npm.npx(&action.npx_args())?;
    into_report(action.label(), output)
}

/// `list --json` first; older CLIs reject the flag, so retry in text mode on failure.
fn list(npm: &Npm<'_>) -> LauncherResult<SkillsReport> {
    let json = SkillsAction::List { json: true };
    match npm.npx(&json.npx_args()) {
        Ok(output) if output.success => return into_report(json.label(), output),
        Ok(output) => log_debug!("[Skills] list --json exited with {:?}, retrying as text", output.code),
        Err(e) => return Err(e),
    }
    let text = SkillsAction::List { json: false };
    into_report(text.label(), npm.npx(&text.npx_args())?)
}

fn into_report(label: &str, output: CapturedOutput) -> LauncherResult<SkillsReport> {
    if !output.success {
        let mut combined = output.stdout;
        combined.push_str(&output.stderr);
        return Err(LauncherError::CommandFailed {
            command: label.to_string(),
            code: output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            output: combined.trim().to_string(),
        });
    }
    let records = parse_skill_output(&output.stdout);
    log_info!("[Skills] {} returned {} entries", label, records.len());
    Ok(SkillsReport {
        records,
        raw: output.stdout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::paths::LauncherPaths;
    use std::path::Path;

    fn scratch_paths(root: &Path) -> LauncherPaths {
        LauncherPaths::rooted(&root.join("data"), &root.join("res"), &root.join("home"))
    }

    #[test]
    fn add_passes_source_and_skips_prompts() {
        let args = SkillsAction::Add {
            source: "vercel-labs/agent-skills".to_string(),
            global: true,
        }
        .npx_args();
        assert_eq!(
            args,
            ["--yes", "skills", "add", "vercel-labs/agent-skills", "-y", "-g"].map(String::from)
        );
    }

    #[test]
    fn list_json_flag() {
        assert_eq!(
            SkillsAction::List { json: true }.npx_args().last().map(String::as_str),
            Some("--json")
        );
        assert_eq!(
            SkillsAction::List { json: false }.npx_args().last().map(String::as_str),
            Some("list")
        );
    }

    #[test]
    fn missing_runtime_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let paths = scratch_paths(root.path());
        let err = run(&Npm::new(&paths), &SkillsAction::Check).unwrap_err();
        assert!(matches!(err, LauncherError::MissingFile { .. }));
    }

    #[cfg(unix)]
    fn fake_npx(paths: &LauncherPaths, body: &str) {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let node = paths.node_executable();
        fs::create_dir_all(node.parent().unwrap()).unwrap();
        fs::write(&node, format!("#!/bin/sh\nshift\n{body}\n")).unwrap();
        fs::set_permissions(&node, fs::Permissions::from_mode(0o755)).unwrap();
        for cli in [paths.npm_cli(), paths.npx_cli()] {
            fs::create_dir_all(cli.parent().unwrap()).unwrap();
            fs::write(&cli, "// stub").unwrap();
        }
    }

    #[cfg(unix)]
    #[test]
    fn list_falls_back_to_text_when_json_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let paths = scratch_paths(root.path());
        fake_npx(
            &paths,
            r#"case "$*" in
  *--json*) echo "error: unknown option '--json'" >&2; exit 1 ;;
  *) echo "anthropics/skills@pdf" ;;
esac"#,
        );

        let report = run(&Npm::new(&paths), &SkillsAction::List { json: true }).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "anthropics/skills@pdf");
    }

    #[cfg(unix)]
    #[test]
    fn failure_carries_output() {
        let root = tempfile::tempdir().unwrap();
        let paths = scratch_paths(root.path());
        fake_npx(&paths, "echo 'network down' >&2; exit 3");

        let err = run(&Npm::new(&paths), &SkillsAction::Update).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("skills update"), "{message}");
        assert!(message.contains("network down"), "{message}");
    }
}
