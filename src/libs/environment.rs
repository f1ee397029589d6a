// Environment prober: decides whether the private runtime and opencode are usable.
//
// A component counts as present only if the persisted flag in `config.json` says so AND its
// executable exists on disk. A flag left `true` by an interrupted install therefore reads as
// "not present", and the next setup/install repairs it.

use crate::libs::npm::SpawnEnvironment;
use crate::libs::paths::LauncherPaths;
use crate::log_debug;
use crate::schemas::launcher_config::LauncherConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    pub present: bool,
    /// Install location reported to the user.
    pub path: PathBuf,
    /// `-v` output; `None` when absent or when the executable couldn't be run.
    pub version: Option<String>,
}

/// Flag and file must agree.
pub fn is_present(persisted_flag: bool, executable: &Path) -> bool {
    persisted_flag && executable.is_file()
}

pub fn probe_runtime(paths: &LauncherPaths, config: &LauncherConfig) -> ComponentStatus {
    let node = paths.node_executable();
    let present = is_present(config.nodejs_extracted, &node);
    let version = if present {
        read_version(&node, &SpawnEnvironment::for_private_runtime(paths))
    } else {
        None
    };
    ComponentStatus {
        present,
        path: paths.runtime_dir.clone(),
        version,
    }
}

pub fn probe_tool(paths: &LauncherPaths, config: &LauncherConfig) -> ComponentStatus {
    let tool = paths.tool_executable();
    let present = is_present(config.opencode_installed, &tool);
    let version = if present {
        read_version(&tool, &SpawnEnvironment::for_private_runtime(paths))
    } else {
        None
    };
    ComponentStatus {
        present,
        path: paths.tool_prefix.clone(),
        version,
    }
}

/// Runs `<executable> -v` and returns trimmed stdout. Every failure is swallowed.
pub fn read_version(executable: &Path, environment: &SpawnEnvironment) -> Option<String> {
    let mut command = Command::new(executable);
    command.arg("-v").stdin(Stdio::null());
    environment.apply(&mut command);

    match command.output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        Ok(output) => {
            log_debug!(
                "[Environment] {} -v exited with {:?}",
                executable.display(),
                output.status.code()
            );
            None
        }
        Err(e) => {
            log_debug!("[Environment] Could not run {}: {}", executable.display(), e);
            None
        }
    }
}
