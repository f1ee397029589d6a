//! # Private npm Installer
//!
//! Runs the private runtime's npm (`node npm-cli.js ...`) to manage the opencode package.
//!
//! ## Environment isolation
//!
//! Every child is spawned with `env_clear()` and then exactly the variables in a
//! [`SpawnEnvironment`]: home and temp directories, the private runtime's `bin` directory
//! followed by a short allowlist of system directories, and `npm_config_*` variables pointing
//! at launcher-owned locations. Nothing else leaks in from the invoking shell, so a system-wide
//! npm/node with its own prefix, registry or `.npmrc` can't interfere.
//!
//! No timeouts are applied; a hung npm blocks the calling command until it exits.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::paths::LauncherPaths;
use crate::libs::progress::ProgressSink;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// npm package that provides the `opencode` executable.
pub const TOOL_PACKAGE: &str = "opencode-ai";

/// Returned by [`get_registry`] when npm can't report one.
pub const UNKNOWN_REGISTRY: &str = "unknown";

#[cfg(unix)]
const SYSTEM_PATH_ALLOWLIST: &[&str] = &["/usr/local/bin", "/usr/bin", "/bin", "/usr/sbin", "/sbin"];

/// Fully enumerated environment for one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnEnvironment {
    vars: BTreeMap<String, String>,
}

impl SpawnEnvironment {
    /// Builds the isolated environment for running the private runtime's npm and opencode.
    pub fn for_private_runtime(paths: &LauncherPaths) -> Self {
        let home = dirs::home_dir()
            .map(|h| h.display().to_string())
            .unwrap_or_default();
        let temp = env::temp_dir().display().to_string();

        let mut vars = BTreeMap::new();
        vars.insert("HOME".to_string(), home.clone());
        vars.insert("TMPDIR".to_string(), temp.clone());
        vars.insert("TEMP".to_string(), temp.clone());
        vars.insert("TMP".to_string(), temp);
        vars.insert("PATH".to_string(), Self::search_path(&paths.runtime_bin_dir()));
        vars.insert(
            "npm_config_prefix".to_string(),
            paths.tool_prefix.display().to_string(),
        );
        vars.insert(
            "npm_config_userconfig".to_string(),
            paths.npm_userconfig().display().to_string(),
        );
        vars.insert(
            "npm_config_cache".to_string(),
            paths.npm_cache().display().to_string(),
        );
        vars.insert("npm_config_update_notifier".to_string(), "false".to_string());
        vars.insert("npm_config_fund".to_string(), "false".to_string());

        if cfg!(windows) {
            vars.insert("USERPROFILE".to_string(), home);
            for key in ["SystemRoot", "ComSpec", "APPDATA", "LOCALAPPDATA"] {
                if let Ok(value) = env::var(key) {
                    vars.insert(key.to_string(), value);
                }
            }
        }

        Self { vars }
    }

    /// `PATH` value: the private runtime first, then the system allowlist.
    fn search_path(runtime_bin: &Path) -> String {
        let mut entries: Vec<PathBuf> = vec![runtime_bin.to_path_buf()];
        entries.extend(system_path_allowlist());
        env::join_paths(&entries)
            .map(|joined: OsString| joined.to_string_lossy().into_owned())
            .unwrap_or_else(|_| runtime_bin.display().to_string())
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Applies this environment to `command`, replacing the inherited one entirely.
    pub fn apply(&self, command: &mut Command) {
        command.env_clear().envs(&self.vars);
    }
}

#[cfg(unix)]
fn system_path_allowlist() -> Vec<PathBuf> {
    SYSTEM_PATH_ALLOWLIST.iter().map(PathBuf::from).collect()
}

#[cfg(windows)]
fn system_path_allowlist() -> Vec<PathBuf> {
    let root = PathBuf::from(env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".to_string()));
    vec![
        root.join("System32"),
        root.clone(),
        root.join("System32").join("Wbem"),
        root.join("System32").join("WindowsPowerShell").join("v1.0"),
    ]
}

/// Output of a finished child process.
#[derive(Debug)]
pub struct CapturedOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Handle to the private npm.
pub struct Npm<'a> {
    paths: &'a LauncherPaths,
    environment: SpawnEnvironment,
}

impl<'a> Npm<'a> {
    pub fn new(paths: &'a LauncherPaths) -> Self {
        let environment = SpawnEnvironment::for_private_runtime(paths);
        log_debug!(
            "[Npm] Spawn environment: {}",
            environment.keys().collect::<Vec<_>>().join(", ")
        );
        Self { paths, environment }
    }

    pub fn environment(&self) -> &SpawnEnvironment {
        &self.environment
    }

    /// Fails fast with a descriptive error if the runtime hasn't been provisioned.
    fn ensure_runtime(&self) -> LauncherResult<()> {
        let node = self.paths.node_executable();
        if !node.is_file() {
            return Err(LauncherError::MissingFile {
                what: "Node.js executable",
                path: node,
            });
        }
        let npm_cli = self.paths.npm_cli();
        if !npm_cli.is_file() {
            return Err(LauncherError::MissingFile {
                what: "npm-cli.js",
                path: npm_cli,
            });
        }
        Ok(())
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(self.paths.node_executable());
        command.arg(self.paths.npm_cli()).args(args);
        self.environment.apply(&mut command);
        log_debug!("[Npm] Running npm {}", args.join(" "));
        command
    }

    fn capture(&self, args: &[String]) -> LauncherResult<CapturedOutput> {
        self.ensure_runtime()?;
        let output = self.command(args).stdin(Stdio::null()).output()?;
        Ok(CapturedOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Currently configured registry. Any failure (missing runtime, spawn error, non-zero exit,
    /// empty output) yields [`UNKNOWN_REGISTRY`]; "no registry known" is a normal state.
    pub fn get_registry(&self) -> String {
        match self.capture(&registry_get_args()) {
            Ok(output) if output.success && !output.stdout.trim().is_empty() => {
                output.stdout.trim().to_string()
            }
            Ok(output) => {
                log_debug!("[Npm] config get registry exited with {:?}", output.code);
                UNKNOWN_REGISTRY.to_string()
            }
            Err(e) => {
                log_debug!("[Npm] config get registry unavailable: {}", e);
                UNKNOWN_REGISTRY.to_string()
            }
        }
    }

    /// Sets the registry in the launcher-private npm user config.
    pub fn set_registry(&self, registry: &str) -> LauncherResult<()> {
        let args = registry_set_args(registry);
        let output = self.capture(&args)?;
        if output.success {
            log_info!("[Npm] Registry set to {}", registry.green());
            Ok(())
        } else {
            Err(command_failed("npm config set registry", output.code, output.stderr))
        }
    }

    /// Latest published version of `package`, per `npm view <package> version`.
    pub fn latest_version(&self, package: &str) -> LauncherResult<String> {
        let output = self.capture(&view_version_args(package))?;
        if output.success && !output.stdout.trim().is_empty() {
            Ok(output.stdout.trim().to_string())
        } else {
            Err(command_failed("npm view", output.code, output.stderr))
        }
    }

    /// Installs (or upgrades) `package`, pinned to `version` when given, into the private prefix.
    /// Output lines are forwarded to `sink` as they arrive and returned in full on success.
    pub fn install(&self, package: &str, version: Option<&str>, sink: &dyn ProgressSink) -> LauncherResult<String> {
        let args = install_args(package, version, &self.paths.tool_prefix);
        self.stream(&args, "npm install", sink)
    }

    /// Removes `package` from the private prefix.
    pub fn uninstall(&self, package: &str, sink: &dyn ProgressSink) -> LauncherResult<String> {
        let args = uninstall_args(package, &self.paths.tool_prefix);
        self.stream(&args, "npm uninstall", sink)
    }

    /// Runs the npx entry point under the same isolated environment and captures its output.
    pub fn npx(&self, args: &[String]) -> LauncherResult<CapturedOutput> {
        self.ensure_runtime()?;
        let npx_cli = self.paths.npx_cli();
        if !npx_cli.is_file() {
            return Err(LauncherError::MissingFile {
                what: "npx-cli.js",
                path: npx_cli,
            });
        }
        let mut command = Command::new(self.paths.node_executable());
        command.arg(npx_cli).args(args);
        self.environment.apply(&mut command);
        log_debug!("[Npm] Running npx {}", args.join(" "));

        let output = command.stdin(Stdio::null()).output()?;
        Ok(CapturedOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Spawns npm with piped stdout/stderr, forwards every line to `sink` and accumulates
    /// both streams. A non-zero exit carries the accumulated output in the error.
    fn stream(&self, args: &[String], label: &str, sink: &dyn ProgressSink) -> LauncherResult<String> {
        self.ensure_runtime()?;
        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut output = String::new();
        for line in rx {
            sink.progress(&line);
            output.push_str(&line);
            output.push('\n');
        }
        for reader in readers {
            let _ = reader.join();
        }

        let status = child.wait()?;
        if status.success() {
            Ok(output)
        } else {
            Err(command_failed(label, status.code(), output))
        }
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(stream: R, tx: mpsc::Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

fn command_failed(command: &str, code: Option<i32>, output: String) -> LauncherError {
    LauncherError::CommandFailed {
        command: command.to_string(),
        code: code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()),
        output: output.trim().to_string(),
    }
}

/// `<package>` or `<package>@<version>`.
pub fn install_target(package: &str, version: Option<&str>) -> String {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => format!("{package}@{version}"),
        None => package.to_string(),
    }
}

pub fn install_args(package: &str, version: Option<&str>, prefix: &Path) -> Vec<String> {
    vec![
        "install".to_string(),
        "-g".to_string(),
        install_target(package, version),
        "--prefix".to_string(),
        prefix.display().to_string(),
    ]
}

pub fn uninstall_args(package: &str, prefix: &Path) -> Vec<String> {
    vec![
        "uninstall".to_string(),
        "-g".to_string(),
        package.to_string(),
        "--prefix".to_string(),
        prefix.display().to_string(),
    ]
}

fn registry_get_args() -> Vec<String> {
    ["config", "get", "registry"].map(String::from).to_vec()
}

fn registry_set_args(registry: &str) -> Vec<String> {
    vec![
        "config".to_string(),
        "set".to_string(),
        "registry".to_string(),
        registry.to_string(),
    ]
}

fn view_version_args(package: &str) -> Vec<String> {
    vec!["view".to_string(), package.to_string(), "version".to_string()]
}
