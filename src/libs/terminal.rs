//! # Terminal Launcher
//!
//! Opens opencode in a new OS terminal window, either interactive (`opencode`) or as a local
//! web server (`opencode web --port N --hostname 127.0.0.1`). The web server is only ever
//! bound to loopback.
//!
//! The launcher hands a command to the platform's "open a terminal and run this" facility and
//! returns. It keeps no handle on the resulting process: it can't observe its exit or stop it.
//!
//! - **macOS**: a temporary shell script run through `osascript` / Terminal.app.
//! - **Linux**: the same script run through `$TERMINAL -e` (default `x-terminal-emulator`).
//! - **Windows**: an inline `start ... cmd /k "..."` line.
//!
//! Temporary scripts are deleted [`SCRIPT_CLEANUP_DELAY`] after the terminal-open call
//! returns, whether or not the new shell has read them yet.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::paths::LauncherPaths;
use crate::libs::utilities::platform::detect_os;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Host passed to `opencode web`.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

pub const SCRIPT_CLEANUP_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Interactive,
    Web { port: u16 },
}

impl LaunchMode {
    fn title(&self) -> &'static str {
        match self {
            LaunchMode::Interactive => "OpenCode TUI",
            LaunchMode::Web { .. } => "OpenCode Web",
        }
    }

    fn script_prefix(&self) -> &'static str {
        match self {
            LaunchMode::Interactive => "opencode-tui-",
            LaunchMode::Web { .. } => "opencode-web-",
        }
    }

    /// Arguments passed to opencode.
    pub fn tool_args(&self) -> Vec<String> {
        match self {
            LaunchMode::Interactive => Vec::new(),
            LaunchMode::Web { port } => vec![
                "web".to_string(),
                "--port".to_string(),
                port.to_string(),
                "--hostname".to_string(),
                LOOPBACK_HOST.to_string(),
            ],
        }
    }
}

/// Everything needed to render the launch command.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub work_dir: PathBuf,
    /// Prepended to PATH so opencode's `#!/usr/bin/env node` shim finds the private runtime.
    pub runtime_bin: PathBuf,
    pub tool: PathBuf,
    pub mode: LaunchMode,
}

impl LaunchRequest {
    pub fn new(paths: &LauncherPaths, work_dir: &Path, mode: LaunchMode) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            runtime_bin: paths.runtime_bin_dir(),
            tool: paths.tool_executable(),
            mode,
        }
    }
}

/// What `launch` left behind. Join the cleanup before exiting so the script is removed.
#[derive(Debug)]
pub struct LaunchHandle {
    pub script: Option<PathBuf>,
    cleanup: Option<thread::JoinHandle<()>>,
}

impl LaunchHandle {
    pub fn wait_for_cleanup(self) {
        if let Some(cleanup) = self.cleanup {
            let _ = cleanup.join();
        }
    }
}

/// Quotes `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Script run by the new terminal on macOS and Linux.
pub fn render_posix_script(request: &LaunchRequest) -> String {
    let mut invocation = shell_quote(&request.tool.display().to_string());
    for arg in request.mode.tool_args() {
        invocation.push(' ');
        invocation.push_str(&arg);
    }
    format!(
        "#!/bin/bash\ncd {} || exit 1\nexport PATH={}:\"$PATH\"\n{}\n",
        shell_quote(&request.work_dir.display().to_string()),
        shell_quote(&request.runtime_bin.display().to_string()),
        invocation
    )
}

/// Command line handed to `cmd /C` on Windows.
pub fn render_windows_command(request: &LaunchRequest) -> String {
    let mut invocation = format!("\"{}\"", request.tool.display());
    for arg in request.mode.tool_args() {
        invocation.push(' ');
        invocation.push_str(&arg);
    }
    format!(
        "start \"{}\" /MAX cmd /k \"cd /d \"{}\" && set PATH={};%PATH% && {}\"",
        request.mode.title(),
        request.work_dir.display(),
        request.runtime_bin.display(),
        invocation
    )
}

/// AppleScript that opens Terminal.app on `script`.
pub fn render_applescript(script: &Path) -> [String; 2] {
    let command = shell_quote(&script.display().to_string())
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    [
        format!("tell application \"Terminal\" to do script \"{command}\""),
        "tell application \"Terminal\" to activate".to_string(),
    ]
}

/// Opens a terminal running opencode for `request`.
pub fn launch(request: &LaunchRequest) -> LauncherResult<LaunchHandle> {
    if !request.work_dir.is_dir() {
        return Err(LauncherError::MissingFile {
            what: "Work directory",
            path: request.work_dir.clone(),
        });
    }
    if !request.tool.is_file() {
        return Err(LauncherError::MissingFile {
            what: "opencode executable",
            path: request.tool.clone(),
        });
    }

    log_info!(
        "[Launcher] Opening {} in {}",
        request.mode.title().bold(),
        request.work_dir.display().to_string().cyan()
    );

    match detect_os().as_str() {
        "windows" => launch_windows(request),
        "macos" => {
            let script = write_script(request)?;
            let [tell, activate] = render_applescript(&script);
            let output = Command::new("osascript")
                .args(["-e", tell.as_str(), "-e", activate.as_str()])
                .output();
            if let Err(e) = check_terminal_output("osascript", output) {
                let _ = fs::remove_file(&script);
                return Err(e);
            }
            Ok(with_cleanup(script))
        }
        other => {
            let script = write_script(request)?;
            let terminal = std::env::var("TERMINAL").unwrap_or_else(|_| "x-terminal-emulator".to_string());
            log_debug!("[Launcher] Using terminal '{}' on {}", terminal, other);
            Command::new(&terminal).arg("-e").arg(&script).spawn()?;
            Ok(with_cleanup(script))
        }
    }
}

fn with_cleanup(script: PathBuf) -> LaunchHandle {
    let cleanup = schedule_removal(script.clone(), SCRIPT_CLEANUP_DELAY);
    LaunchHandle {
        script: Some(script),
        cleanup: Some(cleanup),
    }
}

/// A terminal helper that exits non-zero means no window was opened.
fn check_terminal_output(tool: &str, output: std::io::Result<std::process::Output>) -> LauncherResult<()> {
    let output = output?;
    if output.status.success() {
        return Ok(());
    }
    log_warn!("[Launcher] {} exited with {:?}", tool, output.status.code());
    Err(LauncherError::CommandFailed {
        command: tool.to_string(),
        code: output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string()),
        output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn write_script(request: &LaunchRequest) -> LauncherResult<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(request.mode.script_prefix())
        .suffix(".sh")
        .tempfile()?;
    file.write_all(render_posix_script(request).as_bytes())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    log_debug!("[Launcher] Wrote launch script {}", path.display());
    Ok(path)
}

/// Deletes `path` after `delay` on a background thread. Errors are ignored.
pub fn schedule_removal(path: PathBuf, delay: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = fs::remove_file(&path);
    })
}

#[cfg(windows)]
fn launch_windows(request: &LaunchRequest) -> LauncherResult<LaunchHandle> {
    use std::os::windows::process::CommandExt;

    let line = render_windows_command(request);
    log_debug!("[Launcher] cmd /C {}", line);
    let status = Command::new("cmd").arg("/C").raw_arg(&line).status();
    report_terminal_status("cmd", status);
    Ok(LaunchHandle {
        script: None,
        cleanup: None,
    })
}

#[cfg(not(windows))]
fn launch_windows(request: &LaunchRequest) -> LauncherResult<LaunchHandle> {
    log_debug!("[Launcher] Windows launch requested off-Windows: {}", render_windows_command(request));
    Err(LauncherError::UnsupportedPlatform {
        os: "windows".to_string(),
        arch: std::env::consts::ARCH.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn failed_terminal_helper_is_an_error() {
        let failed = Command::new("sh").args(["-c", "echo 'not authorized' >&2; exit 1"]).output();
        let err = check_terminal_output("osascript", failed).unwrap_err();
        assert!(matches!(
            err,
            LauncherError::CommandFailed { ref command, ref code, ref output }
                if command == "osascript" && code == "1" && output == "not authorized"
        ));

        let ok = Command::new("sh").args(["-c", "exit 0"]).output();
        assert!(check_terminal_output("osascript", ok).is_ok());
    }

    fn request(mode: LaunchMode) -> LaunchRequest {
        LaunchRequest {
            work_dir: PathBuf::from("/home/me/my project"),
            runtime_bin: PathBuf::from("/data/nodejs/bin"),
            tool: PathBuf::from("/data/opencode/bin/opencode"),
            mode,
        }
    }

    #[test]
    fn interactive_script_runs_tool_without_args() {
        let script = render_posix_script(&request(LaunchMode::Interactive));
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("cd '/home/me/my project' || exit 1"));
        assert!(script.contains("export PATH='/data/nodejs/bin':\"$PATH\""));
        assert!(script.trim_end().ends_with("'/data/opencode/bin/opencode'"));
        assert!(!script.contains(" web"));
    }

    #[test]
    fn web_mode_binds_loopback_only() {
        let script = render_posix_script(&request(LaunchMode::Web { port: 4123 }));
        assert!(script.contains("'/data/opencode/bin/opencode' web --port 4123 --hostname 127.0.0.1"));
        assert!(!script.contains("0.0.0.0"));

        let line = render_windows_command(&request(LaunchMode::Web { port: 4123 }));
        assert!(line.contains("--hostname 127.0.0.1"));
        assert!(line.starts_with("start \"OpenCode Web\" /MAX cmd /k"));
        assert!(line.contains("set PATH=/data/nodejs/bin;%PATH%"));
    }

    #[test]
    fn single_quotes_are_escaped() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn applescript_escapes_embedded_quotes() {
        let [tell, activate] = render_applescript(Path::new("/tmp/opencode-tui-1.sh"));
        assert_eq!(
            tell,
            "tell application \"Terminal\" to do script \"'/tmp/opencode-tui-1.sh'\""
        );
        assert_eq!(activate, "tell application \"Terminal\" to activate");
    }

    #[test]
    fn launch_rejects_missing_work_dir() {
        let err = launch(&request(LaunchMode::Interactive)).unwrap_err();
        assert!(matches!(err, LauncherError::MissingFile { what: "Work directory", .. }));
    }

    #[test]
    fn scheduled_removal_deletes_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("opencode-tui-test.sh");
        fs::write(&script, "#!/bin/bash\n").unwrap();

        schedule_removal(script.clone(), Duration::from_millis(10))
            .join()
            .unwrap();

        assert!(!script.exists());
    }
}
