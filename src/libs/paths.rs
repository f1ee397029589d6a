// Resolves every on-disk location the launcher touches: its own data directory
// (launcher config, private runtime, private tool prefix, npm config/cache),
// the bundled resources directory, and the two files owned by opencode itself.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::utilities::file_operations::expand_user_path;
use crate::log_debug;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Directory name under the OS config dir when `--data-dir` is not given.
const DATA_DIR_NAME: &str = "opencode-launcher";

/// Environment overrides for the files opencode owns.
pub const TOOL_CONFIG_ENV: &str = "OPENCODE_CONFIG_FILE";
pub const AUTH_FILE_ENV: &str = "OPENCODE_AUTH_FILE";

/// All resolved locations. Built once in `main` and handed to every command.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    /// Application-owned storage root.
    pub data_dir: PathBuf,
    /// `config.json`, the launcher's own settings.
    pub config_file: PathBuf,
    /// Private Node.js runtime (extracted archive).
    pub runtime_dir: PathBuf,
    /// Global-install prefix for opencode.
    pub tool_prefix: PathBuf,
    /// Bundled resources: runtime archive(s) and the `opencode.json` template.
    pub resources_dir: PathBuf,
    /// opencode's `opencode.json`.
    pub tool_config_file: PathBuf,
    /// opencode's `auth.json`.
    pub auth_file: PathBuf,
}

impl LauncherPaths {
    /// Resolves paths from the CLI flags, falling back to platform defaults.
    pub fn resolve(data_dir: Option<&str>, resources_dir: Option<&str>) -> LauncherResult<Self> {
        let data_dir = match data_dir {
            Some(dir) => expand_user_path(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join(DATA_DIR_NAME))
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "could not determine the user config directory")
                })?,
        };

        let resources_dir = match resources_dir {
            Some(dir) => expand_user_path(dir),
            None => default_resources_dir()?,
        };

        let home = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine the home directory")
        })?;

        let mut paths = Self::rooted(&data_dir, &resources_dir, &home);
        if let Ok(file) = env::var(TOOL_CONFIG_ENV) {
            paths.tool_config_file = expand_user_path(&file);
        }
        if let Ok(file) = env::var(AUTH_FILE_ENV) {
            paths.auth_file = expand_user_path(&file);
        }

        log_debug!("[Paths] Resolved launcher paths: {:#?}", paths);
        Ok(paths)
    }

    /// Lays out every path under explicit roots. `resolve` builds on this; tests use it directly.
    pub fn rooted(data_dir: &Path, resources_dir: &Path, home: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            config_file: data_dir.join("config.json"),
            runtime_dir: data_dir.join("nodejs"),
            tool_prefix: data_dir.join("opencode"),
            resources_dir: resources_dir.to_path_buf(),
            tool_config_file: home.join(".config").join("opencode").join("opencode.json"),
            auth_file: home
                .join(".local")
                .join("share")
                .join("opencode")
                .join("auth.json"),
        }
    }

    /// The `node` executable inside the private runtime.
    pub fn node_executable(&self) -> PathBuf {
        if cfg!(windows) {
            self.runtime_dir.join("node.exe")
        } else {
            self.runtime_dir.join("bin").join("node")
        }
    }

    /// Directory that must lead PATH so `node` and npm shims resolve to the private runtime.
    pub fn runtime_bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.runtime_dir.clone()
        } else {
            self.runtime_dir.join("bin")
        }
    }

    fn npm_bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.runtime_dir.join("node_modules").join("npm").join("bin")
        } else {
            self.runtime_dir
                .join("lib")
                .join("node_modules")
                .join("npm")
                .join("bin")
        }
    }

    /// npm's JS entry point. Run through `node` directly instead of the `npm` shell shim.
    pub fn npm_cli(&self) -> PathBuf {
        self.npm_bin_dir().join("npm-cli.js")
    }

    /// npx's JS entry point, used for the skills CLI.
    pub fn npx_cli(&self) -> PathBuf {
        self.npm_bin_dir().join("npx-cli.js")
    }

    /// The installed opencode executable under the private prefix.
    pub fn tool_executable(&self) -> PathBuf {
        if cfg!(windows) {
            self.tool_prefix.join("opencode.cmd")
        } else {
            self.tool_prefix.join("bin").join("opencode")
        }
    }

    /// npm user config kept inside the data dir so registry changes never touch `~/.npmrc`.
    pub fn npm_userconfig(&self) -> PathBuf {
        self.data_dir.join("npmrc")
    }

    pub fn npm_cache(&self) -> PathBuf {
        self.data_dir.join("npm-cache")
    }

    /// The bundled `opencode.json` template, if the resources directory ships one.
    pub fn bundled_tool_config_template(&self) -> PathBuf {
        self.resources_dir.join("opencode.example.json")
    }

    /// Locates the bundled runtime archive. The development layout keeps the archive under its
    /// original name inside `nodejs_package/`; packaged builds ship it as a bare file named
    /// `nodejs_package` with no extension.
    pub fn bundled_runtime_archive(&self, archive_name: &str) -> LauncherResult<PathBuf> {
        let package_dir = self.resources_dir.join("nodejs_package");
        let named = package_dir.join(archive_name);
        if named.is_file() {
            return Ok(named);
        }
        if package_dir.is_file() {
            return Ok(package_dir);
        }
        Err(LauncherError::MissingFile {
            what: "Bundled Node.js package",
            path: named,
        })
    }
}

fn default_resources_dir() -> LauncherResult<PathBuf> {
    let exe = env::current_exe()?;
    Ok(exe
        .parent()
        .map(|dir| dir.join("resources"))
        .unwrap_or_else(|| PathBuf::from("resources")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn layout_is_rooted_in_data_dir() {
        let paths = LauncherPaths::rooted(Path::new("/data"), Path::new("/res"), Path::new("/home/u"));
        assert_eq!(paths.config_file, Path::new("/data/config.json"));
        assert_eq!(paths.runtime_dir, Path::new("/data/nodejs"));
        assert_eq!(paths.tool_prefix, Path::new("/data/opencode"));
        assert!(paths.npm_cli().starts_with("/data/nodejs"));
        assert!(paths.tool_executable().starts_with("/data/opencode"));
        assert_eq!(
            paths.tool_config_file,
            Path::new("/home/u/.config/opencode/opencode.json")
        );
    }

    #[test]
    fn bundled_archive_prefers_named_file_then_bare_package() {
        let res = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::rooted(Path::new("/data"), res.path(), Path::new("/home/u"));

        assert!(matches!(
            paths.bundled_runtime_archive("node.tar.gz"),
            Err(LauncherError::MissingFile { .. })
        ));

        fs::write(res.path().join("nodejs_package"), b"packaged").unwrap();
        assert_eq!(
            paths.bundled_runtime_archive("node.tar.gz").unwrap(),
            res.path().join("nodejs_package")
        );

        fs::remove_file(res.path().join("nodejs_package")).unwrap();
        fs::create_dir_all(res.path().join("nodejs_package")).unwrap();
        fs::write(res.path().join("nodejs_package/node.tar.gz"), b"dev").unwrap();
        assert_eq!(
            paths.bundled_runtime_archive("node.tar.gz").unwrap(),
            res.path().join("nodejs_package/node.tar.gz")
        );
    }
}
