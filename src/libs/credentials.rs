// auth.json read/write. The file is rewritten whole; entries for other providers (OAuth
// records written by opencode itself, for instance) are kept as raw JSON.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::utilities::file_operations::write_atomic;
use crate::log_debug;
use crate::schemas::credentials::ApiCredential;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;

/// Reads `auth.json`. Missing file means no credentials.
pub fn load(path: &Path) -> LauncherResult<Map<String, Value>> {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|source| LauncherError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(e.into()),
    }
}

/// API credential stored under `namespace`, if it has the `{type, key}` shape.
pub fn get(path: &Path, namespace: &str) -> LauncherResult<Option<ApiCredential>> {
    let all = load(path)?;
    Ok(all
        .get(namespace)
        .and_then(|value| serde_json::from_value(value.clone()).ok()))
}

/// Stores `credential` under `namespace`, replacing whatever was there.
pub fn set(path: &Path, namespace: &str, credential: &ApiCredential) -> LauncherResult<()> {
    let mut all = load(path)?;
    let value = serde_json::to_value(credential).map_err(|source| LauncherError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    all.insert(namespace.to_string(), value);

    let json = serde_json::to_string_pretty(&all).map_err(|source| LauncherError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, json.as_bytes())?;
    restrict_permissions(path)?;
    log_debug!("[Auth] Stored credential for '{}' in {}", namespace, path.display());
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
