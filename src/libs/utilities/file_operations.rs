use crate::log_debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Expands a leading `~` in a user-supplied path.
pub fn expand_user_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Writes `contents` to `path` by writing a sibling temp file and renaming it over the target,
/// so a crash mid-write never leaves a truncated JSON document behind.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path)?;
    log_debug!("[Files] Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Copies every entry under `src` into `dest`, creating directories as needed and copying
/// files byte-for-byte. Existing files in `dest` are overwritten.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Removes a directory tree if present. Returns whether anything was removed.
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
        log_debug!("[Files] Removed {}", dir.display());
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Removes a single file, treating a missing file as already removed. Returns whether it existed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            log_debug!("[Files] Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parents_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/config.json");

        write_atomic(&target, b"{\"a\":1}").unwrap();
        write_atomic(&target, b"{\"a\":2}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"a\":2}");
        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn recursive_copy_preserves_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::write(src.path().join("top.txt"), b"top").unwrap();
        fs::write(src.path().join("a/b/deep.txt"), b"deep").unwrap();

        copy_dir_recursive(src.path(), dest.path()).unwrap();

        assert_eq!(fs::read(dest.path().join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dest.path().join("a/b/deep.txt")).unwrap(), b"deep");
    }

    #[test]
    fn tilde_is_expanded() {
        let expanded = expand_user_path("~/work");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("work"));
        }
        assert_eq!(expand_user_path("/abs/path"), PathBuf::from("/abs/path"));
    }
}
