//! # Runtime Provisioner
//!
//! Copies the platform-matched Node.js distribution out of the bundled resources and unpacks
//! it into the launcher's private runtime directory.
//!
//! ## Layout normalization
//!
//! - **Tarball** (macOS, Linux): entries are unpacked with the archive's root folder stripped,
//!   then every file in `bin/` gets its owner-executable bit forced on.
//! - **Zip** (Windows): unpacked as-is, then the `node-*` root folder is copied up into the
//!   runtime directory and deleted.
//!
//! A failed extraction is not cleaned up. The environment prober reports the runtime as
//! missing on the next check, because `bin/node` (or `node.exe`) won't be there.

use crate::libs::errors::{LauncherError, LauncherResult};
use crate::libs::paths::LauncherPaths;
use crate::libs::progress::ProgressSink;
use crate::libs::utilities::compression::{extract_tar_gz_stripped, extract_zip, flatten_marked_dirs};
use crate::libs::utilities::platform::{detect_architecture, detect_os, normalize_arch, normalize_os};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Node.js release bundled with the launcher.
pub const NODE_VERSION: &str = "22.22.0";

/// Prefix of the root folder inside the Windows zip distributions.
pub const ZIP_ROOT_MARKER: &str = "node-";

/// Bundled archive name for an (os, arch) pair, or `None` when the pair isn't shipped.
/// Inputs are normalized first, so `("darwin", "aarch64")` and `("macos", "arm64")` agree.
pub fn runtime_archive_name(os: &str, arch: &str) -> Option<&'static str> {
    match (normalize_os(os).as_str(), normalize_arch(arch).as_str()) {
        ("macos", "arm64") => Some("node-v22.22.0-darwin-arm64.tar.gz"),
        ("macos", "x86_64") => Some("node-v22.22.0-darwin-x64.tar.gz"),
        ("linux", "x86_64") => Some("node-v22.22.0-linux-x64.tar.gz"),
        ("linux", "arm64") => Some("node-v22.22.0-linux-arm64.tar.gz"),
        ("windows", "arm64") => Some("node-v22.22.0-win-arm64.zip"),
        ("windows", "x86_64") => Some("node-v22.22.0-win-x64.zip"),
        ("windows", "x86") => Some("node-v22.22.0-win-x86.zip"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

/// Picks the archive format from the file extension. The packaged resource has no extension,
/// in which case the host OS decides: zip on Windows, tarball elsewhere.
pub fn detect_archive_format(path: &Path, host_os: &str) -> LauncherResult<ArchiveFormat> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "zip" => Ok(ArchiveFormat::Zip),
        "gz" | "tgz" => Ok(ArchiveFormat::TarGz),
        "" if normalize_os(host_os) == "windows" => Ok(ArchiveFormat::Zip),
        "" => Ok(ArchiveFormat::TarGz),
        other => Err(LauncherError::UnsupportedArchive {
            extension: format!(".{other}"),
            path: path.to_path_buf(),
        }),
    }
}

/// Provisions the private runtime for the host platform. Returns the archive that was used.
pub fn provision_runtime(paths: &LauncherPaths, sink: &dyn ProgressSink) -> LauncherResult<PathBuf> {
    provision_runtime_for(paths, &detect_os(), &detect_architecture(), sink)
}

/// Provisions the runtime for an explicit (os, arch) pair. Unsupported pairs fail before any
/// archive lookup or extraction.
pub fn provision_runtime_for(
    paths: &LauncherPaths,
    os: &str,
    arch: &str,
    sink: &dyn ProgressSink,
) -> LauncherResult<PathBuf> {
    let archive_name = runtime_archive_name(os, arch).ok_or_else(|| LauncherError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    })?;

    let archive = paths.bundled_runtime_archive(archive_name)?;
    log_info!(
        "[Provisioner] Extracting {} into {}",
        archive_name.cyan(),
        paths.runtime_dir.display().to_string().cyan()
    );
    sink.progress(&format!("Using Node.js package {}", archive.display()));

    extract_runtime_archive(&archive, &paths.runtime_dir, os, sink)?;
    log_info!("[Provisioner] Node.js v{} ready", NODE_VERSION.green());
    Ok(archive)
}

/// Unpacks `archive` into `dest` and normalizes the layout for the detected format.
pub fn extract_runtime_archive(
    archive: &Path,
    dest: &Path,
    host_os: &str,
    sink: &dyn ProgressSink,
) -> LauncherResult<()> {
    let format = detect_archive_format(archive, host_os)?;
    fs::create_dir_all(dest)?;
    log_debug!("[Provisioner] {} detected as {:?}", archive.display(), format);

    match format {
        ArchiveFormat::TarGz => {
            sink.progress("Extracting tarball...");
            extract_tar_gz_stripped(archive, dest, sink)?;
            let fixed = ensure_bin_executable(&dest.join("bin"));
            sink.progress(&format!("Marked {fixed} files in bin/ executable"));
        }
        ArchiveFormat::Zip => {
            sink.progress("Extracting zip...");
            extract_zip(archive, dest)?;
            for dir in flatten_marked_dirs(dest, ZIP_ROOT_MARKER)? {
                sink.progress(&format!("Moved {dir}/ contents into place"));
            }
        }
    }
    sink.progress("Extraction complete");
    Ok(())
}

/// Forces the owner-executable bit on every file directly under `bin_dir`. Per-file failures
/// are logged and skipped. Returns how many files were updated. No-op on Windows.
#[cfg(unix)]
pub fn ensure_bin_executable(bin_dir: &Path) -> usize {
    use std::os::unix::fs::PermissionsExt;

    let Ok(entries) = fs::read_dir(bin_dir) else {
        return 0;
    };
    let mut updated = 0;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let result = fs::metadata(&path).and_then(|meta| {
            let mut perms = meta.permissions();
            perms.set_mode(perms.mode() | 0o755);
            fs::set_permissions(&path, perms)
        });
        match result {
            Ok(()) => updated += 1,
            Err(e) => log_warn!("[Provisioner] Could not chmod {}: {}", path.display(), e),
        }
    }
    updated
}

#[cfg(not(unix))]
pub fn ensure_bin_executable(_bin_dir: &Path) -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::progress::RecordingSink;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs::File;

    #[test]
    fn every_supported_pair_maps_to_one_archive() {
        let pairs = [
            ("darwin", "arm64"),
            ("darwin", "x64"),
            ("linux", "x86_64"),
            ("linux", "aarch64"),
            ("win32", "arm64"),
            ("win32", "x64"),
            ("win32", "ia32"),
        ];
        let mut names: Vec<_> = pairs
            .iter()
            .map(|(os, arch)| runtime_archive_name(os, arch).expect("supported pair"))
            .collect();
        assert!(names.iter().all(|n| n.starts_with("node-v22.22.0-")));
        names.sort();
        names.dedup();
        assert_eq!(names.len(), pairs.len());
    }

    #[test]
    fn unsupported_pairs_have_no_archive() {
        assert_eq!(runtime_archive_name("freebsd", "x86_64"), None);
        assert_eq!(runtime_archive_name("macos", "x86"), None);
        assert_eq!(runtime_archive_name("linux", "riscv64"), None);
    }

    #[test]
    fn unsupported_platform_is_rejected_before_extraction() {
        let scratch = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::rooted(
            &scratch.path().join("data"),
            &scratch.path().join("res"),
            &scratch.path().join("home"),
        );
        fs::create_dir_all(paths.resources_dir.join("nodejs_package")).unwrap();
        fs::write(paths.resources_dir.join("nodejs_package/node-v22.22.0-linux-x64.tar.gz"), b"junk").unwrap();
        let sink = RecordingSink::default();

        let err = provision_runtime_for(&paths, "freebsd", "x86_64", &sink);

        assert!(matches!(
            err,
            Err(LauncherError::UnsupportedPlatform { ref os, ref arch }) if os == "freebsd" && arch == "x86_64"
        ));
        assert!(!paths.runtime_dir.exists());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn format_follows_extension_then_host() {
        assert_eq!(
            detect_archive_format(Path::new("a/node.tar.gz"), "windows").unwrap(),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            detect_archive_format(Path::new("a/node.zip"), "macos").unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            detect_archive_format(Path::new("a/nodejs_package"), "win32").unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            detect_archive_format(Path::new("a/nodejs_package"), "darwin").unwrap(),
            ArchiveFormat::TarGz
        );
        assert!(matches!(
            detect_archive_format(Path::new("a/node.7z"), "linux"),
            Err(LauncherError::UnsupportedArchive { .. })
        ));
    }

    #[test]
    fn unknown_extension_fails_before_touching_dest() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("node.rar");
        fs::write(&archive, b"junk").unwrap();
        let dest = scratch.path().join("runtime");

        let err = extract_runtime_archive(&archive, &dest, "linux", &RecordingSink::default());

        assert!(matches!(err, Err(LauncherError::UnsupportedArchive { .. })));
        assert!(!dest.exists());
    }

    #[cfg(unix)]
    #[test]
    fn tarball_bin_files_end_up_owner_executable() {
        use std::os::unix::fs::PermissionsExt;

        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("node.tar.gz");
        {
            let gz = GzEncoder::new(File::create(&archive).unwrap(), Compression::fast());
            let mut builder = tar::Builder::new(gz);
            for name in ["node-v22/bin/node", "node-v22/bin/corepack", "node-v22/include/node.h"] {
                let data = b"payload";
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o600);
                header.set_cksum();
                builder.append_data(&mut header, name, &data[..]).unwrap();
            }
            builder.into_inner().unwrap().finish().unwrap();
        }
        let dest = scratch.path().join("runtime");
        let sink = RecordingSink::default();

        extract_runtime_archive(&archive, &dest, "linux", &sink).unwrap();

        for bin in ["node", "corepack"] {
            let mode = fs::metadata(dest.join("bin").join(bin)).unwrap().permissions().mode();
            assert_ne!(mode & 0o100, 0, "{bin} should be owner-executable");
        }
        assert!(dest.join("include/node.h").is_file());
        assert_eq!(sink.lines().last().map(String::as_str), Some("Extraction complete"));
    }

    #[test]
    fn packaged_zip_without_extension_is_flattened_on_windows() {
        use std::io::Write;

        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("nodejs_package");
        {
            let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = zip::write::FileOptions::default();
            zip.start_file("node-v22.22.0-win-x64/node.exe", options).unwrap();
            zip.write_all(b"MZ").unwrap();
            zip.finish().unwrap();
        }
        let dest = scratch.path().join("runtime");

        extract_runtime_archive(&archive, &dest, "windows", &RecordingSink::default()).unwrap();

        assert!(dest.join("node.exe").is_file());
        assert!(!dest.join("node-v22.22.0-win-x64").exists());
    }
}
