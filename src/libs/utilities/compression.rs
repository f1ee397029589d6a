// Archive unpacking for the bundled Node.js distributions.
// Both formats ship with a single versioned root folder (`node-v22.22.0-darwin-arm64/...`);
// the tarball path strips it while unpacking, the zip path flattens it afterwards.

use crate::libs::progress::ProgressSink;
use crate::libs::utilities::file_operations::copy_dir_recursive;
use crate::log_debug;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use zip::ZipArchive;

/// Unpacks a gzipped tarball into `dest`, dropping the first path component of every entry.
/// Entries that would escape `dest` (absolute paths, `..`) are skipped, and so are hard links
/// whose target would.
pub fn extract_tar_gz_stripped(src: &Path, dest: &Path, sink: &dyn ProgressSink) -> io::Result<usize> {
    fs::create_dir_all(dest)?;
    let mut archive = Archive::new(GzDecoder::new(File::open(src)?));
    let mut unpacked = 0usize;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let original = entry.path()?.into_owned();
        let Some(relative) = strip_first_component(&original) else {
            continue;
        };

        let target = dest.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if entry.header().entry_type().is_hard_link() {
            // Link targets are archive paths; resolve them inside `dest` with the same stripping.
            let Some(source) = entry
                .link_name()?
                .as_deref()
                .and_then(strip_first_component)
                .map(|link| dest.join(link))
            else {
                continue;
            };
            if target.exists() {
                fs::remove_file(&target)?;
            }
            fs::hard_link(&source, &target)?;
        } else {
            entry.unpack(&target)?;
        }
        unpacked += 1;

        if unpacked % 500 == 0 {
            sink.progress(&format!("Extracted {unpacked} entries..."));
        }
    }

    log_debug!("[Compression] Unpacked {} entries from {}", unpacked, src.display());
    Ok(unpacked)
}

/// Unpacks a zip archive into `dest` as-is.
pub fn extract_zip(src: &Path, dest: &Path) -> zip::result::ZipResult<()> {
    fs::create_dir_all(dest)?;
    let mut archive = ZipArchive::new(File::open(src)?)?;
    log_debug!("[Compression] Zip {} holds {} entries", src.display(), archive.len());
    archive.extract(dest)
}

/// Moves the contents of every top-level directory of `dest` whose name starts with `marker`
/// up into `dest`, then deletes that directory. Copy-then-delete rather than rename, since
/// renaming out of a freshly extracted tree fails with access errors on Windows.
///
/// Returns the flattened directory names.
pub fn flatten_marked_dirs(dest: &Path, marker: &str) -> io::Result<Vec<String>> {
    let mut flattened = Vec::new();
    let marked: Vec<PathBuf> = fs::read_dir(dest)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(marker))
        .map(|entry| entry.path())
        .collect();

    for dir in marked {
        copy_dir_recursive(&dir, dest)?;
        fs::remove_dir_all(&dir)?;
        flattened.push(dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
    }
    Ok(flattened)
}

fn strip_first_component(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    components.next()?;
    let mut stripped = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => stripped.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if stripped.as_os_str().is_empty() {
        None
    } else {
        Some(stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::progress::RecordingSink;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let gz = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        let mut builder = tar::Builder::new(gz);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn hard_links_resolve_inside_dest() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("node.tar.gz");
        {
            let gz = GzEncoder::new(File::create(&archive).unwrap(), Compression::fast());
            let mut builder = tar::Builder::new(gz);
            let data = b"#!/bin/sh\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, "node-v1/bin/node", &data[..]).unwrap();

            let mut link = tar::Header::new_gnu();
            link.set_entry_type(tar::EntryType::Link);
            link.set_size(0);
            link.set_mode(0o755);
            link.set_link_name("node-v1/bin/node").unwrap();
            link.set_cksum();
            builder.append_data(&mut link, "node-v1/bin/nodejs", io::empty()).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let dest = scratch.path().join("out");

        let count = extract_tar_gz_stripped(&archive, &dest, &RecordingSink::default()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read(dest.join("bin/nodejs")).unwrap(), b"#!/bin/sh\n");
        assert!(!dest.join("node-v1").exists());
    }

    #[test]
    fn strips_single_root_folder() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("node.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("node-v1/bin/node", b"#!/bin/sh\n"),
                ("node-v1/lib/node_modules/npm/bin/npm-cli.js", b"//"),
                ("node-v1/README.md", b"readme"),
            ],
        );
        let dest = scratch.path().join("out");

        let count = extract_tar_gz_stripped(&archive, &dest, &RecordingSink::default()).unwrap();

        assert_eq!(count, 3);
        assert!(dest.join("bin/node").is_file());
        assert!(dest.join("lib/node_modules/npm/bin/npm-cli.js").is_file());
        assert!(dest.join("README.md").is_file());
        assert!(!dest.join("node-v1").exists());
    }

    #[test]
    fn strip_rejects_escaping_paths() {
        assert_eq!(strip_first_component(Path::new("root/../../etc/passwd")), None);
        assert_eq!(strip_first_component(Path::new("root")), None);
        assert_eq!(
            strip_first_component(Path::new("root/./bin/node")),
            Some(PathBuf::from("bin/node"))
        );
    }

    #[test]
    fn zip_is_flattened_and_marker_dir_removed() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("node.zip");
        {
            let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = zip::write::FileOptions::default();
            zip.add_directory("node-v1-win-x64/", options).unwrap();
            zip.start_file("node-v1-win-x64/node.exe", options).unwrap();
            zip.write_all(b"MZ").unwrap();
            zip.start_file("node-v1-win-x64/node_modules/npm/bin/npm-cli.js", options)
                .unwrap();
            zip.write_all(b"//").unwrap();
            zip.finish().unwrap();
        }
        let dest = scratch.path().join("out");

        extract_zip(&archive, &dest).unwrap();
        let flattened = flatten_marked_dirs(&dest, "node-").unwrap();

        assert_eq!(flattened, vec!["node-v1-win-x64".to_string()]);
        assert_eq!(fs::read(dest.join("node.exe")).unwrap(), b"MZ");
        assert!(dest.join("node_modules/npm/bin/npm-cli.js").is_file());
        let leftover = fs::read_dir(&dest)
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| e.file_name().to_string_lossy().starts_with("node-"));
        assert!(!leftover);
    }
}
