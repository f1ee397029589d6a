//! Error type shared by the provisioning, installer, launcher and configuration layers.
//!
//! Command handlers wrap these in `anyhow` and flatten them into a
//! `{success: false, error: <message>}` outcome, so every variant's `Display`
//! text is written to be shown to the user as-is.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    /// No bundled runtime archive exists for this OS/CPU pair.
    #[error("Unsupported operating system: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The archive extension is neither a tarball nor a zip.
    #[error("Unsupported archive format '{extension}' for {}", path.display())]
    UnsupportedArchive { extension: String, path: PathBuf },

    /// A file the operation depends on (bundled archive, `node`, `npm-cli.js`, the tool) is missing.
    #[error("{what} not found at {}", path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    /// A child process exited with a non-zero status.
    #[error("{command} failed with exit code {code}\n{output}")]
    CommandFailed {
        command: String,
        code: String,
        output: String,
    },

    /// `opencode.json` changed on disk after it was loaded.
    #[error(
        "{} was modified by another program since it was loaded; reload and retry, or pass --force to overwrite",
        path.display()
    )]
    ConcurrentModification { path: PathBuf },

    /// The tool configuration file already exists and `--force` was not given.
    #[error("{} already exists (use --force to overwrite)", path.display())]
    AlreadyExists { path: PathBuf },

    /// A `provider/model` reference is malformed or names something that isn't configured.
    #[error("Invalid model reference '{reference}': {reason}")]
    InvalidModel { reference: String, reason: String },

    /// Provider id not present in the tool configuration or the catalog.
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type LauncherResult<T> = Result<T, LauncherError>;
