use crate::cli::type_enums::{ModelRef, ModelSpec};
use clap::{Parser, Subcommand};

/// Defines the command-line interface (CLI) for 'opencode-launcher'.
/// `#[derive(Parser)]` automatically generates argument parsing code via `clap`.
#[derive(Parser)]
#[command(name = "opencode-launcher")]
#[command(version)]
#[command(about = "Provision a private Node.js runtime, install opencode into it, and launch it")]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    /// Print each command's outcome as a JSON object on stdout.
    #[arg(long, global = true)]
    pub(crate) json: bool,

    /// Launcher data directory (config, private runtime, private opencode install).
    #[arg(long, global = true, env = "OPENCODE_LAUNCHER_HOME")]
    pub(crate) data_dir: Option<String>,

    /// Directory holding the bundled Node.js package and the opencode.json template.
    #[arg(long, global = true, env = "OPENCODE_LAUNCHER_RESOURCES")]
    pub(crate) resources: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Every launcher operation. Each variant is handled by one module under `commands/`.
#[derive(Subcommand)]
pub enum Commands {
    /// Report whether the private runtime and opencode are installed, and the npm registry.
    Status,
    /// Extract the bundled Node.js runtime into the data directory.
    Setup,
    /// Read or change the registry the private npm installs from.
    Registry {
        #[command(subcommand)]
        action: RegistryCommands,
    },
    /// Install opencode into the private prefix.
    Install {
        /// Exact version to install (e.g. "0.15.0"). Defaults to the registry's latest.
        #[arg(long)]
        version: Option<String>,
    },
    /// Install the latest opencode if it is newer than the installed one.
    Upgrade {
        /// Only report whether an upgrade is available.
        #[arg(long)]
        check: bool,
    },
    /// Remove opencode from the private prefix.
    Uninstall,
    /// Open opencode in a new terminal window.
    Launch {
        /// Start `opencode web` on 127.0.0.1 instead of the interactive TUI.
        #[arg(long)]
        web: bool,
        /// Port for web mode. Remembered for next time.
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
        /// Working directory. Remembered for next time.
        #[arg(long)]
        dir: Option<String>,
    },
    /// Show or change the launcher's own settings.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Delete the private runtime and opencode install and restore default settings.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Manage providers and models in opencode.json.
    Models {
        #[command(subcommand)]
        action: ModelsCommands,
    },
    /// Browse the public model catalog.
    Catalog {
        /// Show the models of one provider.
        #[arg(long)]
        provider: Option<String>,
    },
    /// Manage the API key stored in opencode's auth.json.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Run the skills CLI through the private runtime.
    Skills {
        #[command(subcommand)]
        action: SkillsCommands,
    },
    /// Watch opencode.json and report changes made by other programs.
    Watch,
}

#[derive(Subcommand)]
pub enum RegistryCommands {
    /// Print the configured registry ("unknown" if npm can't report one).
    Get,
    /// Set the registry URL.
    Set { url: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print config.json.
    Show,
    /// Remember the default working directory for `launch`.
    SetWorkDir { dir: String },
    /// Remember the default port for `launch --web`.
    SetPort {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum ModelsCommands {
    /// Create opencode.json from the bundled template.
    Init {
        /// Overwrite an existing opencode.json.
        #[arg(long)]
        force: bool,
    },
    /// List configured models, most recently used first.
    List,
    /// Add a provider, or update fields of an existing one.
    AddProvider {
        /// Provider id (the key under "provider").
        id: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        /// AI SDK package, e.g. "@ai-sdk/openai-compatible".
        #[arg(long)]
        npm: Option<String>,
        /// Base URL of an OpenAI-compatible endpoint.
        #[arg(long)]
        base_url: Option<String>,
        /// API key, or an "{env:VAR}" reference.
        #[arg(long)]
        api_key: Option<String>,
        /// Model to add: "<id>" or "<id>=<name>". Repeatable.
        #[arg(long = "model", value_name = "MODEL")]
        models: Vec<ModelSpec>,
        /// Seed name, package, base URL and models from the public catalog.
        #[arg(long)]
        from_catalog: bool,
        /// Write even if opencode.json changed on disk since it was read.
        #[arg(long)]
        force: bool,
    },
    /// Remove a provider and all of its models.
    RemoveProvider {
        id: String,
        #[arg(long)]
        force: bool,
    },
    /// Add a model to an existing provider.
    AddModel {
        /// "<provider>/<model>".
        reference: ModelRef,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// Remove a model from a provider.
    RemoveModel {
        reference: ModelRef,
        #[arg(long)]
        force: bool,
    },
    /// Set the default model.
    Default {
        reference: ModelRef,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an API key.
    Set {
        key: String,
        /// Provider namespace in auth.json.
        #[arg(long, default_value = crate::schemas::credentials::DEFAULT_AUTH_NAMESPACE)]
        provider: String,
    },
    /// Show the stored key, masked.
    Show {
        #[arg(long, default_value = crate::schemas::credentials::DEFAULT_AUTH_NAMESPACE)]
        provider: String,
    },
}

#[derive(Subcommand)]
pub enum SkillsCommands {
    /// Install a skill from "owner/repo" or "owner/repo@skill".
    Add {
        source: String,
        /// Install for all projects instead of the working directory.
        #[arg(long, short)]
        global: bool,
    },
    /// List installed skills.
    List,
    /// Search the skills directory.
    Find { query: String },
    /// Check installed skills for updates.
    Check,
    /// Update installed skills.
    Update,
}
