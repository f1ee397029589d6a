// Library layer: everything the command handlers call into.

pub mod config_watcher;
pub mod credentials;
pub mod environment;
pub mod errors;
pub mod launcher_config;
pub mod model_catalog;
pub mod npm;
pub mod output_parser;
pub mod paths;
pub mod progress;
pub mod provisioner;
pub mod skills;
pub mod terminal;
pub mod tool_config;
pub mod utilities;
