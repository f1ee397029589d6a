// Command-line definitions: the clap tree and the argument types it parses into.

pub mod cmd_enums;
pub mod type_enums;
