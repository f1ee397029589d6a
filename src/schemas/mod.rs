// Serde models for the JSON documents the launcher reads and writes.

// `config.json`, owned by the launcher.
pub mod launcher_config;
// `opencode.json`, owned by opencode; patched in place.
pub mod tool_config;
// `auth.json`, owned by opencode.
pub mod credentials;
// Records produced by the skills output parser.
pub mod skills;
// models.dev catalog entries.
pub mod catalog;
