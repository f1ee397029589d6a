// Small, side-effect-light helpers used by the provisioning and configuration layers.

// Archive unpacking (tar.gz with root stripping, zip).
pub mod compression;
// Path expansion, atomic writes, recursive copy.
pub mod file_operations;
// OS/CPU normalization.
pub mod platform;
pub mod timestamps;
// Dotted-numeric version comparison.
pub mod versions;
