// OS and CPU normalization. The runtime archive matrix and the terminal launcher both key
// off these canonical names rather than `std::env::consts` spellings.
use crate::log_debug;

/// Canonical name of the OS this binary was built for ("macos", "linux", "windows", ...).
pub fn detect_os() -> String {
    normalize_os(std::env::consts::OS)
}

/// Canonical name of the CPU this binary was built for ("arm64", "x86_64", "x86", ...).
pub fn detect_architecture() -> String {
    normalize_arch(std::env::consts::ARCH)
}

/// Maps the various spellings of an OS name onto one lowercase form.
/// Unknown names are returned lowercased so callers can still report them.
pub fn normalize_os(os: &str) -> String {
    match os.to_lowercase().as_str() {
        "macos" | "darwin" | "apple-darwin" | "osx" => "macos".to_string(),
        "linux" => "linux".to_string(),
        "windows" | "win32" | "win64" => "windows".to_string(),
        other => {
            log_debug!("[Platform] Unknown OS variant '{}', using as-is", other);
            other.to_string()
        }
    }
}

/// Maps the various spellings of a CPU architecture onto one lowercase form.
pub fn normalize_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "aarch64" | "arm64" => "arm64".to_string(),
        "amd64" | "x86_64" | "x64" => "x86_64".to_string(),
        "x86" | "i386" | "i586" | "i686" | "ia32" => "x86".to_string(),
        other => {
            log_debug!("[Platform] Unknown ARCH variant '{}', using as-is", other);
            other.to_string()
        }
    }
}
