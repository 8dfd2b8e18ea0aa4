use std::env::consts::{ARCH, OS};

/// Coarse platform family derived from a target triple.
///
/// Drives destination defaults and the `.exe` asset variants. Explicit
/// `--target` overrides are not validated, so unknown triples land in
/// `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Mac,
    Linux,
    Windows,
    Other,
}

impl OsFamily {
    pub fn of(target: &str) -> Self {
        if target.contains("windows") {
            Self::Windows
        } else if target.contains("apple-darwin") {
            Self::Mac
        } else if target.contains("linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Resolve the target triple for the host this process runs on.
pub fn detect() -> Result<String, String> {
    triple_for(OS, ARCH)
}

/// Fixed `(os, arch)` table; anything outside it is a terminal error.
pub fn triple_for(os: &str, arch: &str) -> Result<String, String> {
    let triple = match (os, arch) {
        ("macos", "aarch64") => "aarch64-apple-darwin",
        ("macos", "x86_64") => "x86_64-apple-darwin",
        ("linux", "x86_64") => "x86_64-unknown-linux-gnu",
        ("linux", "aarch64") => "aarch64-unknown-linux-gnu",
        ("windows", "x86_64") => "x86_64-pc-windows-msvc",
        ("windows", "aarch64") => "aarch64-pc-windows-msvc",
        _ => return Err(format!("unsupported platform: {os}-{arch}")),
    };

    Ok(triple.to_string())
}
