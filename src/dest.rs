use std::path::{Path, PathBuf};
use std::process::Command;

use crate::platform::OsFamily;
use crate::BINARY_NAME;

/// Resolve the default install destination for a platform family.
///
/// Never fails: every branch produces a usable path the operator can
/// override with `--dest`.
pub fn resolve(family: OsFamily) -> PathBuf {
    resolve_with(family, brew_prefix, dirs::home_dir())
}

/// `brew` is consulted only for the mac family; other platforms never pay
/// for the subprocess.
pub fn resolve_with(
    family: OsFamily,
    brew: impl FnOnce() -> Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    let home = home.unwrap_or_else(|| PathBuf::from("."));

    match family {
        OsFamily::Mac => {
            if let Some(prefix) = brew() {
                return prefix.join("bin").join(BINARY_NAME);
            }
            let fixed = Path::new("/opt/homebrew/bin");
            if fixed.is_dir() {
                return fixed.join(BINARY_NAME);
            }
            home.join(".local").join("bin").join(BINARY_NAME)
        }
        OsFamily::Linux => PathBuf::from("/usr/local/bin").join(BINARY_NAME),
        OsFamily::Windows => home.join("bin").join(format!("{BINARY_NAME}.exe")),
        OsFamily::Other => home.join(".local").join("bin").join(BINARY_NAME),
    }
}

/// Query Homebrew for its prefix, if brew is installed at all.
fn brew_prefix() -> Option<PathBuf> {
    let output = Command::new("brew").arg("--prefix").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let prefix = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if prefix.is_empty() {
        return None;
    }
    Some(PathBuf::from(prefix))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/home/op"))
    }

    #[test]
    fn linux_uses_the_system_path() {
        let dest = resolve_with(OsFamily::Linux, || None, home());
        assert_eq!(dest, PathBuf::from("/usr/local/bin/codex"));
    }

    #[test]
    fn windows_uses_a_per_user_exe_path() {
        let dest = resolve_with(OsFamily::Windows, || None, home());
        assert_eq!(dest, PathBuf::from("/home/op/bin/codex.exe"));
    }

    #[test]
    fn mac_prefers_the_brew_prefix() {
        let dest = resolve_with(OsFamily::Mac, || Some(PathBuf::from("/opt/homebrew")), home());
        assert_eq!(dest, PathBuf::from("/opt/homebrew/bin/codex"));
    }

    #[test]
    fn mac_without_brew_still_resolves_a_bin_path() {
        // The middle tier depends on whether /opt/homebrew/bin exists on the
        // host running the tests, so only the shape is asserted.
        let dest = resolve_with(OsFamily::Mac, || None, home());
        assert!(dest.ends_with("bin/codex"), "got {}", dest.display());
    }

    #[test]
    fn other_families_fall_back_to_the_generic_path() {
        let dest = resolve_with(OsFamily::Other, || None, home());
        assert_eq!(dest, PathBuf::from("/home/op/.local/bin/codex"));
    }

    #[test]
    fn missing_home_resolves_relative() {
        let dest = resolve_with(OsFamily::Other, || None, None);
        assert_eq!(dest, PathBuf::from("./.local/bin/codex"));
    }

    #[test]
    fn non_mac_families_never_query_brew() {
        let dest = resolve_with(OsFamily::Linux, || panic!("queried brew"), home());
        assert_eq!(dest, PathBuf::from("/usr/local/bin/codex"));

        let dest = resolve_with(OsFamily::Windows, || panic!("queried brew"), home());
        assert_eq!(dest, PathBuf::from("/home/op/bin/codex.exe"));

        let dest = resolve_with(OsFamily::Other, || panic!("queried brew"), home());
        assert_eq!(dest, PathBuf::from("/home/op/.local/bin/codex"));
    }
}
