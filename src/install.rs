use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

/// Move the extracted binary to `dest` with mode 0755, replacing any file
/// already there. Elevates via sudo only when the destination directory is
/// not writable and elevation has not been disabled.
pub fn place(binary: &Path, dest: &Path, no_sudo: bool) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        // Best-effort; a real problem surfaces when the copy below fails.
        let _ = fs::create_dir_all(parent);

        if !no_sudo && !dir_writable(parent) {
            return place_elevated(binary, dest);
        }
    }

    // Remove first so a currently running binary can be replaced.
    let _ = fs::remove_file(dest);

    fs::copy(binary, dest)
        .map_err(|e| format!("failed to copy binary to {}: {e}", dest.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
            .map_err(|e| format!("failed to set permissions on {}: {e}", dest.display()))?;
    }

    Ok(())
}

fn place_elevated(binary: &Path, dest: &Path) -> Result<(), String> {
    println!("installing to {} with sudo", dest.display());

    let result = Command::new("sudo")
        .arg("install")
        .args(["-m", "0755"])
        .arg(binary)
        .arg(dest)
        .status();

    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("sudo install exited with {status}")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(format!(
            "sudo is required to install into {} and was not found on PATH",
            dest.display()
        )),
        Err(e) => Err(format!("failed to run sudo install: {e}")),
    }
}

/// Whether the current user can create files in `dir`, checked by creating
/// and removing a probe file.
fn dir_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".codex-install-{}", std::process::id()));
    match fs::OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(file) => {
            drop(file);
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Run the installed binary once with `--version`. Advisory only: the
/// placement already succeeded, so failures warn instead of erroring.
pub fn smoke_check(dest: &Path) {
    match Command::new(dest).arg("--version").status() {
        Ok(status) if status.success() => {}
        Ok(status) => eprintln!("warning: {} --version exited with {status}", dest.display()),
        Err(e) => eprintln!("warning: failed to run {} --version: {e}", dest.display()),
    }
}
