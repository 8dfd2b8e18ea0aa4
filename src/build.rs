use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::BINARY_NAME;

/// Tags eligible for release builds carry this prefix.
pub const TAG_PREFIX: &str = "rust-v";

/// Lean pre-build subset: the packages most likely to break a release,
/// not the full suite.
const TEST_PACKAGES: &[&str] = &["codex-core", "codex-cli"];

const HELP_EXCERPT_LINES: usize = 10;

/// Resolve the tag to build: validate an explicit override's prefix, or
/// pick the highest tag by the semver ordering of its version part.
pub fn resolve_tag(repo_dir: &Path, tag: Option<&str>) -> Result<String, String> {
    if let Some(tag) = tag {
        if !tag.starts_with(TAG_PREFIX) {
            return Err(format!("tag {tag} does not start with {TAG_PREFIX}"));
        }
        return Ok(tag.to_string());
    }

    let pattern = format!("{TAG_PREFIX}*");
    let listing = git_stdout(repo_dir, &["tag", "--list", &pattern])?;
    latest_tag(listing.lines()).ok_or_else(|| format!("no {TAG_PREFIX} tags found"))
}

fn latest_tag<'a>(tags: impl Iterator<Item = &'a str>) -> Option<String> {
    tags.filter_map(|tag| {
        let version = semver::Version::parse(tag.strip_prefix(TAG_PREFIX)?).ok()?;
        Some((version, tag))
    })
    .max_by(|(a, _), (b, _)| a.cmp(b))
    .map(|(_, tag)| tag.to_string())
}

/// Short-lived branch pinned to one tag. Dropping it purges the build
/// artifacts, restores the original ref and deletes the branch, unless it
/// was retained for inspection.
#[derive(Debug)]
pub struct DisposableBranch {
    repo_dir: PathBuf,
    name: String,
    original: String,
    retained: bool,
}

impl DisposableBranch {
    pub fn create(repo_dir: &Path, tag: &str) -> Result<Self, String> {
        let mut original = git_stdout(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        if original == "HEAD" {
            // Detached: record the commit id so the drop can return to it.
            original = git_stdout(repo_dir, &["rev-parse", "HEAD"])?;
        }

        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let name = format!("codex-build-{tag}-{seconds}");

        git_run(repo_dir, &["checkout", "-q", "-b", &name, tag])?;
        println!("building {tag} on disposable branch {name}");

        Ok(Self {
            repo_dir: repo_dir.to_path_buf(),
            name,
            original,
            retained: false,
        })
    }

    /// Skip all cleanup; the operator keeps the branch and artifacts.
    pub fn retain(&mut self) {
        self.retained = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for DisposableBranch {
    fn drop(&mut self) {
        if self.retained {
            return;
        }

        if let Err(e) = cargo_clean(&self.repo_dir) {
            eprintln!("warning: failed to clean build artifacts: {e}");
        }
        if let Err(e) = git_run(&self.repo_dir, &["checkout", "-q", &self.original]) {
            eprintln!("warning: failed to restore {}: {e}", self.original);
        }
        if let Err(e) = git_run(&self.repo_dir, &["branch", "-q", "-D", &self.name]) {
            eprintln!("warning: failed to delete branch {}: {e}", self.name);
        }
    }
}

/// Run the lean pre-build test subset, streaming cargo's output through.
pub fn run_tests(repo_dir: &Path) -> Result<(), String> {
    println!("running tests for {}", TEST_PACKAGES.join(", "));

    let mut cmd = Command::new("cargo");
    cmd.current_dir(repo_dir).arg("test");
    for package in TEST_PACKAGES {
        cmd.args(["-p", package]);
    }

    run_streamed(cmd, "cargo test")
}

/// Build release binaries for every workspace member.
pub fn build_release(repo_dir: &Path) -> Result<(), String> {
    println!("building release binaries");

    let mut cmd = Command::new("cargo");
    cmd.current_dir(repo_dir)
        .args(["build", "--release", "--workspace"]);

    run_streamed(cmd, "cargo build")
}

/// Print the built binary's version and the head of its help text.
/// Advisory only: a missing or unresponsive binary warns without failing
/// the build.
pub fn verify_artifact(repo_dir: &Path) {
    let release_dir = repo_dir.join("target").join("release");
    let mut binary = release_dir.join(BINARY_NAME);
    if !binary.is_file() {
        binary = release_dir.join(format!("{BINARY_NAME}.exe"));
    }
    if !binary.is_file() {
        eprintln!("warning: built binary not found under {}", release_dir.display());
        return;
    }

    match Command::new(&binary).arg("--version").output() {
        Ok(output) if output.status.success() => {
            print!("{}", String::from_utf8_lossy(&output.stdout));
        }
        _ => eprintln!("warning: {} --version failed", binary.display()),
    }

    if let Ok(output) = Command::new(&binary).arg("--help").output() {
        if output.status.success() {
            let help = String::from_utf8_lossy(&output.stdout);
            for line in help.lines().take(HELP_EXCERPT_LINES) {
                println!("{line}");
            }
        }
    }
}

fn run_streamed(mut cmd: Command, what: &str) -> Result<(), String> {
    let status = match cmd.status() {
        Ok(status) => status,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(format!("{what}: cargo was not found on PATH"));
        }
        Err(e) => return Err(format!("failed to run {what}: {e}")),
    };

    if !status.success() {
        return Err(format!("{what} exited with {status}"));
    }
    Ok(())
}

fn git_stdout(repo_dir: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git").current_dir(repo_dir).args(args).output();

    let output = match output {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err("git was not found on PATH".to_string());
        }
        Err(e) => return Err(format!("failed to run git {}: {e}", args.join(" "))),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {} failed: {}", args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn git_run(repo_dir: &Path, args: &[&str]) -> Result<(), String> {
    git_stdout(repo_dir, args).map(|_| ())
}

fn cargo_clean(repo_dir: &Path) -> Result<(), String> {
    let output = Command::new("cargo")
        .current_dir(repo_dir)
        .arg("clean")
        .output()
        .map_err(|e| format!("failed to run cargo clean: {e}"))?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn scratch_repo() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        git(tmp.path(), &["init", "-q"]);
        git(
            tmp.path(),
            &[
                "-c",
                "user.email=codex@localhost",
                "-c",
                "user.name=codex",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "--allow-empty",
                "-m",
                "init",
            ],
        );
        tmp
    }

    fn current_ref(dir: &Path) -> String {
        git_stdout(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).unwrap()
    }

    #[test]
    fn explicit_tag_must_carry_the_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve_tag(tmp.path(), Some("v1.0.0")).unwrap_err();
        assert!(err.contains("does not start with rust-v"));

        // A well-formed override never touches git.
        let tag = resolve_tag(tmp.path(), Some("rust-v1.0.0")).unwrap();
        assert_eq!(tag, "rust-v1.0.0");
    }

    #[test]
    fn default_tag_is_the_semver_maximum() {
        let repo = scratch_repo();
        for tag in ["rust-v0.2.1", "rust-v0.10.0", "rust-v0.9.0", "v99.0.0"] {
            git(repo.path(), &["tag", tag]);
        }

        let tag = resolve_tag(repo.path(), None).unwrap();
        assert_eq!(tag, "rust-v0.10.0");
    }

    #[test]
    fn missing_tags_are_an_error() {
        let repo = scratch_repo();
        let err = resolve_tag(repo.path(), None).unwrap_err();
        assert!(err.contains("no rust-v tags found"));
    }

    #[test]
    fn latest_tag_skips_unparseable_versions() {
        let tags = ["rust-vnot-semver", "rust-v0.3.0", "rust-v0.1.0"];
        assert_eq!(
            latest_tag(tags.into_iter()),
            Some("rust-v0.3.0".to_string())
        );
        assert_eq!(latest_tag(["garbage"].into_iter()), None);
    }

    #[test]
    fn disposable_branch_restores_the_original_ref() {
        let repo = scratch_repo();
        git(repo.path(), &["tag", "rust-v0.1.0"]);
        let original = current_ref(repo.path());

        let branch = DisposableBranch::create(repo.path(), "rust-v0.1.0").unwrap();
        assert!(branch.name().starts_with("codex-build-rust-v0.1.0-"));
        let name = branch.name().to_string();
        assert_eq!(current_ref(repo.path()), name);
        drop(branch);

        assert_eq!(current_ref(repo.path()), original);
        let listing = git_stdout(repo.path(), &["branch", "--list", &name]).unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn retained_branch_survives_the_drop() {
        let repo = scratch_repo();
        git(repo.path(), &["tag", "rust-v0.1.0"]);

        let mut branch = DisposableBranch::create(repo.path(), "rust-v0.1.0").unwrap();
        branch.retain();
        let name = branch.name().to_string();
        drop(branch);

        assert_eq!(current_ref(repo.path()), name);
    }

    #[test]
    fn restores_a_detached_head_by_commit_id() {
        let repo = scratch_repo();
        git(repo.path(), &["tag", "rust-v0.1.0"]);
        git(repo.path(), &["checkout", "-q", "--detach"]);
        let commit = git_stdout(repo.path(), &["rev-parse", "HEAD"]).unwrap();

        let branch = DisposableBranch::create(repo.path(), "rust-v0.1.0").unwrap();
        drop(branch);

        assert_eq!(current_ref(repo.path()), "HEAD");
        assert_eq!(git_stdout(repo.path(), &["rev-parse", "HEAD"]).unwrap(), commit);
    }

    #[test]
    fn create_fails_for_an_unknown_tag() {
        let repo = scratch_repo();
        let err = DisposableBranch::create(repo.path(), "rust-v9.9.9").unwrap_err();
        assert!(err.contains("git checkout"));
    }
}
