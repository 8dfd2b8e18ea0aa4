pub mod build;
pub mod dest;
pub mod download;
pub mod extract;
pub mod github;
pub mod install;
pub mod platform;

use std::path::{Path, PathBuf};

pub use platform::OsFamily;

/// Name of the binary this crate installs and builds.
pub const BINARY_NAME: &str = "codex";

/// Repository releases are resolved from unless `--repo` overrides it.
pub const DEFAULT_REPO: &str = "openai/codex";

#[derive(Debug, thiserror::Error)]
pub enum InstallerError {
    #[error("target resolution failed: {0}")]
    Target(String),

    #[error("release resolution failed: {0}")]
    Release(String),

    #[error("asset resolution failed: {0}")]
    Asset(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("installation failed: {0}")]
    Installation(String),

    #[error("tag resolution failed: {0}")]
    Tag(String),

    #[error("build isolation failed: {0}")]
    Isolation(String),

    #[error("tests failed: {0}")]
    Tests(String),

    #[error("build failed: {0}")]
    Build(String),
}

/// Options for the install pipeline, one field per `codex-install` flag.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub repo: String,
    pub tag: Option<String>,
    pub target: Option<String>,
    pub dest: Option<PathBuf>,
    pub no_sudo: bool,
    pub dry_run: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            tag: None,
            target: None,
            dest: None,
            no_sudo: false,
            dry_run: false,
        }
    }
}

/// What a successful install invocation did.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The binary was placed at this path.
    Installed(PathBuf),
    /// Dry-run: nothing was downloaded or installed.
    DryRun { url: String, dest: PathBuf },
}

/// Options for the build orchestrator, one field per `codex-build` flag.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub tag: Option<String>,
    pub skip_tests: bool,
    pub no_clean: bool,
}

/// What a successful build invocation produced.
#[derive(Debug)]
pub struct BuildReport {
    pub tag: String,
    /// Set when `--no-clean` kept the disposable branch for inspection.
    pub retained_branch: Option<String>,
}

/// Download and install the `codex` binary for the current host.
///
/// Resolves the target triple and install destination, picks the newest
/// suitable release and its platform asset, then downloads, extracts and
/// places the binary with mode 0755.
pub fn install(opts: &InstallOptions) -> Result<InstallOutcome, InstallerError> {
    install_from(opts, github::API_BASE)
}

/// Same as [`install`] but resolves releases against `api_base`.
pub fn install_from(
    opts: &InstallOptions,
    api_base: &str,
) -> Result<InstallOutcome, InstallerError> {
    let target = match &opts.target {
        Some(triple) => triple.clone(),
        None => platform::detect().map_err(InstallerError::Target)?,
    };
    let family = OsFamily::of(&target);

    let dest = opts.dest.clone().unwrap_or_else(|| dest::resolve(family));

    let client = reqwest::blocking::Client::new();

    let tag = github::select_tag(&client, api_base, &opts.repo, &target, opts.tag.as_deref())
        .map_err(InstallerError::Release)?;

    let release = github::release_by_tag(&client, api_base, &opts.repo, &tag)
        .map_err(InstallerError::Release)?;

    let asset = github::select_asset(&release, &target).map_err(InstallerError::Asset)?;

    let tmp = tempfile::tempdir().map_err(|e| {
        InstallerError::Installation(format!("failed to create temporary directory: {e}"))
    })?;

    if opts.dry_run {
        return Ok(InstallOutcome::DryRun {
            url: asset.browser_download_url.clone(),
            dest,
        });
    }

    let archive = download::fetch(&client, &asset.browser_download_url, &asset.name, tmp.path())
        .map_err(InstallerError::Download)?;

    let binary = extract::unpack(&archive, tmp.path()).map_err(InstallerError::Extraction)?;

    install::place(&binary, &dest, opts.no_sudo).map_err(InstallerError::Installation)?;
    install::smoke_check(&dest);

    Ok(InstallOutcome::Installed(dest))
}

/// Reproduce the release build for a tag in the current working copy.
///
/// Resolves (or validates) a `rust-v` tag, checks it out on a disposable
/// branch, runs the lean test subset, builds release binaries and verifies
/// the produced binary. The branch and artifacts are cleaned up on every
/// exit path unless `no_clean` retains them.
pub fn build(opts: &BuildOptions) -> Result<BuildReport, InstallerError> {
    build_in(Path::new("."), opts)
}

/// Same as [`build`] but operates on the repository at `repo_dir`.
pub fn build_in(repo_dir: &Path, opts: &BuildOptions) -> Result<BuildReport, InstallerError> {
    let tag = build::resolve_tag(repo_dir, opts.tag.as_deref()).map_err(InstallerError::Tag)?;

    let mut branch =
        build::DisposableBranch::create(repo_dir, &tag).map_err(InstallerError::Isolation)?;
    if opts.no_clean {
        branch.retain();
    }

    if !opts.skip_tests {
        build::run_tests(repo_dir).map_err(InstallerError::Tests)?;
    }

    build::build_release(repo_dir).map_err(InstallerError::Build)?;
    build::verify_artifact(repo_dir);

    let retained_branch = opts.no_clean.then(|| branch.name().to_string());
    Ok(BuildReport {
        tag,
        retained_branch,
    })
}
