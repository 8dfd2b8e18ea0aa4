use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use codex_installer::{InstallOptions, InstallOutcome};

/// Download and install the codex binary for this machine.
#[derive(Parser)]
#[command(name = "codex-install", version)]
struct Cli {
    /// Repository to install from.
    #[arg(long, value_name = "OWNER/REPO", default_value = codex_installer::DEFAULT_REPO)]
    repo: String,

    /// Install this release tag instead of the newest suitable release.
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// Target triple override; skips host detection.
    #[arg(long, value_name = "TRIPLE")]
    target: Option<String>,

    /// Install destination; defaults to a per-platform location.
    #[arg(long, value_name = "PATH")]
    dest: Option<PathBuf>,

    /// Never elevate privileges, even if the destination is not writable.
    #[arg(long)]
    no_sudo: bool,

    /// Print what would be downloaded and installed, then exit.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let opts = InstallOptions {
        repo: cli.repo,
        tag: cli.tag,
        target: cli.target,
        dest: cli.dest,
        no_sudo: cli.no_sudo,
        dry_run: cli.dry_run,
    };

    match codex_installer::install(&opts) {
        Ok(InstallOutcome::Installed(path)) => {
            println!("installed codex to {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(InstallOutcome::DryRun { url, dest }) => {
            println!("dry run: would download {url} and install to {}", dest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
