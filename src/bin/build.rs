use std::process::ExitCode;

use clap::Parser;
use codex_installer::BuildOptions;

/// Reproduce the codex release build for a tag, on a disposable branch.
#[derive(Parser)]
#[command(name = "codex-build", version)]
struct Cli {
    /// Tag to build; must start with rust-v. Defaults to the newest one.
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// Skip the pre-build test subset.
    #[arg(long)]
    skip_tests: bool,

    /// Keep the disposable branch and release artifacts for inspection.
    #[arg(long)]
    no_clean: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let opts = BuildOptions {
        tag: cli.tag,
        skip_tests: cli.skip_tests,
        no_clean: cli.no_clean,
    };

    match codex_installer::build(&opts) {
        Ok(report) => {
            println!("release build complete for {}", report.tag);
            if let Some(branch) = report.retained_branch {
                println!("disposable branch retained: {branch}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
