//! Downloads and installs the speech model next to the executable.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use vosk_stt::config::{self, Config};
use vosk_stt::fetch::{self, FetchOutcome, HttpArchiveSource};
use vosk_stt::telemetry;

#[derive(Parser, Debug)]
#[command(version, about = "Download and install the speech model", long_about = None)]
struct Args {
    /// Config file (defaults to stt.toml next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[allow(clippy::print_stderr)] // Failure stays visible when logging goes to a file
fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "model setup failed");
            eprintln!("Failed to set up model: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    telemetry::init(&config.telemetry)?;

    let base = config::base_dir()?;

    match fetch::ensure_model(&config, &base, &HttpArchiveSource)
        .context("failed to install model")?
    {
        FetchOutcome::AlreadyPresent | FetchOutcome::Installed => {
            tracing::info!(base = %base.display(), "model ready");
        }
        FetchOutcome::MissingExtractedFolder { contents } => {
            tracing::warn!(
                entries = contents.len(),
                "archive extracted but model directory was not created"
            );
        }
    }

    Ok(())
}
