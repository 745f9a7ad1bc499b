//! `logo-dl`: download every active franchisee logo into the output directory.

use clap::Parser;
use franchise_logo_dl::{
    Config, EXIT_INTERRUPTED, RunOutcome, logging, run_download, wait_for_signal,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "logo-dl")]
#[command(version)]
#[command(about = "Download franchisee logo images from the row store")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.config.exists() {
        eprintln!("Config file not found: {}", cli.config.display());
        return ExitCode::FAILURE;
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("Cannot open log file {}: {}", config.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        on_signal.cancel();
    });

    match run_download(&config, cancel).await {
        Ok(RunOutcome::Completed(_)) => ExitCode::SUCCESS,
        Ok(RunOutcome::Interrupted(_)) => ExitCode::from(EXIT_INTERRUPTED),
        Err(e) => {
            tracing::error!(error = %e, "Download run failed");
            ExitCode::FAILURE
        }
    }
}
