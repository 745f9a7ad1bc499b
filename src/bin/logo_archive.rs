//! `logo-archive`: pack the downloaded images into one ZIP or `.tar.gz` file.

use clap::Parser;
use franchise_logo_dl::archive::{ArchiveFormat, Archiver, DEFAULT_LEVEL, MAX_LEVEL};
use franchise_logo_dl::logging;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "logo-archive")]
#[command(version)]
#[command(about = "Compress the downloaded image folder for transfer")]
struct Cli {
    /// Archive format: zip or tar.gz
    #[arg(short, long, default_value = "zip")]
    format: ArchiveFormat,

    /// Output file name (default: images_<timestamp>.<ext>)
    #[arg(short, long)]
    output: Option<String>,

    /// Compression level 0-9, zip only
    #[arg(short, long, default_value_t = DEFAULT_LEVEL,
          value_parser = clap::value_parser!(u32).range(0..=MAX_LEVEL as i64))]
    level: u32,

    /// Directory to compress
    #[arg(short, long, default_value = "./downloaded_images")]
    source: PathBuf,

    /// Directory the archive is written to
    #[arg(short, long, default_value = "./compressed")]
    dest: PathBuf,

    /// Directory for the dated compress log
    #[arg(long, default_value = "./log/compress")]
    log_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = logging::dated_log_path(&cli.log_dir, "compress");
    if let Err(e) = logging::init(&log_file) {
        eprintln!("Cannot open log file {}: {}", log_file.display(), e);
        return ExitCode::FAILURE;
    }

    let result = Archiver::new(&cli.source, &cli.dest)
        .and_then(|archiver| archiver.compress(cli.format, cli.output.as_deref(), cli.level));

    match result {
        Ok(report) => {
            tracing::info!("Archive created: {}", report.archive.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Compression failed");
            ExitCode::FAILURE
        }
    }
}
