//! # franchise-logo-dl
//!
//! Batch downloader for franchisee logo images, plus a companion archiving
//! tool for shipping the downloaded folder.
//!
//! ## Overview
//!
//! - **Download job** - paginates the active rows of the `FRANCHISEE` table,
//!   fetches each row's logo over HTTP and stores it under a collision-free
//!   file name. Per-row failures are logged and counted, never fatal.
//! - **Archive job** - packs a directory tree into a single ZIP or `.tar.gz`
//!   file and reports size and compression statistics.
//!
//! Both jobs are one-shot runs driven by the `logo-dl` and `logo-archive`
//! binaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use franchise_logo_dl::{Config, RunOutcome, run_download, wait_for_signal};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.json".as_ref())?;
//!
//!     let cancel = CancellationToken::new();
//!     let on_signal = cancel.clone();
//!     tokio::spawn(async move {
//!         wait_for_signal().await;
//!         on_signal.cancel();
//!     });
//!
//!     match run_download(&config, cancel).await? {
//!         RunOutcome::Completed(stats) => println!("saved {}", stats.success),
//!         RunOutcome::Interrupted(_) => println!("interrupted"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Directory archiving
pub mod archive;
/// Configuration types
pub mod config;
/// Row store access
pub mod db;
/// Batch download pipeline
pub mod downloader;
/// Error types
pub mod error;
/// Image URL resolution and fetching
pub mod fetch;
/// Log sink setup
pub mod logging;
/// Output file naming
pub mod naming;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use archive::{ArchiveFormat, ArchiveReport, Archiver};
pub use config::{Config, DatabaseConfig, RetryConfig, SshTunnelConfig};
pub use db::{Database, RowSource};
pub use downloader::{BatchRunner, run_download, run_session};
pub use error::{ArchiveError, DatabaseError, Error, FetchError, Result};
pub use fetch::{HttpFetcher, ImageFetcher};
pub use naming::FilenameAllocator;
pub use types::{Batch, FranchiseeRow, ResolvedFile, RunOutcome, RunState, RunStats};

/// Exit code for a run stopped by a termination signal (128 + SIGINT)
pub const EXIT_INTERRUPTED: u8 = 130;

/// Wait for a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, stopping");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT (Ctrl+C), stopping");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT (Ctrl+C), stopping");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM, stopping");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

/// Wait for a termination signal (Ctrl+C).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C, stopping");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
