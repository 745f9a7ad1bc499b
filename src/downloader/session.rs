//! Acquire the row store, run, and release it on every path.

use super::BatchRunner;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::types::{RunOutcome, RunStats};
use tokio_util::sync::CancellationToken;

/// Run one complete download job
///
/// Creates the output directory, connects to the row store (through the SSH
/// tunnel when enabled), processes every batch and releases the connection.
/// Cancelling `cancel` ends the run early with [`RunOutcome::Interrupted`].
///
/// # Errors
///
/// Returns an error when the output directory cannot be created, the
/// connection cannot be established, or the count query fails. Per-row
/// failures never surface here; they are counted in the returned stats.
pub async fn run_download(config: &Config, cancel: CancellationToken) -> Result<RunOutcome> {
    tracing::info!("============================================================");
    tracing::info!("Franchise logo download started");
    tracing::info!("============================================================");

    tokio::fs::create_dir_all(&config.output_directory).await?;
    tracing::info!("Output directory: {}", config.output_directory.display());

    let mut runner = BatchRunner::from_config(config)?;

    let db = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            // The connect future is dropped; a half-open tunnel child is killed on drop
            tracing::warn!("Interrupted by user");
            return Ok(RunOutcome::Interrupted(RunStats::default()));
        }
        db = Database::connect(config) => match db {
            Ok(db) => db,
            Err(e) => {
                runner.mark_failed();
                tracing::error!(error = %e, "Database connection failed");
                if !config.ssh_tunnel.enabled {
                    tracing::info!(
                        "Hint: set ssh_tunnel.enabled to true in the config if the database is only reachable through SSH"
                    );
                }
                return Err(e);
            }
        },
    };

    run_session(db, &mut runner, &cancel).await
}

/// Drive `runner` over an open connection, then close it
///
/// The connection is closed exactly once whether the run completes, fails,
/// or is interrupted.
pub async fn run_session(
    db: Database,
    runner: &mut BatchRunner,
    cancel: &CancellationToken,
) -> Result<RunOutcome> {
    runner.mark_connected();
    let result = runner.run(&db, cancel).await;
    db.close().await;
    result
}
