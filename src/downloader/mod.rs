//! Batch download pipeline split into focused submodules.
//!
//! The [`BatchRunner`] drives one run over the row store:
//! - [`batch`] - Per-batch and per-row processing with failure isolation
//! - [`report`] - Progress and summary log lines
//! - [`session`] - Connection acquisition and guaranteed release
//!
//! A run moves through `NotStarted → Connected → Paginating → Fetching → Completed`.
//! Connection or count failures end in `Failed`; a termination signal ends in
//! `Interrupted`. Only `Completed` reports the summary.

mod batch;
mod report;
mod session;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use session::{run_download, run_session};

use crate::config::Config;
use crate::db::RowSource;
use crate::error::Result;
use crate::fetch::{HttpFetcher, ImageFetcher};
use crate::naming::FilenameAllocator;
use crate::types::{Batch, RunOutcome, RunState, RunStats};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use batch::BatchEnd;

/// Drives pagination and accumulates the outcome of one run
///
/// The runner owns the [`RunStats`] for the whole run; nothing else reads or
/// writes them until the run returns.
pub struct BatchRunner {
    fetcher: Arc<dyn ImageFetcher>,
    allocator: FilenameAllocator,
    base_url: String,
    batch_size: u64,
    progress_interval: usize,
    state: RunState,
    stats: RunStats,
}

impl BatchRunner {
    /// Create a runner that fetches through `fetcher`
    pub fn new(config: &Config, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            allocator: FilenameAllocator::new(&config.output_directory),
            base_url: config.s3_base_url.clone(),
            batch_size: config.batch_size,
            progress_interval: config.progress_interval.max(1),
            state: RunState::NotStarted,
            stats: RunStats::default(),
        }
    }

    /// Create a runner with the HTTP fetcher described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Record that the row store connection is up
    pub fn mark_connected(&mut self) {
        self.transition(RunState::Connected);
    }

    /// Record that the connection attempt failed
    pub fn mark_failed(&mut self) {
        self.transition(RunState::Failed);
    }

    /// Process every page of `source`
    ///
    /// Returns `Err` only for run-fatal failures (the count query). Page and
    /// row failures are logged and folded into the statistics. Cancelling
    /// `cancel` stops the run before the next row and yields
    /// [`RunOutcome::Interrupted`] without a summary.
    pub async fn run(
        &mut self,
        source: &dyn RowSource,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        if self.state == RunState::NotStarted {
            self.transition(RunState::Connected);
        }
        let started = Instant::now();

        let total = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.interrupt()),
            count = source.count_active() => match count {
                Ok(total) => total,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to count target rows");
                    self.transition(RunState::Failed);
                    return Err(e);
                }
            },
        };

        self.stats = RunStats::new(total);
        tracing::info!("Target rows: {}", total);

        if total == 0 {
            tracing::warn!("No rows to process");
            self.transition(RunState::Completed);
            return Ok(RunOutcome::Completed(self.stats.clone()));
        }

        let batches = Batch::plan(total, self.batch_size);
        tracing::info!(
            "Total batches: {} (batch size: {})",
            batches.len(),
            self.batch_size
        );
        self.transition(RunState::Paginating);

        for batch in batches {
            if cancel.is_cancelled() {
                return Ok(self.interrupt());
            }

            self.transition(RunState::Fetching { batch: batch.index });
            if let BatchEnd::Interrupted = self.process_batch(source, batch, cancel).await {
                return Ok(self.interrupt());
            }
            self.transition(RunState::Paginating);
        }

        self.transition(RunState::Completed);
        self.report_summary(started.elapsed());
        Ok(RunOutcome::Completed(self.stats.clone()))
    }

    fn interrupt(&mut self) -> RunOutcome {
        tracing::warn!("Interrupted by user");
        self.transition(RunState::Interrupted);
        RunOutcome::Interrupted(self.stats.clone())
    }

    fn transition(&mut self, next: RunState) {
        tracing::trace!(from = ?self.state, to = ?next, "run state change");
        self.state = next;
    }
}
