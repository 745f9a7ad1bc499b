//! Per-batch and per-row processing

use super::BatchRunner;
use crate::db::RowSource;
use crate::error::{Error, Result};
use crate::fetch::resolve_url;
use crate::types::{Batch, FranchiseeRow};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// How a batch ended
#[derive(Debug, PartialEq, Eq)]
pub(super) enum BatchEnd {
    /// Every row of the page was processed (or the page was skipped)
    Finished,
    /// Cancellation was observed before the batch was done
    Interrupted,
}

impl BatchRunner {
    pub(super) async fn process_batch(
        &mut self,
        source: &dyn RowSource,
        batch: Batch,
        cancel: &CancellationToken,
    ) -> BatchEnd {
        tracing::info!(
            "Batch {}/{} started (offset: {}, limit: {})",
            batch.index,
            batch.total_batches,
            batch.offset,
            batch.limit
        );

        let rows = tokio::select! {
            biased;
            _ = cancel.cancelled() => return BatchEnd::Interrupted,
            page = source.fetch_page(batch.offset, batch.limit) => match page {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(
                        batch = batch.index,
                        offset = batch.offset,
                        error = %e,
                        "Page fetch failed, skipping batch"
                    );
                    Vec::new()
                }
            },
        };

        if rows.is_empty() {
            tracing::warn!("Batch {} returned no rows", batch.index);
            return BatchEnd::Finished;
        }

        let in_batch = rows.len();
        let mut batch_success = 0u64;
        let mut batch_failed = 0u64;

        for (position, row) in rows.iter().enumerate() {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return BatchEnd::Interrupted,
                outcome = self.process_row(row) => outcome,
            };

            match outcome {
                Ok(path) => {
                    batch_success += 1;
                    self.stats.record_success();
                    tracing::info!(
                        fr_id = %row.id,
                        file = %path.file_name().unwrap_or_default().to_string_lossy(),
                        "Saved"
                    );
                }
                Err(e) => {
                    batch_failed += 1;
                    self.stats.record_failure(row.id.clone());
                    log_row_failure(row, &e);
                }
            }

            let processed = position + 1;
            if processed % self.progress_interval == 0 {
                self.report_progress(processed, in_batch);
            }
        }

        tracing::info!(
            "Batch {} finished - success: {}, failed: {}",
            batch.index,
            batch_success,
            batch_failed
        );
        BatchEnd::Finished
    }

    /// Resolve, fetch, allocate and write one row's image
    async fn process_row(&self, row: &FranchiseeRow) -> Result<PathBuf> {
        let url = resolve_url(&self.base_url, row.image_path.as_deref()).ok_or_else(|| {
            Error::Resolution { id: row.id.clone() }
        })?;

        let bytes = self.fetcher.fetch(&url).await?;

        let target = self.allocator.resolve(row);
        tokio::fs::write(&target.path, &bytes)
            .await
            .map_err(|source| Error::Persist {
                path: target.path.clone(),
                source,
            })?;

        Ok(target.path)
    }
}

fn log_row_failure(row: &FranchiseeRow, error: &Error) {
    match error {
        Error::Resolution { .. } => {
            tracing::warn!(fr_id = %row.id, "Image path is empty, skipping");
        }
        Error::Fetch(e) => {
            tracing::error!(fr_id = %row.id, url = %e.url(), error = %e, "Download failed");
        }
        Error::Persist { path, source } => {
            tracing::error!(
                fr_id = %row.id,
                path = %path.display(),
                error = %source,
                "Failed to save image"
            );
        }
        other => {
            tracing::error!(fr_id = %row.id, error = %other, "Row processing failed");
        }
    }
}
