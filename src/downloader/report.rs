//! Progress and summary reporting

use super::BatchRunner;
use std::time::Duration;

const RULE: &str = "============================================================";

impl BatchRunner {
    pub(super) fn report_progress(&self, processed: usize, in_batch: usize) {
        tracing::info!(
            "Progress: {}/{} ({:.1}%)",
            processed,
            in_batch,
            percentage(processed as u64, in_batch as u64)
        );
    }

    pub(super) fn report_summary(&self, elapsed: Duration) {
        let stats = &self.stats;
        tracing::info!("{}", RULE);
        tracing::info!("Download finished");
        tracing::info!("Total: {}", stats.total);
        tracing::info!("Success: {}", stats.success);
        tracing::info!("Failed: {}", stats.failed);
        if stats.processed() != stats.total {
            tracing::warn!(
                "Processed: {} of {} (skipped pages not counted)",
                stats.processed(),
                stats.total
            );
        }
        tracing::info!("Elapsed: {:.2}s", elapsed.as_secs_f64());
        if !stats.failed_ids.is_empty() {
            tracing::info!("Failed ids: {}", stats.failed_ids.join(", "));
        }
        tracing::info!("{}", RULE);
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
