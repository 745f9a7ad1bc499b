//! Core types for franchise-logo-dl

use serde::Serialize;
use sqlx::FromRow;
use std::path::PathBuf;

/// One row of the `FRANCHISEE` table as consumed by the download job
///
/// The identifier is read as text so the job stays agnostic of the column's
/// numeric or string type.
#[derive(Clone, Debug, PartialEq, Eq, FromRow)]
pub struct FranchiseeRow {
    /// `FR_ID`
    pub id: String,
    /// `FR_NM`
    pub name: Option<String>,
    /// `logoImageUrl`, relative to the configured base URL
    pub image_path: Option<String>,
}

impl FranchiseeRow {
    /// Convenience constructor, mostly for tests and fixtures
    pub fn new(id: impl Into<String>, name: impl Into<String>, image_path: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            image_path: image_path.map(str::to_string),
        }
    }
}

/// One offset/limit page of the run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Row offset of the page
    pub offset: u64,
    /// Rows requested
    pub limit: u64,
    /// 1-based ordinal
    pub index: u64,
    /// Number of batches in the run
    pub total_batches: u64,
}

impl Batch {
    /// Split `total_count` rows into pages of `batch_size`.
    ///
    /// Every batch requests a full `batch_size`; the store returns fewer rows for
    /// the final page. Returns no batches when `total_count` or `batch_size` is 0.
    pub fn plan(total_count: u64, batch_size: u64) -> Vec<Batch> {
        if total_count == 0 || batch_size == 0 {
            return Vec::new();
        }
        let total_batches = total_count.div_ceil(batch_size);
        (1..=total_batches)
            .map(|index| Batch {
                offset: (index - 1) * batch_size,
                limit: batch_size,
                index,
                total_batches,
            })
            .collect()
    }
}

/// Outcome accounting for one run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Rows matching the filter at count time
    pub total: u64,
    /// Rows whose image was saved
    pub success: u64,
    /// Rows that failed resolution, fetch, or write
    pub failed: u64,
    /// Identifiers of failed rows, in processing order
    pub failed_ids: Vec<String>,
}

impl RunStats {
    /// Start accounting for `total` rows
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Record a saved row
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    /// Record a failed row
    pub fn record_failure(&mut self, id: impl Into<String>) {
        self.failed += 1;
        self.failed_ids.push(id.into());
    }

    /// Rows processed so far
    pub fn processed(&self) -> u64 {
        self.success + self.failed
    }
}

/// Lifecycle of a download run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing acquired yet
    NotStarted,
    /// Connection established, count not yet issued
    Connected,
    /// Count known, iterating batches
    Paginating,
    /// Processing the rows of one batch
    Fetching {
        /// 1-based batch ordinal
        batch: u64,
    },
    /// All batches processed
    Completed,
    /// Stopped by a termination signal
    Interrupted,
    /// Connection or count query failed
    Failed,
}

/// Local target for one downloaded image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Full path under the output directory
    pub path: PathBuf,
    /// Lower-case extension without the dot
    pub extension: String,
}

/// How a run ended, when it did not fail outright
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// All batches processed; the summary was reported
    Completed(RunStats),
    /// A termination signal stopped the run; no summary was reported
    Interrupted(RunStats),
}

impl RunOutcome {
    /// Statistics accumulated up to the end of the run
    pub fn stats(&self) -> &RunStats {
        match self {
            RunOutcome::Completed(stats) | RunOutcome::Interrupted(stats) => stats,
        }
    }
}
