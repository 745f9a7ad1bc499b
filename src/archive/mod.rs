//! Directory archiving (ZIP or gzip-compressed TAR)
//!
//! [`Archiver`] walks a source directory, writes every regular file into a
//! single archive under the output directory and reports size statistics.
//! A failed run never leaves a partial archive behind.

use crate::error::{ArchiveError, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};
use walkdir::WalkDir;

mod tar_writer;
mod zip_writer;

/// Files between progress lines
const PROGRESS_EVERY: usize = 50;

/// Highest accepted compression level
pub const MAX_LEVEL: u32 = 9;

/// Default compression level
pub const DEFAULT_LEVEL: u32 = 6;

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

/// Supported archive formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Deflate-compressed ZIP
    Zip,
    /// TAR stream compressed with gzip
    TarGz,
}

impl ArchiveFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    /// Accepts `zip`, `tar.gz`, `targz` and `tgz`, case-insensitively
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "targz" | "tgz" => Ok(ArchiveFormat::TarGz),
            _ => Err(ArchiveError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Statistics for a finished archive
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveReport {
    /// Path of the written archive
    pub archive: PathBuf,
    /// Regular files added
    pub file_count: usize,
    /// Sum of the source file sizes in bytes
    pub original_size: u64,
    /// Size of the archive in bytes
    pub compressed_size: u64,
}

impl ArchiveReport {
    /// Space saved in percent, see [`compression_ratio`]
    pub fn ratio(&self) -> f64 {
        compression_ratio(self.original_size, self.compressed_size)
    }
}

/// One regular file scheduled for the archive
#[derive(Clone, Debug)]
pub(crate) struct SourceFile {
    pub(crate) path: PathBuf,
    /// Path relative to the source root, `/`-separated
    pub(crate) entry_name: String,
    pub(crate) size: u64,
}

/// Archives one source directory into an output directory
#[derive(Clone, Debug)]
pub struct Archiver {
    source_dir: PathBuf,
    output_dir: PathBuf,
}

impl Archiver {
    /// Create an archiver, creating `output_dir` if needed
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            source_dir: source_dir.into(),
            output_dir,
        })
    }

    /// Directory being archived
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory archives are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the archive and return its statistics
    ///
    /// `output_name` defaults to `images_<YYYYMMDD_HHMMSS>.<ext>`. `level`
    /// (0-9) applies to ZIP only. On failure the partially written archive is
    /// removed before the error is returned.
    pub fn compress(
        &self,
        format: ArchiveFormat,
        output_name: Option<&str>,
        level: u32,
    ) -> Result<ArchiveReport> {
        if level > MAX_LEVEL {
            return Err(ArchiveError::InvalidLevel(level).into());
        }
        if !self.source_dir.is_dir() {
            error!(
                "Source directory not found: {}",
                self.source_dir.display()
            );
            return Err(ArchiveError::SourceMissing(self.source_dir.clone()).into());
        }

        let file_name = output_name
            .map(str::to_string)
            .unwrap_or_else(|| default_archive_name(format));
        let output_path = self.output_dir.join(file_name);

        let files = collect_files(&self.source_dir, &output_path)?;
        let original_size: u64 = files.iter().map(|f| f.size).sum();

        info!("{}", RULE);
        info!("Image folder compression started ({})", format);
        info!("{}", RULE);
        info!("Source directory: {}", self.source_dir.display());
        info!("File count: {}", files.len());
        info!("Total size: {}", format_size(original_size));
        if format == ArchiveFormat::Zip {
            info!("Compression level: {}/{}", level, MAX_LEVEL);
        }
        info!("Output file: {}", output_path.display());
        info!("{}", THIN_RULE);

        let total = files.len();
        let mut on_progress = |processed: usize| {
            if processed % PROGRESS_EVERY == 0 {
                info!(
                    "In progress: {}/{} ({:.1}%)",
                    processed,
                    total,
                    processed as f64 / total as f64 * 100.0
                );
            }
        };

        let written = match format {
            ArchiveFormat::Zip => zip_writer::write(&output_path, &files, level, &mut on_progress),
            ArchiveFormat::TarGz => tar_writer::write(&output_path, &files, &mut on_progress),
        };

        let compressed_size = match written.and_then(|()| Ok(std::fs::metadata(&output_path)?.len())) {
            Ok(size) => size,
            Err(e) => {
                error!("Compression failed: {}", e);
                remove_partial(&output_path);
                return Err(e);
            }
        };

        let report = ArchiveReport {
            archive: output_path,
            file_count: total,
            original_size,
            compressed_size,
        };

        info!("{}", THIN_RULE);
        info!("Compression complete");
        info!("Archive: {}", report.archive.display());
        info!("Original size: {}", format_size(report.original_size));
        info!("Compressed size: {}", format_size(report.compressed_size));
        info!("Compression ratio: {:.1}%", report.ratio());
        info!("{}", RULE);

        Ok(report)
    }
}

/// `images_<YYYYMMDD_HHMMSS>.<ext>` for the current local time
pub fn default_archive_name(format: ArchiveFormat) -> String {
    format!(
        "images_{}.{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Human-readable size with two decimals, from B up to TB
///
/// # Examples
///
/// ```
/// use franchise_logo_dl::archive::format_size;
///
/// assert_eq!(format_size(512), "512.00 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

/// Space saved in percent: `(1 - compressed / original) * 100`, 0 for an empty source
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

/// Every regular file under `root` in walk order, skipping `exclude`
fn collect_files(root: &Path, exclude: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to walk {}: {}",
                root.display(),
                e
            )))
        })?;
        if !entry.file_type().is_file() || entry.path() == exclude {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            entry_name,
            size,
        });
    }
    Ok(files)
}

fn remove_partial(path: &Path) {
    if path.exists()
        && let Err(e) = std::fs::remove_file(path)
    {
        error!("Failed to remove partial archive {}: {}", path.display(), e);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
