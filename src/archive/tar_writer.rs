//! gzip-compressed TAR output through `tar` and `flate2`.

use super::SourceFile;
use crate::error::{ArchiveError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::Path;

/// Write `files` into a new `.tar.gz` archive at `output`
pub(super) fn write(
    output: &Path,
    files: &[SourceFile],
    on_progress: &mut dyn FnMut(usize),
) -> Result<()> {
    let failed = |reason: String| ArchiveError::WriteFailed {
        archive: output.to_path_buf(),
        reason,
    };

    let file = File::create(output)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (index, source) in files.iter().enumerate() {
        builder
            .append_path_with_name(&source.path, &source.entry_name)
            .map_err(|e| failed(format!("cannot add {}: {}", source.entry_name, e)))?;
        on_progress(index + 1);
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| failed(format!("cannot finish tar stream: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| failed(format!("cannot finish gzip stream: {}", e)))?;
    Ok(())
}
