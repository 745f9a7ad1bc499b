//! ZIP output through the `zip` crate.

use super::SourceFile;
use crate::error::{ArchiveError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Write `files` into a new ZIP archive at `output`
///
/// Level 0 stores entries uncompressed; 1-9 select the deflate level.
pub(super) fn write(
    output: &Path,
    files: &[SourceFile],
    level: u32,
    on_progress: &mut dyn FnMut(usize),
) -> Result<()> {
    let failed = |reason: String| ArchiveError::WriteFailed {
        archive: output.to_path_buf(),
        reason,
    };

    let options = if level == 0 {
        FileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level as i32))
    };

    let file = File::create(output)?;
    let mut writer = zip::ZipWriter::new(BufWriter::new(file));

    for (index, source) in files.iter().enumerate() {
        writer
            .start_file(source.entry_name.as_str(), options)
            .map_err(|e| failed(format!("cannot add {}: {}", source.entry_name, e)))?;
        let mut input = File::open(&source.path)?;
        std::io::copy(&mut input, &mut writer)?;
        on_progress(index + 1);
    }

    let mut inner = writer
        .finish()
        .map_err(|e| failed(format!("cannot finish archive: {}", e)))?;
    std::io::Write::flush(&mut inner)?;
    Ok(())
}
