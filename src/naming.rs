//! Collision-avoiding file names for downloaded images
//!
//! Files are named `{id}_{name}_{NNNN}.{ext}` where `NNNN` is a random number in
//! 1000–9999. A name that already exists on disk is redrawn up to
//! [`MAX_RANDOM_ATTEMPTS`] times before falling back to the current Unix time.
//! The existence check is not atomic; the job assumes it is the only writer.

use crate::fetch::extract_extension;
use crate::types::{FranchiseeRow, ResolvedFile};
use rand::Rng;
use std::path::{Path, PathBuf};

/// Random suffixes tried before falling back to a timestamp
pub const MAX_RANDOM_ATTEMPTS: u32 = 100;

/// Replacement for empty components
const UNKNOWN: &str = "unknown";

/// Characters not allowed in file names on common filesystems
const FORBIDDEN: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Make one name component filesystem-safe
///
/// Each forbidden character becomes `_`, then surrounding whitespace is
/// trimmed. An empty result becomes `"unknown"`.
///
/// # Examples
///
/// ```
/// use franchise_logo_dl::naming::sanitize_component;
///
/// assert_eq!(sanitize_component("A/B:C"), "A_B_C");
/// assert_eq!(sanitize_component("   "), "unknown");
/// ```
#[must_use]
pub fn sanitize_component(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Allocates output paths inside one directory
#[derive(Clone, Debug)]
pub struct FilenameAllocator {
    output_dir: PathBuf,
}

impl FilenameAllocator {
    /// Allocate names under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory names are allocated in
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Pick a free path for the given row identity and extension
    pub fn allocate(&self, id: &str, name: &str, extension: &str) -> PathBuf {
        self.allocate_with_rng(id, name, extension, &mut rand::thread_rng())
    }

    /// Like [`allocate`](Self::allocate) with a caller-supplied random source
    pub fn allocate_with_rng<R: Rng + ?Sized>(
        &self,
        id: &str,
        name: &str,
        extension: &str,
        rng: &mut R,
    ) -> PathBuf {
        let id = sanitize_component(id);
        let name = sanitize_component(name);

        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let suffix: u32 = rng.gen_range(1000..=9999);
            let candidate = self.candidate(&id, &name, suffix, extension);
            if !candidate.exists() {
                return candidate;
            }
        }

        let timestamp = chrono::Utc::now().timestamp();
        tracing::debug!(
            id = %id,
            attempts = MAX_RANDOM_ATTEMPTS,
            "random suffixes exhausted, using timestamp"
        );
        self.candidate(&id, &name, timestamp, extension)
    }

    /// Resolve the local target for a row: extension from its image path plus a free name
    pub fn resolve(&self, row: &FranchiseeRow) -> ResolvedFile {
        let extension = extract_extension(row.image_path.as_deref().unwrap_or_default());
        let path = self.allocate(
            &row.id,
            row.name.as_deref().unwrap_or_default(),
            &extension,
        );
        ResolvedFile { path, extension }
    }

    fn candidate(
        &self,
        id: &str,
        name: &str,
        suffix: impl std::fmt::Display,
        extension: &str,
    ) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_{}.{}", id, name, suffix, extension))
    }
}
