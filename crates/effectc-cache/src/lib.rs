//! Content-addressed compile cache for `effectc`.
//!
//! This library answers one question per source artifact: "does the output
//! from the last pass still match what this pass would produce?". It does so
//! by recording, per artifact, the digests of everything that fed into the
//! output (the artifact itself, the shared template, the shared core library)
//! plus a generator version tag, and comparing them against freshly computed
//! values on the next pass.
//!
//! The cache is persisted as a single JSON file and is deliberately
//! non-authoritative: losing it only costs a recompute, never correctness.

pub mod cache;
pub mod digest;

use std::path::PathBuf;

/// Returns the default directory for the persisted cache file.
///
/// Possible values by OS are:
/// * Windows: `C:/users/<user>/AppData/Local/effectc`
/// * Mac: `~/Library/Caches/effectc`
/// * Linux: `~/.cache/effectc`
///
/// # Errors
///
/// Fails if there is no cache directory available.
#[inline]
pub fn default_cache_dir() -> Result<PathBuf, CacheDirError> {
    let dir = directories::BaseDirs::new()
        .ok_or(CacheDirError(()))?
        .cache_dir()
        .join("effectc");
    Ok(dir)
}

/// An error indicating that there is no cache directory available.
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not find cache directory")]
pub struct CacheDirError(());
