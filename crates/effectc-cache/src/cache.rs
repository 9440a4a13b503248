//! The persisted compile cache and its staleness predicate.
//!
//! The cache is a flat list of [`CacheEntry`] records keyed by source path,
//! loaded wholesale at the start of a pass and saved wholesale at the end.
//! Loading is fail-safe: a missing or corrupt cache file yields an empty
//! cache and a warning, never a pipeline failure. Saving is best-effort: on
//! I/O failure the prior on-disk state is left untouched and the cost is a
//! recompute on the next pass.

use std::{io, path::Path};

use crate::digest::Digest;

/// One record of what produced an artifact's output on some earlier pass.
///
/// Every field carries `#[serde(default)]` so an entry written by an older or
/// newer version of the tool deserializes without error; any field it lacked
/// defaults to a value that fails the staleness comparison, which demotes the
/// entry to "absent" rather than crashing the loader.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    /// Logical path of the source artifact. Unique key of the entry.
    #[serde(default)]
    pub source_path: String,
    /// Path of the generated shader output.
    #[serde(default)]
    pub output_path: String,
    /// Path of the generated preview sidecar. Empty means the last pass
    /// produced no sidecar (degraded thumbnail policy) and none is expected
    /// on disk.
    #[serde(default)]
    pub sidecar_path: String,
    /// Digest of the source artifact's bytes.
    #[serde(default)]
    pub source_digest: Digest,
    /// Digest of the shared template's bytes.
    #[serde(default)]
    pub template_digest: Digest,
    /// Digest of the shared core library's bytes.
    #[serde(default)]
    pub core_lib_digest: Digest,
    /// Generation semantics tag the output was produced with.
    #[serde(default)]
    pub generator_version: String,
}

/// The inputs this pass would build an artifact from.
///
/// Compared field-by-field against a [`CacheEntry`] by [`is_stale`].
#[derive(Debug, Clone)]
pub struct RebuildInputs<'pass> {
    /// Digest of the source artifact's bytes.
    pub source_digest: &'pass Digest,
    /// Digest of the shared template's bytes.
    pub template_digest: &'pass Digest,
    /// Digest of the shared core library's bytes.
    pub core_lib_digest: &'pass Digest,
    /// Current generation semantics tag.
    pub generator_version: &'pass str,
    /// Output path this pass would write.
    pub output_path: &'pass Path,
    /// Sidecar path this pass would write.
    pub sidecar_path: &'pass Path,
}

/// Decides whether an artifact must be rebuilt.
///
/// Pure function of the entry and the freshly computed inputs, re-evaluated
/// from scratch every pass. Stale iff the entry is absent, any digest or the
/// version tag differs, the paths this pass would produce differ from the
/// recorded ones, or a recorded output file is missing from disk.
///
/// A recorded empty `sidecar_path` means the last pass deliberately produced
/// no sidecar; in that case no sidecar file is required to exist.
#[must_use]
pub fn is_stale(entry: Option<&CacheEntry>, current: &RebuildInputs<'_>) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if !entry.source_digest.matches(current.source_digest)
        || !entry.template_digest.matches(current.template_digest)
        || !entry.core_lib_digest.matches(current.core_lib_digest)
        || entry.generator_version != current.generator_version
    {
        return true;
    }
    if Path::new(&entry.output_path) != current.output_path {
        return true;
    }
    if !entry.sidecar_path.is_empty() && Path::new(&entry.sidecar_path) != current.sidecar_path {
        return true;
    }
    if !Path::new(&entry.output_path).is_file() {
        return true;
    }
    if !entry.sidecar_path.is_empty() && !Path::new(&entry.sidecar_path).is_file() {
        return true;
    }
    false
}

/// In-memory form of the persisted cache file.
#[derive(Debug, Clone, Default)]
pub struct CompileCache {
    /// All entries, in no particular order, unique by `source_path`.
    entries: Vec<CacheEntry>,
}

impl CompileCache {
    /// Loads the cache from `path`.
    ///
    /// A missing or unparsable file yields an empty cache with a logged
    /// warning; this never fails the pipeline.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                if source.kind() != io::ErrorKind::NotFound {
                    log::warn!(
                        "could not read cache file '{}', starting empty: {source}",
                        path.display()
                    );
                }
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<CacheEntry>>(&text) {
            Ok(entries) => {
                log::debug!("loaded {} cache entries from '{}'", entries.len(), path.display());
                Self { entries }
            }
            Err(source) => {
                log::warn!(
                    "cache file '{}' is not valid, starting empty: {source}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Returns the entry recorded for `source_path`, if any.
    #[must_use]
    pub fn get(&self, source_path: &str) -> Option<&CacheEntry> {
        self.entries
            .iter()
            .find(|entry| entry.source_path == source_path)
    }

    /// Inserts or replaces the entry keyed by its `source_path`.
    ///
    /// An entry with an empty `source_path` is rejected as a no-op.
    pub fn put(&mut self, entry: CacheEntry) {
        if entry.source_path.is_empty() {
            log::warn!("refusing to cache an entry with an empty source path");
            return;
        }
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|existing| existing.source_path == entry.source_path)
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves all entries to `path`, creating parent directories as needed.
    ///
    /// Writes to a sibling temp file first and renames it into place, so a
    /// failed save leaves the previous on-disk cache untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure. Callers are expected
    /// to log and continue; the in-memory cache is not authoritative storage.
    pub fn save(&self, path: &Path) -> Result<(), SaveCacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SaveCacheError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        let json =
            serde_json::to_string_pretty(&self.entries).map_err(SaveCacheError::Serialize)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, json).map_err(|source| SaveCacheError::Io {
            path: staging.display().to_string(),
            source,
        })?;
        std::fs::rename(&staging, path).map_err(|source| SaveCacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("saved {} cache entries to '{}'", self.entries.len(), path.display());
        Ok(())
    }
}

/// An error indicating that persisting the cache failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SaveCacheError {
    /// The entry list could not be serialized.
    #[error("could not serialize cache entries: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Writing or renaming the cache file failed.
    #[error("could not write cache file '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
}
