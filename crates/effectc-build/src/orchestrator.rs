//! The build pass: discover artifacts, decide staleness, regenerate, and
//! record the results.
//!
//! One pass is a single-threaded sequential walk over the discovered
//! artifact set. Failures are isolated per artifact — a skipped artifact
//! keeps its old cache entry (or none), so it is retried and re-reported on
//! the next pass. Only a missing shared input (template, core library)
//! aborts the pass before any artifact is touched, because every output's
//! correctness depends on both.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use effectc_cache::{
    cache::{is_stale, CacheEntry, CompileCache, RebuildInputs},
    digest::Digest,
};
use effectc_gen::{
    generate::{generate, GenerateError},
    line_map::LineMap,
    template::Template,
    validate::{validate, ValidateError},
    GENERATOR_VERSION,
};

use crate::{
    collab::{AuxInputs, ImportError, ProgramImporter, ThumbnailRenderer},
    config::BuildConfig,
};

/// File extension of source artifacts.
pub const SOURCE_EXTENSION: &str = "effect";

/// Suffix of generated program outputs.
pub const OUTPUT_SUFFIX: &str = "gen.shader";

/// Suffix of generated preview sidecars.
pub const SIDECAR_SUFFIX: &str = "thumb.png";

/// Outcome counts of one build pass.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Artifacts regenerated this pass.
    pub built: usize,
    /// Artifacts whose cache entries were still valid.
    pub up_to_date: usize,
    /// Artifacts skipped with an error, itemized.
    pub skipped: Vec<SkippedArtifact>,
}

impl BuildSummary {
    /// Total number of artifacts considered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.built + self.up_to_date + self.skipped.len()
    }
}

/// One artifact that was skipped, with the reason.
#[derive(Debug)]
pub struct SkippedArtifact {
    /// Logical path of the skipped source artifact.
    pub source_path: String,
    /// Why it was skipped.
    pub error: ArtifactError,
}

/// Runs build passes over a project with the given collaborators.
pub struct BuildOrchestrator<I, R> {
    /// Resolved build configuration.
    config: BuildConfig,
    /// The external import/compile collaborator.
    importer: I,
    /// The external thumbnail collaborator.
    renderer: R,
    /// Checked between artifacts; set to stop the pass early.
    cancel: Arc<AtomicBool>,
}

impl<I, R> BuildOrchestrator<I, R>
where
    I: ProgramImporter,
    R: ThumbnailRenderer,
{
    /// Creates an orchestrator over the given configuration and
    /// collaborators.
    pub fn new(config: BuildConfig, importer: I, renderer: R) -> Self {
        Self {
            config,
            importer,
            renderer,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the cancellation flag. Setting it stops the pass before the
    /// next artifact; the artifact in flight is finished normally.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Runs one full pass: enumerate, rebuild what is stale, persist the
    /// cache exactly once at the end.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] only for conditions that invalidate the
    /// whole pass (missing template or core library, unusable source or
    /// output directory). Per-artifact failures land in the summary instead.
    pub fn run(&mut self) -> Result<BuildSummary, FatalError> {
        // shared inputs first: every artifact depends on both digests
        let template = self.load_template()?;
        let template_digest = Digest::of_bytes(template.text());

        let core_lib_digest = Digest::of_file(&self.config.core_lib_path);
        if core_lib_digest.is_missing() {
            return Err(FatalError::MissingCoreLib {
                path: self.config.core_lib_path.display().to_string(),
            });
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            FatalError::CreateOutputDir {
                path: self.config.output_dir.display().to_string(),
                source,
            }
        })?;

        let mut cache = CompileCache::load(&self.config.cache_path);
        let artifacts = self.discover_artifacts()?;
        log::info!(
            "considering {} artifact(s) in '{}'",
            artifacts.len(),
            self.config.source_dir.display()
        );

        let mut summary = BuildSummary::default();
        let mut claimed_outputs: HashMap<PathBuf, String> = HashMap::new();

        for path in artifacts {
            if self.cancel.load(Ordering::Relaxed) {
                log::info!("cancellation requested, stopping before '{}'", path.display());
                break;
            }
            let source_path = path.display().to_string();
            match self.process_artifact(
                &path,
                &template,
                &template_digest,
                &core_lib_digest,
                &mut cache,
                &mut claimed_outputs,
            ) {
                Ok(Outcome::Built) => {
                    log::info!("built '{source_path}'");
                    summary.built += 1;
                }
                Ok(Outcome::UpToDate) => {
                    log::debug!("'{source_path}' is up to date");
                    summary.up_to_date += 1;
                }
                Err(error) => {
                    log::error!("skipping '{source_path}': {error}");
                    summary.skipped.push(SkippedArtifact { source_path, error });
                }
            }
        }

        // exactly one save per pass, no matter how many artifacts failed
        if let Err(source) = cache.save(&self.config.cache_path) {
            log::warn!(
                "could not persist cache to '{}': {source}",
                self.config.cache_path.display()
            );
        }

        log::info!(
            "pass finished: {} built, {} up to date, {} skipped",
            summary.built,
            summary.up_to_date,
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Loads the configured template, or the embedded default when none is
    /// configured.
    fn load_template(&self) -> Result<Template, FatalError> {
        match &self.config.template_path {
            None => Ok(Template::embedded()),
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => {
                    let template = Template::from_text(text);
                    if !template.has_placeholders() {
                        log::warn!(
                            "template '{}' is missing placeholder tokens",
                            path.display()
                        );
                    }
                    Ok(template)
                }
                Err(source) => Err(FatalError::MissingTemplate {
                    path: path.display().to_string(),
                    source,
                }),
            },
        }
    }

    /// Enumerates `.effect` files in the source directory, sorted for a
    /// deterministic pass order.
    fn discover_artifacts(&self) -> Result<Vec<PathBuf>, FatalError> {
        let entries = std::fs::read_dir(&self.config.source_dir).map_err(|source| {
            FatalError::ReadSourceDir {
                path: self.config.source_dir.display().to_string(),
                source,
            }
        })?;
        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FatalError::ReadSourceDir {
                path: self.config.source_dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                artifacts.push(path);
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }

    /// Drives one artifact through the per-artifact state machine.
    fn process_artifact(
        &mut self,
        path: &Path,
        template: &Template,
        template_digest: &Digest,
        core_lib_digest: &Digest,
        cache: &mut CompileCache,
        claimed_outputs: &mut HashMap<PathBuf, String>,
    ) -> Result<Outcome, ArtifactError> {
        let source_path = path.display().to_string();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or(ArtifactError::InvalidName)?;
        let normalized = normalize_stem(stem);
        let output_path = self
            .config
            .output_dir
            .join(format!("{normalized}.{OUTPUT_SUFFIX}"));
        let sidecar_path = self
            .config
            .output_dir
            .join(format!("{normalized}.{SIDECAR_SUFFIX}"));

        // two distinct artifacts must never fight over one output file
        if let Some(first_source) = claimed_outputs.get(&output_path) {
            return Err(ArtifactError::DuplicateOutputPath {
                path: output_path.display().to_string(),
                first_source: first_source.clone(),
            });
        }
        claimed_outputs.insert(output_path.clone(), source_path.clone());

        let source_text =
            std::fs::read_to_string(path).map_err(ArtifactError::UnreadableSource)?;
        let source_digest = Digest::of_bytes(&source_text);

        let current = RebuildInputs {
            source_digest: &source_digest,
            template_digest,
            core_lib_digest,
            generator_version: GENERATOR_VERSION,
            output_path: &output_path,
            sidecar_path: &sidecar_path,
        };
        if !is_stale(cache.get(&source_path), &current) {
            return Ok(Outcome::UpToDate);
        }

        validate(&source_text)?;
        let unit = generate(&source_text, stem, template)?;

        std::fs::write(&output_path, &unit.output).map_err(|source| {
            ArtifactError::WriteOutput {
                path: output_path.display().to_string(),
                source,
            }
        })?;

        let handle = match self.importer.import(&unit.output, &output_path) {
            Ok(handle) => handle,
            Err(error) => {
                if let ImportError::Compile { diagnostics } = &error {
                    report_diagnostics(&source_path, &unit.line_map, diagnostics);
                }
                return Err(error.into());
            }
        };
        if !handle.is_loadable() {
            return Err(ArtifactError::ProgramNotLoadable {
                path: handle.path.display().to_string(),
            });
        }

        let aux = AuxInputs::discover(&self.config.source_dir, stem);
        let recorded_sidecar =
            match self
                .renderer
                .render(&handle, &aux, self.config.thumbnail_width)
            {
                Some(thumbnail) => match std::fs::write(&sidecar_path, thumbnail.bytes) {
                    Ok(()) => sidecar_path.display().to_string(),
                    Err(source) => {
                        log::warn!(
                            "could not write sidecar '{}': {source}",
                            sidecar_path.display()
                        );
                        String::new()
                    }
                },
                None => {
                    log::warn!("no thumbnail produced for '{source_path}'");
                    String::new()
                }
            };

        cache.put(CacheEntry {
            source_path,
            output_path: output_path.display().to_string(),
            sidecar_path: recorded_sidecar,
            source_digest,
            template_digest: template_digest.clone(),
            core_lib_digest: core_lib_digest.clone(),
            generator_version: GENERATOR_VERSION.to_owned(),
        });
        Ok(Outcome::Built)
    }
}

/// Terminal state of one artifact that was not skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The artifact was regenerated and its cache entry refreshed.
    Built,
    /// The cache entry was still valid; nothing was written.
    UpToDate,
}

/// Logs import diagnostics against the author's source lines.
fn report_diagnostics(source_path: &str, map: &LineMap, diagnostics: &[crate::collab::Diagnostic]) {
    for diagnostic in diagnostics {
        let line = map.translate(diagnostic.line).source_line();
        if line == 0 {
            log::error!(
                "{source_path}: (generated boilerplate, output line {}): {}",
                diagnostic.line,
                diagnostic.message
            );
        } else {
            log::error!("{source_path}:{line}: {}", diagnostic.message);
        }
    }
}

/// Derives the output file stem: ASCII-lowercased, anything that is not
/// alphanumeric collapsed to `_`. Two sources may normalize to the same
/// stem; the collision check rejects the second.
fn normalize_stem(stem: &str) -> String {
    stem.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// An error that aborts the whole pass before or during artifact
/// processing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FatalError {
    /// The configured template file is missing or unreadable.
    #[error("template '{path}' is missing or unreadable: {source}")]
    MissingTemplate {
        /// Path of the template file.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The shared core library file is missing or unreadable.
    #[error("core library '{path}' is missing or unreadable")]
    MissingCoreLib {
        /// Path of the core library file.
        path: String,
    },
    /// The source directory cannot be enumerated.
    #[error("could not read source directory '{path}': {source}")]
    ReadSourceDir {
        /// Path of the source directory.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The output directory cannot be created.
    #[error("could not create output directory '{path}': {source}")]
    CreateOutputDir {
        /// Path of the output directory.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
}

/// An error that skips one artifact and leaves the rest of the pass
/// untouched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArtifactError {
    /// The artifact file name has no usable stem.
    #[error("artifact has no usable file name")]
    InvalidName,
    /// The artifact file could not be read.
    #[error("could not read source: {0}")]
    UnreadableSource(#[source] io::Error),
    /// The artifact failed structural validation.
    #[error(transparent)]
    Validate(#[from] ValidateError),
    /// Generation failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),
    /// Another artifact already claimed the same output path.
    #[error("output path '{path}' already claimed by '{first_source}'")]
    DuplicateOutputPath {
        /// The contested output path.
        path: String,
        /// The artifact that claimed it first.
        first_source: String,
    },
    /// The generated output could not be written.
    #[error("could not write output '{path}': {source}")]
    WriteOutput {
        /// Path of the output file.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The import/compile collaborator failed.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// The import step reported success but the program is not loadable.
    #[error("program at '{path}' is not loadable after import")]
    ProgramNotLoadable {
        /// Path the program was expected at.
        path: String,
    },
}
