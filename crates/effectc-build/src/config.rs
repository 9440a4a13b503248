//! Build configuration: defaults, the project's `effectc.toml`, and CLI
//! overrides, merged in that order.

use std::path::{Path, PathBuf};

use effectc_cache::{default_cache_dir, digest::Digest, CacheDirError};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE: &str = "effectc.toml";

/// Fully resolved configuration of one build pass.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned for `.effect` source artifacts.
    pub source_dir: PathBuf,
    /// Directory generated outputs and sidecars are written to.
    pub output_dir: PathBuf,
    /// Path of a custom template, or `None` for the embedded default.
    pub template_path: Option<PathBuf>,
    /// Path of the shared core library whose digest participates in
    /// staleness. The file's content is consumed by the external compile
    /// step, never by this pipeline.
    pub core_lib_path: PathBuf,
    /// Path of the persisted cache file.
    pub cache_path: PathBuf,
    /// Width of rendered preview thumbnails, in pixels.
    pub thumbnail_width: u32,
}

impl BuildConfig {
    /// Resolves the configuration for a project directory: built-in defaults,
    /// patched by `effectc.toml` if present, patched by `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory is not valid, the config
    /// file is present but unparsable, or no cache directory is available.
    pub fn resolve(
        project_dir: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let project_dir = dunce::canonicalize(project_dir).map_err(|source| {
            ConfigError::InvalidProjectDir {
                path: project_dir.display().to_string(),
                source,
            }
        })?;

        let mut config = Self::defaults(&project_dir)?;

        let file = project_dir.join(CONFIG_FILE);
        if file.is_file() {
            let text = std::fs::read_to_string(&file).map_err(|source| ConfigError::ReadFile {
                path: file.display().to_string(),
                source,
            })?;
            let parsed: FileConfig =
                toml::from_str(&text).map_err(|source| ConfigError::ParseFile {
                    path: file.display().to_string(),
                    source: Box::new(source),
                })?;
            log::debug!("applying config from '{}': {parsed:?}", file.display());
            parsed.apply(&mut config, &project_dir);
        }

        overrides.clone().into_file_config().apply(&mut config, &project_dir);
        log::debug!("resolved build config: {config:#?}");
        Ok(config)
    }

    /// Built-in defaults for a project directory.
    fn defaults(project_dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            source_dir: project_dir.join("effects"),
            output_dir: project_dir.join("generated"),
            template_path: None,
            core_lib_path: project_dir.join("effect.core"),
            cache_path: default_cache_file(project_dir)?,
            thumbnail_width: 128,
        })
    }
}

/// Default location of the cache file for a project: one file per project
/// under the user cache directory, named by a digest of the project path so
/// distinct projects never share cache state.
fn default_cache_file(project_dir: &Path) -> Result<PathBuf, ConfigError> {
    let digest = Digest::of_bytes(project_dir.display().to_string());
    let short = digest.to_string().chars().take(16).collect::<String>();
    Ok(default_cache_dir()?.join(format!("{short}.json")))
}

/// The shape of `effectc.toml`. Every field is optional; absent fields keep
/// their current value.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Overrides [`BuildConfig::source_dir`].
    pub source_dir: Option<PathBuf>,
    /// Overrides [`BuildConfig::output_dir`].
    pub output_dir: Option<PathBuf>,
    /// Overrides [`BuildConfig::template_path`].
    pub template: Option<PathBuf>,
    /// Overrides [`BuildConfig::core_lib_path`].
    pub core_lib: Option<PathBuf>,
    /// Overrides [`BuildConfig::cache_path`].
    pub cache_file: Option<PathBuf>,
    /// Overrides [`BuildConfig::thumbnail_width`].
    pub thumbnail_width: Option<u32>,
}

impl FileConfig {
    /// Applies every present field onto `config`, resolving relative paths
    /// against the project directory.
    fn apply(self, config: &mut BuildConfig, project_dir: &Path) {
        let anchor = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                project_dir.join(path)
            }
        };
        if let Some(source_dir) = self.source_dir {
            config.source_dir = anchor(source_dir);
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = anchor(output_dir);
        }
        if let Some(template) = self.template {
            config.template_path = Some(anchor(template));
        }
        if let Some(core_lib) = self.core_lib {
            config.core_lib_path = anchor(core_lib);
        }
        if let Some(cache_file) = self.cache_file {
            config.cache_path = anchor(cache_file);
        }
        if let Some(thumbnail_width) = self.thumbnail_width {
            config.thumbnail_width = thumbnail_width;
        }
    }
}

/// CLI-facing overrides; the highest-precedence config layer.
#[derive(Debug, Clone, Default, clap::Parser)]
#[non_exhaustive]
pub struct ConfigOverrides {
    /// Directory scanned for `.effect` sources.
    #[clap(long)]
    pub source_dir: Option<PathBuf>,

    /// Directory generated outputs are written to.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Custom template file to expand into.
    #[clap(long)]
    pub template: Option<PathBuf>,

    /// Shared core library file participating in staleness.
    #[clap(long)]
    pub core_lib: Option<PathBuf>,

    /// Persisted cache file location.
    #[clap(long)]
    pub cache_file: Option<PathBuf>,

    /// Width of rendered preview thumbnails, in pixels.
    #[clap(long)]
    pub thumbnail_width: Option<u32>,
}

impl ConfigOverrides {
    /// Converts into the common patch representation.
    fn into_file_config(self) -> FileConfig {
        FileConfig {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            template: self.template,
            core_lib: self.core_lib,
            cache_file: self.cache_file,
            thumbnail_width: self.thumbnail_width,
        }
    }
}

/// An error indicating that the configuration could not be resolved.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The project directory does not exist or cannot be canonicalized.
    #[error("project directory '{path}' is not valid: {source}")]
    InvalidProjectDir {
        /// The offending path.
        path: String,
        /// Source of the error.
        source: std::io::Error,
    },
    /// The config file exists but could not be read.
    #[error("could not read config file '{path}': {source}")]
    ReadFile {
        /// Path of the config file.
        path: String,
        /// Source of the error.
        source: std::io::Error,
    },
    /// The config file exists but is not valid TOML.
    #[error("could not parse config file '{path}': {source}")]
    ParseFile {
        /// Path of the config file.
        path: String,
        /// Source of the error.
        source: Box<toml::de::Error>,
    },
    /// No user cache directory is available for the default cache file.
    #[error(transparent)]
    NoCacheDir(#[from] CacheDirError),
}
