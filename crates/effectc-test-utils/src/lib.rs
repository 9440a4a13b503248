//! Utilities for tests of the `effectc` crates.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A minimal simplified source that passes validation: one property and the
/// mandatory entry function.
pub const MINIMAL_EFFECT: &str =
    "_Speed (\"Speed\", Float) = 2.5\nfloat4 EffectMain(){ return 0; }\n";

/// A throwaway project directory with the layout the build pipeline expects:
/// an `effects/` source directory, a core library file, and room for outputs
/// and the cache file.
///
/// The directory is deleted on drop, except when panic unwinding, so failed
/// tests can be debugged.
#[must_use]
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Creates the project skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp directory or any of the skeleton files
    /// cannot be created.
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        std::fs::create_dir(dir.path().join("effects"))?;
        std::fs::write(dir.path().join("effect.core"), "// shared core library\n")?;
        Ok(Self { dir })
    }

    /// Root of the project directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The source directory holding `.effect` files.
    pub fn source_dir(&self) -> PathBuf {
        self.dir.path().join("effects")
    }

    /// The directory generated outputs are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("generated")
    }

    /// Path of the shared core library file.
    pub fn core_lib_path(&self) -> PathBuf {
        self.dir.path().join("effect.core")
    }

    /// Path of the persisted cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("cache.json")
    }

    /// Writes an effect source file and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_effect(&self, name: &str, source: &str) -> anyhow::Result<PathBuf> {
        let path = self.source_dir().join(format!("{name}.effect"));
        std::fs::write(&path, source)?;
        Ok(path)
    }

    /// Writes a custom template file and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_template(&self, text: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join("effect.template");
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

impl Drop for TestProject {
    fn drop(&mut self) {
        // when a test fails, keep the directory around for inspection
        if std::thread::panicking() {
            self.dir.disable_cleanup(true);
        }
    }
}
