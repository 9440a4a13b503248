//! Interfaces to the external collaborators of the pipeline.
//!
//! The pipeline itself never compiles a program or renders a bitmap; it
//! hands generated text to a [`ProgramImporter`] and a compiled program to a
//! [`ThumbnailRenderer`]. The traits are the whole contract: the real
//! implementations live in the host environment, and the defaults here are
//! the degenerate stand-ins a bare CLI run uses.

use std::{io, path::{Path, PathBuf}};

/// Handle to a compiled program made loadable by the import step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHandle {
    /// Path the compiled program is loadable from.
    pub path: PathBuf,
}

impl ProgramHandle {
    /// Returns `true` if the program is actually loadable. A handle that is
    /// not loadable after a "successful" import is an artifact-level
    /// failure.
    #[must_use]
    pub fn is_loadable(&self) -> bool {
        self.path.is_file()
    }
}

/// One compiler diagnostic reported by the import step, with a line number
/// in the *generated output*. The orchestrator translates it back to the
/// author's source line before reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line in the generated output.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
}

/// An error indicating that the import/compile step failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The importer could not read or write what it needed.
    #[error("import I/O failure at '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Source of the error.
        source: io::Error,
    },
    /// The generated program did not compile.
    #[error("program failed to compile with {} diagnostic(s)", .diagnostics.len())]
    Compile {
        /// Diagnostics with generated-output line numbers.
        diagnostics: Vec<Diagnostic>,
    },
}

/// The external import/compile step: takes generated program text and a
/// target path, and makes a compiled program loadable at that path.
pub trait ProgramImporter {
    /// Imports the generated text written at `output_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the program could not be imported or compiled.
    fn import(&mut self, generated: &str, output_path: &Path)
        -> Result<ProgramHandle, ImportError>;
}

/// Optional auxiliary texture inputs for thumbnail rendering, derived from a
/// scan/depth image pair sitting next to the source artifact.
#[derive(Debug, Clone, Default)]
pub struct AuxInputs {
    /// Cartoonized scan texture, if present.
    pub scan: Option<PathBuf>,
    /// Depth texture, if present.
    pub depth: Option<PathBuf>,
}

impl AuxInputs {
    /// Looks for `<stem>.scan.png` and `<stem>.depth.png` next to the source
    /// artifact.
    #[must_use]
    pub fn discover(source_dir: &Path, stem: &str) -> Self {
        let candidate = |suffix: &str| {
            let path = source_dir.join(format!("{stem}.{suffix}.png"));
            path.is_file().then_some(path)
        };
        Self {
            scan: candidate("scan"),
            depth: candidate("depth"),
        }
    }
}

/// An encoded preview bitmap produced by the renderer.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Encoded image bytes, written verbatim to the sidecar path.
    pub bytes: Vec<u8>,
}

/// The external preview renderer: turns a compiled program plus up to two
/// auxiliary textures into a thumbnail bitmap.
///
/// Returning `None` means the renderer could not produce a bitmap (for
/// example the program handle went missing). That is a degraded outcome,
/// never an artifact failure.
pub trait ThumbnailRenderer {
    /// Renders a preview of `program` at the given width.
    fn render(&mut self, program: &ProgramHandle, aux: &AuxInputs, width: u32)
        -> Option<Thumbnail>;
}

/// Importer used by bare CLI runs: the written text file itself is declared
/// to be the loadable program. The real compile step is an external system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImporter;

impl ProgramImporter for FileImporter {
    #[inline]
    fn import(
        &mut self,
        _generated: &str,
        output_path: &Path,
    ) -> Result<ProgramHandle, ImportError> {
        Ok(ProgramHandle {
            path: output_path.to_path_buf(),
        })
    }
}

/// Renderer used by bare CLI runs: never produces a thumbnail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThumbnail;

impl ThumbnailRenderer for NoThumbnail {
    #[inline]
    fn render(&mut self, _program: &ProgramHandle, _aux: &AuxInputs, _width: u32)
        -> Option<Thumbnail> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn file_importer_points_at_the_written_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("wave.gen.shader");
        std::fs::write(&output, "generated").unwrap();

        let handle = FileImporter.import("generated", &output).unwrap();
        assert_eq!(handle.path, output);
        assert!(handle.is_loadable());
    }

    #[test_log::test]
    fn handle_to_missing_file_is_not_loadable() {
        let handle = ProgramHandle {
            path: PathBuf::from("/nowhere/wave.gen.shader"),
        };
        assert!(!handle.is_loadable());
    }

    #[test_log::test]
    fn aux_inputs_discovered_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wave.scan.png"), "png").unwrap();

        let aux = AuxInputs::discover(dir.path(), "wave");
        assert!(aux.scan.is_some());
        assert!(aux.depth.is_none());
    }
}
