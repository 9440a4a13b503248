//! `effectc build` subcommand.

use std::path::PathBuf;

use effectc_build::{
    collab::{FileImporter, NoThumbnail},
    config::{BuildConfig, ConfigOverrides},
    orchestrator::BuildOrchestrator,
};

/// `effectc build` subcommand
#[derive(Debug, clap::Parser)]
#[non_exhaustive]
pub struct Build {
    /// Path to the project directory.
    #[clap(default_value = ".")]
    pub project_dir: PathBuf,

    /// Configuration overrides, applied over `effectc.toml`.
    #[clap(flatten)]
    pub overrides: ConfigOverrides,
}

impl Build {
    /// Runs one build pass over the project.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be resolved or the pass
    /// fails fatally. Per-artifact failures are reported and do not error.
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        let config = BuildConfig::resolve(&self.project_dir, &self.overrides)?;
        log::debug!("running build pass with {config:#?}");

        let mut orchestrator = BuildOrchestrator::new(config, FileImporter, NoThumbnail);
        let summary = orchestrator.run()?;

        for skipped in &summary.skipped {
            println!("skipped {}: {}", skipped.source_path, skipped.error);
        }
        println!(
            "{} built, {} up to date, {} skipped",
            summary.built,
            summary.up_to_date,
            summary.skipped.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use clap::Parser as _;
    use effectc_test_utils::{TestProject, MINIMAL_EFFECT};

    use super::*;

    #[test_log::test]
    fn builds_a_project_end_to_end() {
        let project = TestProject::new().unwrap();
        project.write_effect("wave", MINIMAL_EFFECT).unwrap();

        let cache_path = project.cache_path();
        let build = Build {
            project_dir: project.root().to_path_buf(),
            overrides: ConfigOverrides::parse_from([
                "effectc",
                "--cache-file",
                cache_path.to_str().unwrap(),
            ]),
        };
        build.run().unwrap();

        assert!(project.output_dir().join("wave.gen.shader").is_file());
        assert!(cache_path.is_file());
    }
}
