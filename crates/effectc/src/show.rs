//! `effectc show` subcommand.

use effectc_cache::default_cache_dir;
use effectc_gen::{template::DEFAULT_TEMPLATE, GENERATOR_VERSION};

/// Show some useful values.
#[derive(Debug, clap::Parser)]
#[non_exhaustive]
pub struct Show {
    /// The value to show.
    #[clap(subcommand)]
    pub info: Info,
}

/// The values `effectc show` can display.
#[derive(Debug, clap::Subcommand)]
#[non_exhaustive]
pub enum Info {
    /// Displays the directory default cache files are stored in.
    CachePath,

    /// Displays the current generator version tag.
    GeneratorVersion,

    /// Displays the embedded default template.
    Template,
}

impl Show {
    /// Runs the command.
    ///
    /// # Errors
    /// Returns an error if the cache directory cannot be determined.
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        match self.info {
            Info::CachePath => println!("{}", default_cache_dir()?.display()),
            Info::GeneratorVersion => println!("{GENERATOR_VERSION}"),
            Info::Template => print!("{DEFAULT_TEMPLATE}"),
        }
        Ok(())
    }
}
