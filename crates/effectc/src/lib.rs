//! Command line tool for incrementally compiling simplified effect sources.
//!
//! Takes a project directory holding `.effect` files, expands each into a
//! complete shader program via the shipped (or a custom) template, and only
//! regenerates what actually changed, tracked by a content-addressed cache.
//!
//! ## Building a project
//!
//! ```text
//! effectc build path/to/project
//! ```
//!
//! The project layout and every path involved can be adjusted in the
//! project's `effectc.toml` or overridden on the command line; see
//! `effectc build --help`.

use self::{build::Build, show::Show};

pub mod build;
pub mod show;

/// All of the available subcommands for `effectc`
#[derive(clap::Subcommand)]
#[non_exhaustive]
pub enum Command {
    /// Compile every effect source in a project.
    Build(Box<Build>),

    /// Show some useful values.
    Show(Show),
}

impl Command {
    /// Runs the command
    ///
    /// # Errors
    /// Any errors during execution, usually printed to the user
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Build(build) => build.run()?,
            Self::Show(show) => show.run()?,
        }
        Ok(())
    }
}

/// The struct representing the main CLI.
#[derive(clap::Parser)]
#[clap(author, version, about, subcommand_required = true)]
#[non_exhaustive]
pub struct Cli {
    /// The command to run.
    #[clap(subcommand)]
    pub command: Command,
}
