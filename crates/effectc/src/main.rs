//! `effectc` binary entry point.

use clap::Parser as _;

fn main() -> anyhow::Result<()> {
    env_logger::builder().init();
    let cli = effectc::Cli::parse();
    cli.command.run()
}
