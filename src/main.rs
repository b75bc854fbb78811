//! `qsheet`: track progress through a sheet of practice interview questions.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
