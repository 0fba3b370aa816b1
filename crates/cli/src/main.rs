use anyhow::Result;
use clap::Parser;
use env_logger::init;
use plume_build_cli::cli::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().run()
}
