//! CLI entry point for the dungeon map generator

use clap::Parser;
use dungeontile::io::cli::{Cli, MapRunner};

fn main() -> dungeontile::Result<()> {
    let cli = Cli::parse();
    let mut runner = MapRunner::new(cli);
    runner.install_logger()?;
    runner.process()
}
