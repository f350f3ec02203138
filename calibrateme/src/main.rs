use calibrateme::cli::{self, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    calibrateme_core::init_logging_with_level(&cli.log_level);
    cli::execute(cli)
}
