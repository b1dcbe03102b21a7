// Licensed under the Apache-2.0 license

use clap::Parser;
use firmware_packer::args::Commands;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;
    let cli = Cli::parse();
    firmware_packer::execute(cli.command)
}
