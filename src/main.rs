use clap::Parser;
use evidence_filter::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify(args) => cli::verify::run(args).await,
    }
}
