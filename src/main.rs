use anyhow::Result;
use clap::{CommandFactory, Parser};

use etfdash::cli::Cli;
use etfdash::dispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Some(command) => dispatcher::dispatch_command(command, cli.json).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
