use clap::Parser;
use colored::Colorize;

use vimaya::cli::args::{Cli, Commands};
use vimaya::cli::commands::{self, load_config};
use vimaya::error::VimayaError;
use vimaya::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), VimayaError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let format = cli.output;

    let output = match cli.command {
        Commands::Focus(args) => {
            let config = load_config(cli.api_url, cli.token)?;
            commands::focus(&config, args, format).await?
        },
        Commands::Friends(args) => {
            let config = load_config(cli.api_url, cli.token)?;
            commands::friends(&config, args.command, format).await?
        },
        Commands::Config(args) => commands::config(args.command, cli.api_url, cli.token, format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
