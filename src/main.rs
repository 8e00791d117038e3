use anyhow::Result;
use backfolio::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for backfolio::AppCommand {
    fn from(cmd: Commands) -> backfolio::AppCommand {
        match cmd {
            Commands::Plot { account, output } => backfolio::AppCommand::Plot { account, output },
            Commands::Export { account, output } => {
                backfolio::AppCommand::Export { account, output }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Chart the past value of an account's current holdings
    Plot {
        /// Stellar account id (G...)
        account: String,

        /// Where to write the SVG chart
        #[arg(short, long, default_value = "portfolio.svg")]
        output: PathBuf,
    },
    /// Export the past value of an account's current holdings as CSV
    Export {
        /// Stellar account id (G...)
        account: String,

        /// CSV file to write, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => backfolio::cli::setup::setup(),
        Some(cmd) => backfolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
