use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use tufe::core::log::init_logging;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate compound inflation between two dates
    Calculate {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD), exclusive
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the first and last month with data
    Range,
    /// List all months with data
    Months,
}

impl From<Commands> for tufe::AppCommand {
    fn from(cmd: Commands) -> tufe::AppCommand {
        match cmd {
            Commands::Calculate { from, to, json } => tufe::AppCommand::Calculate {
                start: from,
                end: to,
                json,
            },
            Commands::Range => tufe::AppCommand::Range,
            Commands::Months => tufe::AppCommand::Months,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tufe::cli::setup::setup(),
        Some(cmd) => tufe::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
