//! goals-check - verification CLI for the Goals Tracker app
//!
//! Exercises the hosted backend (auth config, sign-up/sign-in, goal CRUD) and
//! the deployed frontend (static assets, headless browser checks), printing a
//! pass/fail report.

use std::path::PathBuf;

use clap::Parser;
use goals_check::cli::{self, GlobalOptions};
use goals_check::commands::Commands;
use goals_check::common::logging;

#[derive(Parser)]
#[command(name = "goals-check", about = "Goals Tracker backend and deployment checks")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging and extra diagnostics
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let opts = GlobalOptions {
        config: cli.config,
        verbose: cli.verbose,
        json: cli.json,
    };

    match cli::dispatch(cli.command, &opts).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
