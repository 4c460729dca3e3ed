//! Paddle CLI - Command-line interface for the Paddle Billing API
//!
//! This is the main entry point for the `paddle` binary. It resolves
//! configuration from flags, files and the environment, issues one API call
//! per invocation and maps failures to distinct exit codes.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Settings;
use error::Result;
use logging::LoggingConfig;
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    tracing::info!("Loading configuration");
    let settings = Settings::load(cli.config.as_deref(), &cli.connection)?;

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    match cli.command {
        Commands::Request(args) => handlers::handle_request(args, &settings, &mut output).await,
        Commands::Get(args) => handlers::handle_get(args, &settings, &mut output).await,
        Commands::Delete(args) => handlers::handle_delete(args, &settings, &mut output).await,
        Commands::Config(args) => handlers::handle_config(args, &settings, &mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
