//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Paddle CLI - issue requests against the Paddle Billing API
///
/// Resolves credentials from flags, a config file, `PADDLE_*` environment
/// variables and a local `.env` file, in that order.
#[derive(Parser, Debug)]
#[command(
    name = "paddle",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "PADDLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for response bodies
    #[arg(short, long, value_enum, global = true, default_value = "json-pretty")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override every other configuration source
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// API key (pdl_sdbx_... or pdl_live_...)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Target environment: sandbox or live
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Base URL override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a request with any method
    Request(RequestArgs),

    /// Send a GET request
    Get(GetArgs),

    /// Send a DELETE request
    Delete(DeleteArgs),

    /// Inspect the resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the request command
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PATCH, PUT, DELETE)
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Resource path, e.g. /products
    #[arg(value_name = "PATH")]
    pub path: String,

    /// JSON body, or @file to read it from a file
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<String>,

    #[command(flatten)]
    pub request: CommonRequestArgs,
}

/// Arguments for the get command
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Resource path, e.g. /products/pro_01h
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub request: CommonRequestArgs,
}

/// Arguments for the delete command
#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Resource path
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub request: CommonRequestArgs,
}

/// Options shared by every request-issuing command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonRequestArgs {
    /// Query parameter as key=value; commas make a list, key[child]=value nests
    #[arg(short = 'Q', long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Extra header as 'Name: value'
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Write the response body to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved configuration with the API key redacted
    Show,

    /// Run security validation against the resolved configuration
    Validate,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_request_parsing() {
        let cli = Cli::parse_from([
            "paddle",
            "request",
            "POST",
            "/customers",
            "-d",
            r#"{"email":"sam@example.com"}"#,
            "-H",
            "X-Request-Id: abc",
            "--timeout",
            "5000",
        ]);

        assert_eq!(cli.connection.timeout, Some(5000));
        match cli.command {
            Commands::Request(args) => {
                assert_eq!(args.method, "POST");
                assert_eq!(args.path, "/customers");
                assert!(args.data.is_some());
                assert_eq!(args.request.headers, vec!["X-Request-Id: abc"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_get_with_query() {
        let cli = Cli::parse_from([
            "paddle",
            "--environment",
            "live",
            "get",
            "/prices",
            "-Q",
            "status=active,archived",
            "--query",
            "billed_at[from]=2024-01-01",
        ]);

        assert_eq!(cli.connection.environment.as_deref(), Some("live"));
        match cli.command {
            Commands::Get(args) => assert_eq!(args.request.query.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["paddle", "-vv", "config", "show"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["paddle", "--quiet", "config", "validate"]);
        assert_eq!(cli.verbosity_level(), 0);
    }
}
