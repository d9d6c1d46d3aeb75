//! # wavemcp CLI
//!
//! Command-line client for MCP servers reachable over WebSocket, built on
//! `wavemcp-client`.
//!
//! ## Features
//!
//! - Server information from the `initialize` handshake
//! - List and call tools, list and read resources, list and get prompts
//! - Watch server notifications and capability list changes until interrupted
//! - Human, table and JSON output, with colored errors and suggestions
//! - Settings from flags, `WAVEMCP_*` environment variables and a config file
//!
//! ## Usage
//!
//! ```bash
//! # Server information
//! wavemcp info --url ws://localhost:8080/mcp
//!
//! # Call a tool with arguments
//! wavemcp tools call add --arguments '{"a": 5, "b": 3}'
//!
//! # Tables instead of prose
//! wavemcp resources list --format table
//!
//! # Follow notifications (Ctrl-C to stop)
//! WAVEMCP_URL=ws://localhost:8080/mcp wavemcp watch -v
//! ```

#![warn(rust_2018_idioms, clippy::all)]
#![deny(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

pub mod cli;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod logging;
pub mod settings;

use clap::Parser;

pub use cli::{Cli, Commands, Connection, OutputFormat};
pub use error::{CliError, CliResult, ErrorCategory};
pub use executor::CommandExecutor;
pub use formatter::Formatter;
pub use settings::Settings;

/// Run the CLI application
///
/// Errors are printed to stderr before being returned.
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let colored = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    let formatter = Formatter::new(cli.format, colored);

    let result = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => {
            CommandExecutor::new(formatter, settings)
                .execute(cli.command)
                .await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        formatter.display_error(e);
    }
    result
}
