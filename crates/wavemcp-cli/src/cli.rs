//! Command-line argument types

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level arguments
#[derive(Parser, Debug)]
#[command(
    name = "wavemcp",
    version,
    about = "Inspect and drive MCP servers over WebSocket",
    long_about = "wavemcp opens an MCP session over WebSocket, performs the initialize handshake\n\
                  and runs one operation: list or call tools, list or read resources, list or\n\
                  get prompts, show server information, or watch server notifications.\n\n\
                  Connection settings come from flags, WAVEMCP_* environment variables and an\n\
                  optional config file (default: <config dir>/wavemcp/config.toml), in that order."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// How results are printed
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Plain output even on a terminal
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "WAVEMCP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// One operation per invocation
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what the server reported during the handshake
    Info {
        #[command(flatten)]
        conn: Connection,
    },

    /// Tool operations
    #[command(subcommand)]
    Tools(ToolCommands),

    /// Resource operations
    #[command(subcommand)]
    Resources(ResourceCommands),

    /// Prompt operations
    #[command(subcommand)]
    Prompts(PromptCommands),

    /// Print server notifications and list changes until interrupted
    Watch {
        #[command(flatten)]
        conn: Connection,
    },
}

/// `tools` subcommands
#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// Fetch `tools/list`
    List {
        #[command(flatten)]
        conn: Connection,
    },

    /// Invoke a tool and print its result
    Call {
        #[command(flatten)]
        conn: Connection,

        /// Tool name
        name: String,

        /// JSON object passed as the tool's `arguments`
        #[arg(long, short = 'a', default_value = "{}")]
        arguments: String,
    },
}

/// `resources` subcommands
#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// Fetch `resources/list`
    List {
        #[command(flatten)]
        conn: Connection,
    },

    /// Print the contents behind a URI
    Read {
        #[command(flatten)]
        conn: Connection,

        /// Resource URI
        uri: String,
    },
}

/// `prompts` subcommands
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Fetch `prompts/list`
    List {
        #[command(flatten)]
        conn: Connection,
    },

    /// Render a prompt template
    Get {
        #[command(flatten)]
        conn: Connection,

        /// Prompt name
        name: String,

        /// JSON object with the template's arguments
        #[arg(long, short = 'a', default_value = "{}")]
        arguments: String,
    },
}

/// Connection flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct Connection {
    /// WebSocket URL of the server (ws:// or wss://)
    #[arg(long, env = "WAVEMCP_URL")]
    pub url: Option<String>,

    /// Connect and request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra header for the WebSocket upgrade, as NAME=VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

/// `--format` values
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Prose, colored on a terminal
    Human,
    /// Pretty-printed JSON
    Json,
    /// Bordered tables for lists
    Table,
    /// One JSON document per line
    Compact,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .or_else(|| raw.split_once(':'))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
