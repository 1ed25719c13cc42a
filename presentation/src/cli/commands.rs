//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for tool listings and call results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Wire framing used on the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    /// One JSON message per line
    JsonLines,
    /// `Content-Length` header followed by the body
    ContentLength,
}

/// CLI arguments for toolwire
#[derive(Parser, Debug)]
#[command(name = "toolwire")]
#[command(author, version, about = "Host, call and chat with tools over a JSON-RPC tool protocol")]
#[command(long_about = r#"
toolwire publishes named tools over a JSON-RPC session and lets a client
(or a reasoning model, through the adapter loop) discover and call them.

By default client commands spawn `toolwire serve` as a child process and talk
to it over stdin/stdout. Use --server-command / --server-arg to spawn a
different host, or --connect to reach a host listening on TCP.

Configuration files are loaded from (in priority order):
1. TOOLWIRE_* environment variables
2. --config <path>                      Explicit config file
3. ./toolwire.toml or ./.toolwire.toml  Project-level config
4. ~/.config/toolwire/config.toml       Global config

Example:
  toolwire serve --listen 127.0.0.1:7400
  toolwire tools
  toolwire call sum '{"a": 19, "b": 23}'
  toolwire --connect 127.0.0.1:7400 interactive
  GEMINI_API_KEY=... toolwire chat
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Host program to spawn for client commands
    #[arg(long, value_name = "CMD", global = true)]
    pub server_command: Option<String>,

    /// Argument passed to the spawned host (can be specified multiple times)
    #[arg(long, value_name = "ARG", global = true, allow_hyphen_values = true)]
    pub server_arg: Vec<String>,

    /// Connect to a host over TCP instead of spawning one
    #[arg(long, value_name = "ADDR", global = true)]
    pub connect: Option<String>,

    /// Wire framing
    #[arg(long, value_enum, global = true)]
    pub framing: Option<FramingArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the tool host over stdio, or over TCP with --listen
    Serve {
        /// Listen on this address instead of stdio
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Print the host's tools
    Tools,

    /// Call one tool and print the result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(value_name = "JSON", default_value = "{}")]
        arguments: String,
    },

    /// Interactive client: list, call <tool> <json>, quit
    Interactive,

    /// Chat with a reasoning model that can call the host's tools
    Chat {
        /// Override the configured model name
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// Override the configured tool-round limit
        #[arg(long, value_name = "N")]
        max_tool_rounds: Option<usize>,
    },
}
