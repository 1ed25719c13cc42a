//! CLI entrypoint for toolwire
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolwire_domain::Arguments;
use toolwire_infrastructure::config::FileLogConfig;
use toolwire_infrastructure::{
    ClientConfig, ConfigLoader, FileConfig, Framing, StdioTransport, ToolClient, ToolHost,
    ToolRegistry, register_builtin_tools,
};
use toolwire_presentation::{Cli, Command, ConsoleFormatter, FramingArg, OutputFormat, ToolRepl};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        print_config_sources(&cli);
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    apply_cli_overrides(&mut config, &cli);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("config error: {}", e);
        }
        bail!("invalid configuration ({} problems)", errors.len());
    }

    // Kept alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, &config.log)?;

    info!("Starting toolwire {}", env!("CARGO_PKG_VERSION"));

    let Some(command) = cli.command.clone() else {
        bail!("A subcommand is required. Run `toolwire --help` for usage.");
    };

    match command {
        Command::Serve { listen } => {
            serve(&config, listen).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Tools => {
            let client = connect(&config).await?;
            let tools = client.list_tools()?;
            match cli.output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_tools(&tools)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_tools_json(&tools)),
            }
            client.disconnect().await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { name, arguments } => {
            let arguments = parse_arguments(&arguments)?;
            let client = connect(&config).await?;
            let result = client.call_tool(&name, arguments).await;
            client.disconnect().await;

            let result = result?;
            match cli.output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_result(&name, &result)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_result_json(&result)),
            }
            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Interactive => {
            let client = Arc::new(connect(&config).await?);
            let server_name = client
                .server_info()
                .map(|info| format!("{} {}", info.name, info.version))
                .unwrap_or_else(|| "tool host".to_string());

            ToolRepl::new(Arc::clone(&client), server_name).run().await?;
            client.disconnect().await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Chat {
            model,
            max_tool_rounds,
        } => {
            if let Some(model) = model {
                config.model.model = Some(model);
            }
            if let Some(max) = max_tool_rounds {
                config.agent.max_tool_rounds = max;
            }
            chat(&config, cli.quiet).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging. Diagnostics always go to stderr; stdout is reserved
/// for the protocol in `serve` mode and for results otherwise.
fn init_logging(verbose: u8, log: &FileLogConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, &log.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn print_config_sources(cli: &Cli) {
    println!("Configuration sources (highest priority first):");
    for source in ConfigLoader::sources(cli.config.as_ref()) {
        let status = if source.found { "found" } else { "not found" };
        println!("  {:<9} {} ({})", source.label, source.location, status);
    }

    let config = if cli.no_config {
        Ok(ConfigLoader::load_defaults())
    } else {
        ConfigLoader::load(cli.config.as_ref())
    };
    match config {
        Ok(mut config) => {
            apply_cli_overrides(&mut config, cli);
            if let Some(key) = config.model.api_key.as_mut() {
                *key = "<redacted>".to_string();
            }
            println!();
            println!("Effective configuration:");
            match toml::to_string_pretty(&config) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("failed to render configuration: {}", e),
            }
        }
        Err(e) => eprintln!("failed to load configuration: {}", e),
    }
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(command) = &cli.server_command {
        config.client.command = command.clone();
        config.client.args = cli.server_arg.clone();
    } else if !cli.server_arg.is_empty() {
        config.client.args = cli.server_arg.clone();
    }
    if let Some(addr) = &cli.connect {
        config.client.connect = Some(addr.clone());
    }
    if let Some(framing) = cli.framing {
        let framing = match framing {
            FramingArg::JsonLines => Framing::JsonLines,
            FramingArg::ContentLength => Framing::ContentLength,
        };
        config.client.framing = framing;
        config.host.framing = framing;
    }
}

fn client_config(config: &FileConfig) -> ClientConfig {
    let mut client = config.client.to_client_config();

    // The default host is this binary's own `serve` subcommand
    if client.connect.is_none()
        && client.command == "toolwire"
        && let Ok(exe) = std::env::current_exe()
    {
        client.command = exe.display().to_string();
        // the child reads its framing from the same env layer as any config
        client
            .env
            .push(("TOOLWIRE_HOST__FRAMING".to_string(), client.framing.as_str().to_string()));
    }
    client
}

async fn connect(config: &FileConfig) -> Result<ToolClient> {
    let client_config = client_config(config);
    let endpoint = client_config.endpoint();
    ToolClient::connect_with(client_config)
        .await
        .with_context(|| format!("failed to connect to tool host ({})", endpoint))
}

fn parse_arguments(raw: &str) -> Result<Arguments> {
    match serde_json::from_str::<Value>(raw).context("arguments are not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("arguments must be a JSON object, got {}", other),
    }
}

async fn serve(config: &FileConfig, listen: Option<String>) -> Result<()> {
    let mut registry = ToolRegistry::new().with_unknown_fields(config.host.unknown_fields.into());
    register_builtin_tools(&mut registry)?;

    let mut host = ToolHost::new(Arc::new(registry))
        .with_server_info(config.host.name.clone(), config.host.version_or_default())
        .with_max_frame_size(config.host.max_frame_size);
    if let Some(instructions) = &config.host.instructions {
        host = host.with_instructions(instructions.clone());
    }

    match listen.or_else(|| config.host.listen.clone()) {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to listen on {}", addr))?;
            eprintln!("toolwire host listening on {}", listener.local_addr()?);

            let shutdown = CancellationToken::new();
            {
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        shutdown.cancel();
                    }
                });
            }
            Arc::new(host)
                .serve_tcp(listener, config.host.framing, shutdown)
                .await?;
        }
        None => {
            let transport = StdioTransport::stdio(config.host.framing)
                .with_max_frame_size(config.host.max_frame_size);
            let report = host.serve(transport).await;
            info!(
                "Session ended: {} requests, {} tool calls, {} protocol errors",
                report.requests, report.tool_calls, report.protocol_errors
            );
            if let Some(error) = report.error {
                warn!("Session ended with error: {}", error);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "gemini")]
async fn chat(config: &FileConfig, quiet: bool) -> Result<()> {
    use std::time::Duration;
    use toolwire_application::ConversationLogger;
    use toolwire_infrastructure::{GeminiConfig, GeminiModel, JsonlConversationLogger};
    use toolwire_presentation::ChatRepl;

    if config.model.provider != "gemini" {
        bail!("unsupported model provider: {}", config.model.provider);
    }
    let Some(api_key) = config.model.resolve_api_key() else {
        bail!(
            "no API key: set [model] api_key or the {} environment variable",
            toolwire_infrastructure::config::API_KEY_ENV
        );
    };

    let mut gemini = GeminiConfig::new(api_key)
        .with_timeout(Duration::from_secs(config.model.timeout_secs));
    if let Some(model) = config.model.resolve_model() {
        gemini = gemini.with_model(model);
    }
    if let Some(base_url) = &config.model.base_url {
        gemini = gemini.with_base_url(base_url.clone());
    }
    let model = Arc::new(GeminiModel::new(gemini)?);

    let client = Arc::new(connect(config).await?);

    let mut repl = ChatRepl::new(
        Arc::clone(&client),
        model,
        config.agent.to_adapter_params(),
    )
    .with_progress(!quiet)
    .with_system_prompt(config.agent.system_prompt.clone());

    if let Some(path) = &config.log.conversation_file {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("failed to open conversation log {}", path))?;
        info!("Recording conversation to {}", path);
        repl = repl.with_conversation_logger(Arc::new(logger) as Arc<dyn ConversationLogger>);
    }

    repl.run().await?;
    client.disconnect().await;
    Ok(())
}

#[cfg(not(feature = "gemini"))]
async fn chat(_config: &FileConfig, _quiet: bool) -> Result<()> {
    bail!("chat requires a reasoning model; rebuild with the `gemini` feature")
}
