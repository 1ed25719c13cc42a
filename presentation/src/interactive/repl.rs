//! Interactive client REPL: list and call tools by hand

use super::command::{ReplCommand, parse_line};
use crate::ConsoleFormatter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use std::time::Instant;
use toolwire_application::ToolClientPort;
use toolwire_domain::ToolCallRequest;

/// Interactive tool client REPL
pub struct ToolRepl<C: ToolClientPort + ?Sized> {
    client: Arc<C>,
    server_name: String,
}

impl<C: ToolClientPort + ?Sized> ToolRepl<C> {
    pub fn new(client: Arc<C>, server_name: impl Into<String>) -> Self {
        Self {
            client,
            server_name: server_name.into(),
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;
        let history_path = crate::history_path("interactive_history.txt");
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline("tool> ") {
                Ok(line) => {
                    let command = match parse_line(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(message) => {
                            eprintln!("{}", message);
                            continue;
                        }
                    };
                    let _ = rl.add_history_entry(line.trim());

                    if !self.execute(command).await {
                        println!("Bye!");
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Execute one command. Returns false when the REPL should exit.
    pub async fn execute(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => return false,
            ReplCommand::Help => Self::print_help(),
            ReplCommand::List => print!("{}", ConsoleFormatter::format_tools(&self.client.tools())),
            ReplCommand::Call { tool, arguments } => {
                let request = ToolCallRequest::new(tool).with_arguments(arguments);
                match self.client.call_tool(&request).await {
                    Ok(result) => {
                        print!("{}", ConsoleFormatter::format_result(&request.tool_name, &result))
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            ReplCommand::Ping => {
                let started = Instant::now();
                match self.client.ping().await {
                    Ok(()) => println!("pong ({} ms)", started.elapsed().as_millis()),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        true
    }

    fn print_welcome(&self) {
        println!();
        println!("Connected to {}", self.server_name);
        println!("{} tools available", self.client.tools().len());
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  list                 - List the host's tools");
        println!("  call <tool> <json>   - Call a tool with a JSON object of arguments");
        println!("  ping                 - Check that the host still answers");
        println!("  help                 - Show this help");
        println!("  quit, exit, q        - Exit");
        println!();
    }
}
