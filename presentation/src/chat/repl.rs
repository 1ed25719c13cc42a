//! REPL (Read-Eval-Print Loop) for chatting through the adapter loop

use crate::{ConsoleFormatter, ProgressReporter, SimpleProgress};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolwire_application::{
    AdapterParams, ConversationLogger, ReasoningModel, RunAdapterError, RunAdapterLoopUseCase,
    ToolClientPort,
};
use toolwire_domain::Conversation;

/// Interactive chat REPL
pub struct ChatRepl<C: ToolClientPort + ?Sized, M: ReasoningModel + ?Sized> {
    client: Arc<C>,
    model: Arc<M>,
    params: AdapterParams,
    system_prompt: Option<String>,
    logger: Option<Arc<dyn ConversationLogger>>,
    show_progress: bool,
}

impl<C: ToolClientPort + ?Sized, M: ReasoningModel + ?Sized> ChatRepl<C, M> {
    /// Create a new ChatRepl
    pub fn new(client: Arc<C>, model: Arc<M>, params: AdapterParams) -> Self {
        Self {
            client,
            model,
            params,
            system_prompt: None,
            logger: None,
            show_progress: true,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Seed every conversation with a system turn
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// Record every conversation event
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn new_conversation(&self) -> Conversation {
        match &self.system_prompt {
            Some(prompt) => Conversation::with_system_prompt(prompt.clone()),
            None => Conversation::new(),
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;
        let history_path = crate::history_path("history.txt");
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path);
        }

        self.print_welcome();
        let mut conversation = self.new_conversation();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if is_quit(line) {
                        println!("Bye!");
                        break;
                    }
                    if line.starts_with('/') {
                        self.handle_command(line, &mut conversation);
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_utterance(&mut conversation, line).await;
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

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             toolwire - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model.name());
        println!("Tools: {}", self.tool_names().join(", "));
        println!();
        println!("Commands:");
        println!("  /help     - Show this help");
        println!("  /tools    - Show available tools");
        println!("  /clear    - Start a new conversation");
        println!("  quit      - Exit chat");
        println!();
    }

    fn tool_names(&self) -> Vec<String> {
        self.client.tools().into_iter().map(|t| t.name).collect()
    }

    fn handle_command(&self, cmd: &str, conversation: &mut Conversation) {
        match cmd {
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?     - Show this help");
                println!("  /tools            - Show available tools");
                println!("  /clear            - Start a new conversation");
                println!("  quit, exit, q     - Exit chat");
                println!();
            }
            "/tools" => {
                println!();
                print!("{}", ConsoleFormatter::format_tools(&self.client.tools()));
                println!();
            }
            "/clear" => {
                *conversation = self.new_conversation();
                println!("Conversation cleared.");
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
    }

    /// Run one utterance through the adapter loop. Ctrl+C cancels it.
    async fn process_utterance(&self, conversation: &mut Conversation, utterance: &str) {
        println!();

        let cancel = CancellationToken::new();
        let mut use_case = RunAdapterLoopUseCase::new(
            Arc::clone(&self.client),
            Arc::clone(&self.model),
            self.params.clone(),
        )
        .with_cancellation(cancel.clone());
        if let Some(logger) = &self.logger {
            use_case = use_case.with_conversation_logger(Arc::clone(logger));
        }

        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let result = if self.show_progress {
            let progress = ProgressReporter::new();
            let result = use_case.execute(conversation, utterance, &progress).await;
            progress.finish();
            result
        } else {
            use_case
                .execute(conversation, utterance, &SimpleProgress)
                .await
        };
        watcher.abort();

        match result {
            Ok(output) => print!("{}", ConsoleFormatter::format_answer(&output)),
            Err(RunAdapterError::Cancelled) => println!("(cancelled)"),
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }
}

/// Bare `quit`, `exit` or `q` (or their slash forms) end the chat
fn is_quit(line: &str) -> bool {
    matches!(
        line.trim_start_matches('/').to_ascii_lowercase().as_str(),
        "quit" | "exit" | "q"
    )
}
