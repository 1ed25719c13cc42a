//! Progress reporting for adapter-loop turns

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use toolwire_application::AdapterProgressNotifier;
use toolwire_domain::{ToolCallRequest, ToolCallResult};

/// Longest argument preview shown next to a tool call
const ARGS_PREVIEW_LEN: usize = 60;

/// Reports progress with a spinner while the model or a tool is working
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start(&self, prefix: &str, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix.to_string());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.lock().replace(pb) {
            previous.finish_and_clear();
        }
    }

    /// Stop and clear the spinner, if one is running
    pub fn finish(&self) {
        if let Some(pb) = self.lock().take() {
            pb.finish_and_clear();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

impl AdapterProgressNotifier for ProgressReporter {
    fn on_model_request(&self, round: usize) {
        let message = if round == 0 {
            "Thinking...".to_string()
        } else {
            format!("Thinking... (after {} tool round{})", round, plural(round))
        };
        self.start("model", message);
    }

    fn on_tool_call(&self, call: &ToolCallRequest) {
        self.start(&call.tool_name, args_preview(call));
    }

    fn on_tool_result(&self, tool_name: &str, result: &ToolCallResult) {
        if let Some(pb) = self.lock().take() {
            let status = if result.is_success() {
                format!("{} {}", "v".green(), tool_name)
            } else {
                format!("{} {}", "x".red(), tool_name)
            };
            pb.finish_with_message(status);
        }
    }

    fn on_limit_exceeded(&self, max_rounds: usize) {
        self.finish();
        eprintln!(
            "{} tool-call limit reached ({} rounds)",
            "!".yellow().bold(),
            max_rounds
        );
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl AdapterProgressNotifier for SimpleProgress {
    fn on_tool_call(&self, call: &ToolCallRequest) {
        eprintln!("{} {} {}", "->".cyan(), call.tool_name.bold(), args_preview(call));
    }

    fn on_tool_result(&self, tool_name: &str, result: &ToolCallResult) {
        if result.is_success() {
            eprintln!("  {} {}", "v".green(), tool_name);
        } else {
            eprintln!(
                "  {} {} ({})",
                "x".red(),
                tool_name,
                result.failure_message().unwrap_or("failed")
            );
        }
    }

    fn on_limit_exceeded(&self, max_rounds: usize) {
        eprintln!("  {} tool-call limit reached ({} rounds)", "!".yellow(), max_rounds);
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Compact one-line rendering of a call's arguments
fn args_preview(call: &ToolCallRequest) -> String {
    let rendered = serde_json::Value::Object(call.arguments.clone()).to_string();
    if rendered.chars().count() <= ARGS_PREVIEW_LEN {
        return rendered;
    }
    let truncated: String = rendered.chars().take(ARGS_PREVIEW_LEN - 3).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_preview_short() {
        let call = ToolCallRequest::new("sum").with_arg("a", 1).with_arg("b", 2);
        assert_eq!(args_preview(&call), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_args_preview_truncates() {
        let call = ToolCallRequest::new("echo").with_arg("text", "x".repeat(200));
        let preview = args_preview(&call);
        assert_eq!(preview.chars().count(), ARGS_PREVIEW_LEN);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_reporter_lifecycle_without_terminal() {
        let reporter = ProgressReporter::new();
        reporter.on_model_request(0);
        let call = ToolCallRequest::new("echo").with_arg("text", "hi");
        reporter.on_tool_call(&call);
        reporter.on_tool_result("echo", &ToolCallResult::success("hi"));
        assert!(reporter.lock().is_none());

        reporter.on_model_request(1);
        assert!(reporter.lock().is_some());
        reporter.finish();
        assert!(reporter.lock().is_none());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(2), "s");
    }
}
