//! Console output formatter for tool listings, call results and answers

use colored::Colorize;
use serde_json::json;
use toolwire_application::{AdapterOutcome, RunAdapterOutput};
use toolwire_domain::{ToolCallResult, ToolDescriptor};

/// Formats toolwire results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the tool list, one tool per line with its description
    pub fn format_tools(tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools published.".dimmed());
        }

        let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
        let mut output = String::new();
        output.push_str(&Self::header(&format!("Tools ({})", tools.len())));
        output.push('\n');

        for tool in tools {
            output.push_str(&format!(
                "  {}  {}\n",
                format!("{:<width$}", tool.name).cyan().bold(),
                tool.description
            ));
            let params: Vec<String> = tool
                .input_schema
                .parameters()
                .iter()
                .map(|p| {
                    let marker = if p.required { "" } else { "?" };
                    format!("{}{}: {}", p.name, marker, p.param_type.as_str())
                })
                .collect();
            if !params.is_empty() {
                output.push_str(&format!(
                    "  {:<width$}  {}\n",
                    "",
                    format!("({})", params.join(", ")).dimmed()
                ));
            }
        }

        output
    }

    /// Format the tool list as JSON, in the `tools/list` result shape
    pub fn format_tools_json(tools: &[ToolDescriptor]) -> String {
        serde_json::to_string_pretty(&json!({ "tools": tools }))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Format one tool call result
    pub fn format_result(tool_name: &str, result: &ToolCallResult) -> String {
        match result {
            ToolCallResult::Success(_) => format!(
                "{} {}\n{}\n",
                "v".green(),
                tool_name.bold(),
                Self::indent(&result.to_text(), "  ")
            ),
            ToolCallResult::Failure(message) => format!(
                "{} {}\n{}\n",
                "x".red(),
                tool_name.bold(),
                Self::indent(message, "  ").red()
            ),
        }
    }

    /// Format one tool call result as JSON
    pub fn format_result_json(result: &ToolCallResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the adapter loop's answer, with a footer naming the tools used
    pub fn format_answer(output: &RunAdapterOutput) -> String {
        let mut text = String::new();

        match output.outcome {
            AdapterOutcome::Completed => text.push_str(&output.answer),
            AdapterOutcome::ToolCallLimitExceeded => {
                text.push_str(&output.answer.yellow().to_string())
            }
        }
        text.push('\n');

        if !output.tool_calls.is_empty() {
            let used: Vec<String> = output
                .tool_calls
                .iter()
                .map(|record| {
                    let mark = if record.result.is_success() {
                        "v".green()
                    } else {
                        "x".red()
                    };
                    format!("{} {}", mark, record.call.tool_name)
                })
                .collect();
            text.push_str(&format!(
                "\n{} {}\n",
                "Tools used:".dimmed(),
                used.join(", ")
            ));
        }

        text
    }

    fn header(title: &str) -> String {
        format!("{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
