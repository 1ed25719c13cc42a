//! Line commands understood by the interactive client

use serde_json::Value;
use toolwire_domain::Arguments;

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    List,
    Call { tool: String, arguments: Arguments },
    Ping,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "list" | "ls" => Ok(Some(ReplCommand::List)),
        "ping" => Ok(Some(ReplCommand::Ping)),
        "help" | "?" => Ok(Some(ReplCommand::Help)),
        "quit" | "exit" | "q" => Ok(Some(ReplCommand::Quit)),
        "call" => parse_call(rest).map(Some),
        other => Err(format!("unknown command: {} (type 'help')", other)),
    }
}

fn parse_call(rest: &str) -> Result<ReplCommand, String> {
    let (tool, json) = match rest.split_once(char::is_whitespace) {
        Some((tool, json)) => (tool, json.trim()),
        None => (rest, ""),
    };
    if tool.is_empty() {
        return Err("usage: call <tool> <json>".to_string());
    }

    let arguments = if json.is_empty() {
        Arguments::new()
    } else {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err("arguments must be a JSON object".to_string()),
            Err(e) => return Err(format!("invalid JSON: {}", e)),
        }
    };

    Ok(ReplCommand::Call {
        tool: tool.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_line("list"), Ok(Some(ReplCommand::List)));
        assert_eq!(parse_line("  quit "), Ok(Some(ReplCommand::Quit)));
        assert_eq!(parse_line("q"), Ok(Some(ReplCommand::Quit)));
        assert_eq!(parse_line("help"), Ok(Some(ReplCommand::Help)));
        assert_eq!(parse_line("ping"), Ok(Some(ReplCommand::Ping)));
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_call_with_json() {
        let parsed = parse_line(r#"call sum {"a": 1, "b": 2}"#).unwrap().unwrap();
        let ReplCommand::Call { tool, arguments } = parsed else {
            panic!("expected call");
        };
        assert_eq!(tool, "sum");
        assert_eq!(arguments.get("a"), Some(&json!(1)));
        assert_eq!(arguments.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_call_without_arguments() {
        assert_eq!(
            parse_line("call ping_tool"),
            Ok(Some(ReplCommand::Call {
                tool: "ping_tool".to_string(),
                arguments: Arguments::new()
            }))
        );
    }

    #[test]
    fn test_call_errors() {
        assert!(parse_line("call").unwrap_err().starts_with("usage"));
        assert_eq!(
            parse_line("call sum [1, 2]").unwrap_err(),
            "arguments must be a JSON object"
        );
        assert!(parse_line("call sum {oops").unwrap_err().starts_with("invalid JSON"));
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_line("frobnicate").unwrap_err().contains("frobnicate"));
    }
}
