//! Newline-delimited JSON framing.

use crate::types::{JsonRpcMessage, McpError, McpResult};

/// Parse one line as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a value to a single line ending in `\n`. Output never contains
/// a raw newline because serde_json escapes them inside strings.
pub fn frame_message(value: &serde_json::Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_is_single_line() {
        let framed = frame_message(&json!({"text": "line one\nline two"})).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }

    #[test]
    fn test_parse_notification() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","method":"initialized"}"#).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Notification(_)));
        assert_eq!(parse_message("   ").unwrap_err().code(), -32700);
    }
}
