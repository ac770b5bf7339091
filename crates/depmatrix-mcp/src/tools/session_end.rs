//! Tool `session_end`: discard a session and its matrices.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::SessionStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, parse_params, session_property};

#[derive(Debug, Deserialize)]
struct EndParams {
    #[serde(default = "default_session")]
    session_id: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "session_end".to_string(),
        description: Some("End a matrix session, dropping its original and modified matrices".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property()
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: EndParams = parse_params(args)?;

    store.lock().await.end(&params.session_id)?;

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "status": "ended",
    })))
}
