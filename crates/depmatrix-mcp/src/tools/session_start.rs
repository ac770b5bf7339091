//! Tool `session_start`: open a new, empty matrix session.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::SessionStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::parse_params;

#[derive(Debug, Deserialize)]
struct StartParams {
    #[serde(default)]
    session_id: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "session_start".to_string(),
        description: Some("Start a new matrix session; a random id is generated when none is given".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": { "type": "string", "description": "Optional explicit session ID" }
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: StartParams = parse_params(args)?;
    let session_id = params
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let session = store.lock().await.start(&session_id)?;
    let status = session.lock().await.status();

    Ok(ToolCallResult::json(&json!({
        "session_id": session_id,
        "status": "started",
        "started_at": status.started_at,
        "thresholds": status.thresholds,
    })))
}
