//! Tool `matrix_status`: report whether a session has matrices and what they hold.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::SessionStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property};

#[derive(Debug, Deserialize)]
struct StatusParams {
    #[serde(default = "default_session")]
    session_id: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_status".to_string(),
        description: Some("Session state: matrix presence, activities, thresholds and edit count".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property()
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: StatusParams = parse_params(args)?;

    let session = open_session(store, &params.session_id).await?;
    let status = session.lock().await.status();

    Ok(ToolCallResult::json(&status))
}
