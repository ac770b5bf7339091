//! Tool `matrix_get`: read the original or modified matrix.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::{MatrixSource, SessionStore};
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property, source_property};

#[derive(Debug, Deserialize)]
struct GetParams {
    #[serde(default = "default_session")]
    session_id: String,
    #[serde(default)]
    matrix_source: MatrixSource,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_get".to_string(),
        description: Some("Get a dependency matrix as activities plus encoded relation cells".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "matrix_source": source_property()
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: GetParams = parse_params(args)?;

    let session = open_session(store, &params.session_id).await?;
    let session = session.lock().await;
    let matrix = session.matrix(params.matrix_source)?;

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "matrix_source": params.matrix_source.as_str(),
        "activity_count": matrix.len(),
        "dependencies": matrix,
    })))
}
