//! Tool `matrix_import`: load a matrix document as the session's original.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use depmatrix::{DependencyMatrix, MatrixDocument, MatrixReader};

use crate::session::SessionStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, resolve_path, session_property};

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(default = "default_session")]
    session_id: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    matrix: Option<MatrixDocument>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_import".to_string(),
        description: Some(
            "Use a previously exported matrix as the original, discarding edits. \
             Pass either a file path or the document itself."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "path": { "type": "string", "description": "Matrix document file" },
                "matrix": {
                    "type": "object",
                    "properties": {
                        "activities": { "type": "array", "items": { "type": "string" } },
                        "matrix": {
                            "type": "object",
                            "additionalProperties": {
                                "type": "object",
                                "additionalProperties": { "type": "string" }
                            }
                        }
                    },
                    "required": ["activities"]
                }
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: ImportParams = parse_params(args)?;

    let matrix = match (params.path, params.matrix) {
        (Some(path), None) => {
            let export_dir = store.lock().await.export_dir().to_path_buf();
            MatrixReader::read_from_file(&resolve_path(&export_dir, &path))?
        }
        (None, Some(doc)) => DependencyMatrix::try_from(doc)?,
        (Some(_), Some(_)) => {
            return Err(McpError::InvalidParams(
                "Pass either path or matrix, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(McpError::InputError(
                "No matrix supplied: pass path or matrix".to_string(),
            ))
        }
    };

    let session = open_session(store, &params.session_id).await?;
    let mut session = session.lock().await;
    let matrix = session.import(matrix);

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "activity_count": matrix.len(),
        "dependencies": matrix,
    })))
}
