//! Tool `matrix_export`: write a matrix document to disk.

use std::sync::Arc;
use tokio::sync::Mutex;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use depmatrix::MatrixWriter;

use crate::session::{MatrixSource, SessionStore};
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{
    default_session, open_session, parse_params, resolve_path, session_property, source_property,
};

#[derive(Debug, Deserialize)]
struct ExportParams {
    #[serde(default = "default_session")]
    session_id: String,
    #[serde(default)]
    matrix_source: MatrixSource,
    #[serde(default)]
    path: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_export".to_string(),
        description: Some(
            "Export a matrix as a JSON document. Relative paths are placed in the export directory; \
             without a path a timestamped file name is chosen."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "matrix_source": source_property(),
                "path": { "type": "string", "description": "Target file" }
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: ExportParams = parse_params(args)?;
    let export_dir = store.lock().await.export_dir().to_path_buf();

    let session = open_session(store, &params.session_id).await?;
    let session = session.lock().await;
    let matrix = session.matrix(params.matrix_source)?;

    let now = Utc::now();
    let file_name = params.path.unwrap_or_else(|| {
        format!(
            "{}-{}-{}.json",
            params.session_id,
            params.matrix_source.as_str(),
            now.format("%Y%m%dT%H%M%SZ")
        )
    });
    let path = resolve_path(&export_dir, &file_name);
    MatrixWriter::write_to_file(matrix, &path)?;
    tracing::info!(session = %params.session_id, path = %path.display(), "Exported matrix");

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "matrix_source": params.matrix_source.as_str(),
        "path": path.display().to_string(),
        "activity_count": matrix.len(),
        "exported_at": now.to_rfc3339(),
    })))
}
