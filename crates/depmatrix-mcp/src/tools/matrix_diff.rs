//! Tool `matrix_diff`: compare the original matrix with the modified one.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use depmatrix::{decode, CellChange};

use crate::session::SessionStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property};

#[derive(Debug, Deserialize)]
struct DiffParams {
    #[serde(default = "default_session")]
    session_id: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_diff".to_string(),
        description: Some(
            "List activities and relation cells added, removed or modified between the \
             original and the modified matrix, with a plain-language reading of each cell"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property()
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: DiffParams = parse_params(args)?;

    let session = open_session(store, &params.session_id).await?;
    let session = session.lock().await;
    let report = session.diff()?;

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "has_modified": session.has_modified(),
        "change_count": report.change_count(),
        "explanations": {
            "added": explain(&report.added_cells),
            "removed": explain(&report.removed_cells),
            "modified": explain(&report.modified_cells),
        },
        "diff": report,
    })))
}

fn explain(changes: &[CellChange]) -> Vec<Value> {
    changes
        .iter()
        .map(|change| {
            let read = |cell: &str| {
                decode(cell)
                    .relation()
                    .map(|r| r.describe(&change.from, &change.to))
            };
            json!({
                "from": change.from,
                "to": change.to,
                "before": read(&change.before),
                "after": read(&change.after),
            })
        })
        .collect()
}
