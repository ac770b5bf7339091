//! Tool `discover_dependencies`: build the original matrix from traces.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use depmatrix::{parse_traces, Thresholds};

use crate::session::SessionStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property};

#[derive(Debug, Deserialize)]
struct DiscoverParams {
    #[serde(default = "default_session")]
    session_id: String,
    #[serde(default)]
    traces: Option<Vec<Vec<String>>>,
    #[serde(default)]
    traces_text: Option<String>,
    #[serde(default)]
    temporal_threshold: Option<f64>,
    #[serde(default)]
    existential_threshold: Option<f64>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "discover_dependencies".to_string(),
        description: Some(
            "Discover temporal and existential dependencies between activities from \
             execution traces. Replaces the session's original matrix and discards edits."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "traces": {
                    "type": "array",
                    "items": { "type": "array", "items": { "type": "string" } },
                    "description": "Traces as arrays of activity names"
                },
                "traces_text": {
                    "type": "string",
                    "description": "One trace per line, activities separated by commas"
                },
                "temporal_threshold": {
                    "type": "number", "minimum": 0, "maximum": 1,
                    "description": "Minimum fraction of co-occurring traces that must agree on an ordering"
                },
                "existential_threshold": {
                    "type": "number", "minimum": 0, "maximum": 1,
                    "description": "Minimum fraction of traces that must support an existential relation"
                }
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: DiscoverParams = parse_params(args)?;

    let traces = match (params.traces, params.traces_text) {
        (Some(_), Some(_)) => {
            return Err(McpError::InvalidParams(
                "Pass either traces or traces_text, not both".to_string(),
            ))
        }
        (Some(traces), None) => traces,
        (None, Some(text)) => parse_traces(&text)?,
        (None, None) => return Err(McpError::InputError("No traces supplied".to_string())),
    };

    let session = open_session(store, &params.session_id).await?;
    let mut session = session.lock().await;
    let current = session.thresholds();
    let thresholds = Thresholds::new(
        params.temporal_threshold.unwrap_or(current.temporal),
        params.existential_threshold.unwrap_or(current.existential),
    )
    .map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let matrix = session.discover(&traces, thresholds)?;

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "trace_count": traces.len(),
        "thresholds": thresholds,
        "activity_count": matrix.len(),
        "dependencies": matrix,
    })))
}
