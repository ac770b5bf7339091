//! Tool `matrix_change`: apply one edit operation and publish the result as
//! the session's modified matrix.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use depmatrix::{Lock, Operation};

use crate::session::{MatrixSource, SessionStore};
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property, source_property};

#[derive(Debug, Deserialize)]
struct ChangeParams {
    #[serde(default = "default_session")]
    session_id: String,
    operation: String,
    #[serde(default)]
    matrix_source: MatrixSource,
    #[serde(default)]
    locks: Vec<Lock>,
    /// Operation-specific fields, passed through untouched.
    #[serde(flatten)]
    fields: Map<String, Value>,
}

pub fn definition() -> ToolDefinition {
    let temporal = json!({
        "type": "object",
        "properties": {
            "type": { "enum": ["direct", "eventual", "independence"] },
            "direction": { "enum": ["forward", "backward", "both"] }
        },
        "required": ["type"]
    });
    let existential = json!({
        "type": "object",
        "properties": {
            "type": { "enum": ["implication", "equivalence", "negated equivalence", "and", "nand", "or", "independence"] },
            "direction": { "enum": ["forward", "backward", "both"] }
        },
        "required": ["type"]
    });
    let spec = json!({
        "type": "object",
        "properties": {
            "from": { "type": "string" },
            "to": { "type": "string" },
            "temporal": temporal.clone(),
            "existential": existential.clone()
        },
        "required": ["from", "to"]
    });

    ToolDefinition {
        name: "matrix_change".to_string(),
        description: Some(
            "Apply an edit operation to the original or modified matrix. Operation fields: \
             delete {activity, preserve_incoming, preserve_outgoing}; insert/move {activity, dependencies}; \
             replace {old_activity, new_activity}; skip {activity}; swap {activity1, activity2}; \
             modify {from_activity, to_activity, temporal, existential}; \
             collapse {collapsed_activity, collapse_activities}; de-collapse {collapsed_activity}; \
             parallelize {parallel_activities}; condition_update {condition_activity, depending_activity, clear}."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "operation": { "type": "string", "enum": Operation::names() },
                "matrix_source": source_property(),
                "locks": {
                    "type": "array",
                    "description": "Sub-relations this operation must leave unchanged",
                    "items": {
                        "type": "object",
                        "properties": {
                            "from": { "type": "string" },
                            "to": { "type": "string" },
                            "temporal": { "type": "boolean" },
                            "existential": { "type": "boolean" }
                        },
                        "required": ["from", "to"]
                    }
                },
                "activity": { "type": "string" },
                "dependencies": { "type": "array", "items": spec },
                "preserve_incoming": { "type": "boolean", "default": true },
                "preserve_outgoing": { "type": "boolean", "default": true },
                "old_activity": { "type": "string" },
                "new_activity": { "type": "string" },
                "activity1": { "type": "string" },
                "activity2": { "type": "string" },
                "from_activity": { "type": "string" },
                "to_activity": { "type": "string" },
                "temporal": temporal,
                "existential": existential,
                "collapsed_activity": { "type": "string" },
                "collapse_activities": { "type": "array", "items": { "type": "string" }, "minItems": 2 },
                "parallel_activities": { "type": "array", "items": { "type": "string" }, "minItems": 2 },
                "condition_activity": { "type": "string" },
                "depending_activity": { "type": "string" },
                "clear": { "type": "boolean", "default": false }
            },
            "required": ["operation"]
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: ChangeParams = parse_params(args)?;

    let session = open_session(store, &params.session_id).await?;
    let mut session = session.lock().await;
    let outcome = session.change(
        &params.operation,
        params.matrix_source,
        &params.locks,
        Value::Object(params.fields),
    )?;
    let changes = session.diff()?.change_count();

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "operation": params.operation,
        "matrix_source": params.matrix_source.as_str(),
        "activities": outcome.matrix.activities(),
        "dependencies": outcome.matrix,
        "suppressed": outcome.suppressed,
        "collapsed_group": outcome.collapsed.as_ref().map(|g| json!({
            "collapsed_activity": g.collapsed_activity,
            "members": g.members,
        })),
        "changes_from_original": changes,
    })))
}
