//! Tool registration and dispatch.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::session::SessionStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{
    discover_dependencies, matrix_change, matrix_diff, matrix_export, matrix_get, matrix_import,
    matrix_status, matrix_variants, session_end, session_start,
};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            discover_dependencies::definition(),
            matrix_change::definition(),
            matrix_diff::definition(),
            matrix_get::definition(),
            matrix_status::definition(),
            matrix_export::definition(),
            matrix_import::definition(),
            matrix_variants::definition(),
            session_start::definition(),
            session_end::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        store: &Arc<Mutex<SessionStore>>,
    ) -> McpResult<ToolCallResult> {
        let args = match arguments {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(args) => args,
        };

        tracing::debug!(tool = name, "Tool call");
        match name {
            "discover_dependencies" => discover_dependencies::execute(args, store).await,
            "matrix_change" => matrix_change::execute(args, store).await,
            "matrix_diff" => matrix_diff::execute(args, store).await,
            "matrix_get" => matrix_get::execute(args, store).await,
            "matrix_status" => matrix_status::execute(args, store).await,
            "matrix_export" => matrix_export::execute(args, store).await,
            "matrix_import" => matrix_import::execute(args, store).await,
            "matrix_variants" => matrix_variants::execute(args, store).await,
            "session_start" => session_start::execute(args, store).await,
            "session_end" => session_end::execute(args, store).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
