//! MCP tool implementations.

pub mod discover_dependencies;
pub mod matrix_change;
pub mod matrix_diff;
pub mod matrix_export;
pub mod matrix_get;
pub mod matrix_import;
pub mod matrix_status;
pub mod matrix_variants;
pub mod registry;
pub mod session_end;
pub mod session_start;

pub use registry::ToolRegistry;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::session::{MatrixSession, SessionStore, DEFAULT_SESSION};
use crate::types::{McpError, McpResult};

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

fn parse_params<T: DeserializeOwned>(args: Value) -> McpResult<T> {
    serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// Look up (or lazily open) the session a call addresses. The store lock is
/// released before the caller locks the session itself.
async fn open_session(
    store: &Arc<Mutex<SessionStore>>,
    session_id: &str,
) -> McpResult<Arc<Mutex<MatrixSession>>> {
    store.lock().await.get_or_create(session_id)
}

/// Relative paths are taken from the export directory.
fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// The JSON schema fragment shared by every session-scoped tool.
fn session_property() -> Value {
    json!({
        "type": "string",
        "description": "Session to act on (default: \"default\")"
    })
}

fn source_property() -> Value {
    json!({
        "type": "string",
        "enum": ["original", "modified"],
        "description": "Matrix slot; \"modified\" falls back to the original until an edit is made",
        "default": "modified"
    })
}
