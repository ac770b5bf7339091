//! Error types and JSON-RPC error codes for the MCP server.

use serde_json::Value;

use depmatrix::{DependencyError, SuppressedChange};

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const RESOURCE_NOT_FOUND: i32 = -32802;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const SESSION_NOT_FOUND: i32 = -32851;

    /// Engine: no traces, malformed traces or an unreadable matrix document.
    pub const INPUT_ERROR: i32 = -32860;
    /// Engine: no matrix has been discovered in this session yet.
    pub const NOT_READY: i32 = -32861;
    /// Engine: an operation named an activity absent from the matrix.
    pub const UNKNOWN_ACTIVITY: i32 = -32862;
    /// Engine: every intended change was blocked by a lock.
    pub const LOCK_CONFLICT: i32 = -32863;
    /// Engine: missing or malformed operation fields.
    pub const OPERATION_INVALID: i32 = -32864;
    /// Engine: a matrix invariant was violated.
    pub const INTERNAL_INCONSISTENCY: i32 = -32865;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("No matrix available yet, call discover_dependencies or matrix_import first")]
    NotReady,

    #[error("Unknown activity: {0}")]
    UnknownActivity(String),

    #[error("Lock conflict: {message}")]
    LockConflict {
        message: String,
        suppressed: Vec<SuppressedChange>,
    },

    #[error("Invalid operation: {0}")]
    OperationInvalid(String),

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::SessionNotFound(_) => SESSION_NOT_FOUND,
            McpError::InputError(_) => INPUT_ERROR,
            McpError::NotReady => NOT_READY,
            McpError::UnknownActivity(_) => UNKNOWN_ACTIVITY,
            McpError::LockConflict { .. } => LOCK_CONFLICT,
            McpError::OperationInvalid(_) => OPERATION_INVALID,
            McpError::InternalInconsistency(_) => INTERNAL_INCONSISTENCY,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    /// Structured detail attached to the JSON-RPC error object.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::LockConflict { suppressed, .. } => serde_json::to_value(suppressed)
                .ok()
                .map(|list| serde_json::json!({ "suppressed": list })),
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: self.data(),
            },
        }
    }
}

impl From<DependencyError> for McpError {
    fn from(e: DependencyError) -> Self {
        let message = e.to_string();
        match e {
            DependencyError::InputError(m) => McpError::InputError(m),
            DependencyError::NotReady => McpError::NotReady,
            DependencyError::UnknownActivity(name) => McpError::UnknownActivity(name),
            DependencyError::LockConflict { suppressed } => McpError::LockConflict {
                message: message
                    .trim_start_matches("Lock conflict: ")
                    .to_string(),
                suppressed,
            },
            DependencyError::InvalidParams(m) => McpError::OperationInvalid(m),
            DependencyError::InternalInconsistency(m) => McpError::InternalInconsistency(m),
            DependencyError::Io(err) => McpError::InputError(err.to_string()),
            DependencyError::Json(err) => McpError::InputError(err.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
