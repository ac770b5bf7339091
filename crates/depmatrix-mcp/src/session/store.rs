//! Session-keyed registry of matrix sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use depmatrix::Thresholds;

use super::MatrixSession;
use crate::types::{McpError, McpResult};

/// Session used when a tool call names none.
pub const DEFAULT_SESSION: &str = "default";

/// Every live session, each behind its own lock so that one tool call holds
/// exactly one session for its whole read-compute-publish sequence.
pub struct SessionStore {
    export_dir: PathBuf,
    thresholds: Thresholds,
    sessions: HashMap<String, Arc<Mutex<MatrixSession>>>,
}

impl SessionStore {
    pub fn new(export_dir: &Path, thresholds: Thresholds) -> Self {
        Self {
            export_dir: export_dir.to_path_buf(),
            thresholds,
            sessions: HashMap::new(),
        }
    }

    /// Directory relative export paths resolve against.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Thresholds new sessions start with.
    pub fn default_thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Get the session, creating it empty on first use.
    pub fn get_or_create(&mut self, session_id: &str) -> McpResult<Arc<Mutex<MatrixSession>>> {
        validate_session_id(session_id)?;
        if let Some(session) = self.sessions.get(session_id) {
            return Ok(session.clone());
        }
        tracing::info!("Opening matrix session '{session_id}'");
        let session = Arc::new(Mutex::new(MatrixSession::new(session_id, self.thresholds)));
        self.sessions.insert(session_id.to_string(), session.clone());
        Ok(session)
    }

    /// Get an existing session.
    pub fn get(&self, session_id: &str) -> McpResult<Arc<Mutex<MatrixSession>>> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| McpError::SessionNotFound(session_id.to_string()))
    }

    /// Start a session; fails if the id is already live.
    pub fn start(&mut self, session_id: &str) -> McpResult<Arc<Mutex<MatrixSession>>> {
        if self.sessions.contains_key(session_id) {
            return Err(McpError::InvalidParams(format!(
                "Session '{session_id}' already exists"
            )));
        }
        self.get_or_create(session_id)
    }

    /// Drop a session and both of its matrices.
    pub fn end(&mut self, session_id: &str) -> McpResult<()> {
        self.sessions
            .remove(session_id)
            .map(|_| tracing::info!("Closed matrix session '{session_id}'"))
            .ok_or_else(|| McpError::SessionNotFound(session_id.to_string()))
    }

    /// Live session ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn validate_session_id(session_id: &str) -> McpResult<()> {
    let valid = !session_id.is_empty()
        && session_id.len() <= 128
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(McpError::InvalidParams(format!(
            "Invalid session id '{session_id}': use 1-128 letters, digits, '-', '_' or '.'"
        )))
    }
}
