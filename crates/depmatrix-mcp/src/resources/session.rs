//! Resources: depmatrix://sessions and depmatrix://session/{id}/{view}

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::json;

use crate::session::{MatrixSource, SessionStore};
use crate::types::{McpError, McpResult, ReadResourceResult, ResourceContent};

/// What a per-session URI points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    Matrix(MatrixSource),
    Diff,
}

impl SessionView {
    pub fn parse(view: &str) -> Option<Self> {
        match view {
            "original" => Some(SessionView::Matrix(MatrixSource::Original)),
            "modified" => Some(SessionView::Matrix(MatrixSource::Modified)),
            "diff" => Some(SessionView::Diff),
            _ => None,
        }
    }
}

pub async fn read_sessions(store: &Arc<Mutex<SessionStore>>) -> McpResult<ReadResourceResult> {
    let sessions = {
        let store = store.lock().await;
        store
            .ids()
            .into_iter()
            .map(|id| store.get(&id))
            .collect::<McpResult<Vec<_>>>()?
    };

    let mut statuses = Vec::with_capacity(sessions.len());
    for session in sessions {
        statuses.push(session.lock().await.status());
    }

    let content = json!({
        "session_count": statuses.len(),
        "sessions": statuses,
    });
    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(
            "depmatrix://sessions".to_string(),
            &content,
        )],
    })
}

pub async fn read_session(
    session_id: &str,
    view: SessionView,
    store: &Arc<Mutex<SessionStore>>,
) -> McpResult<ReadResourceResult> {
    let session = store.lock().await.get(session_id)?;
    let session = session.lock().await;

    let (name, content) = match view {
        SessionView::Matrix(source) => {
            let matrix = session.matrix(source)?;
            (
                source.as_str(),
                serde_json::to_value(matrix).map_err(|e| McpError::InternalError(e.to_string()))?,
            )
        }
        SessionView::Diff => (
            "diff",
            serde_json::to_value(session.diff()?)
                .map_err(|e| McpError::InternalError(e.to_string()))?,
        ),
    };

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::json(
            format!("depmatrix://session/{session_id}/{name}"),
            &content,
        )],
    })
}
