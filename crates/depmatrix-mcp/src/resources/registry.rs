//! Resource registration and dispatch.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::SessionStore;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

use super::session::{self, SessionView};
use super::templates::{self, SCHEME};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
        templates::list_templates()
    }

    pub fn list_resources() -> Vec<ResourceDefinition> {
        templates::list_resources()
    }

    pub async fn read(
        uri: &str,
        store: &Arc<Mutex<SessionStore>>,
    ) -> McpResult<ReadResourceResult> {
        let Some(path) = uri.strip_prefix(SCHEME) else {
            return Err(McpError::ResourceNotFound(uri.to_string()));
        };

        if path == "sessions" {
            return session::read_sessions(store).await;
        }

        if let Some(rest) = path.strip_prefix("session/") {
            let (id, view) = rest.rsplit_once('/').ok_or_else(|| {
                McpError::InvalidParams(
                    "Session URI must be depmatrix://session/{id}/{original|modified|diff}"
                        .to_string(),
                )
            })?;
            let view = SessionView::parse(view)
                .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;
            return session::read_session(id, view, store).await;
        }

        Err(McpError::ResourceNotFound(uri.to_string()))
    }
}
