//! One user's original/modified matrix pair and the collapse groups needed
//! to undo collapses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use depmatrix::{
    apply_operation, diff, discover_with, CollapsedGroup, DependencyMatrix, DiffReport,
    EditOutcome, Lock, Thresholds,
};

use crate::types::{McpError, McpResult};

/// Which slot a tool reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixSource {
    Original,
    /// The latest edit, or the original while nothing has been edited.
    #[default]
    Modified,
}

impl MatrixSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixSource::Original => "original",
            MatrixSource::Modified => "modified",
        }
    }
}

/// Where the current original came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    Discovery { traces: usize },
    Import,
}

#[derive(Debug)]
pub struct MatrixSession {
    id: String,
    thresholds: Thresholds,
    original: Option<DependencyMatrix>,
    modified: Option<DependencyMatrix>,
    origin: Option<Origin>,
    groups: HashMap<String, CollapsedGroup>,
    edits: usize,
    last_operation: Option<String>,
    started_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl MatrixSession {
    pub fn new(id: &str, thresholds: Thresholds) -> Self {
        Self {
            id: id.to_string(),
            thresholds,
            original: None,
            modified: None,
            origin: None,
            groups: HashMap::new(),
            edits: 0,
            last_operation: None,
            started_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn has_matrix(&self) -> bool {
        self.original.is_some()
    }

    pub fn has_modified(&self) -> bool {
        self.modified.is_some()
    }

    /// Discover a fresh original from `traces`, dropping any previous edits.
    pub fn discover(
        &mut self,
        traces: &[Vec<String>],
        thresholds: Thresholds,
    ) -> McpResult<&DependencyMatrix> {
        let traces = depmatrix::normalize_traces(traces);
        if traces.is_empty() {
            return Err(McpError::InputError("No traces supplied".to_string()));
        }
        let matrix = discover_with(&traces, thresholds)?;
        tracing::debug!(session = %self.id, "Replaced original matrix");
        self.thresholds = thresholds;
        self.origin = Some(Origin::Discovery {
            traces: traces.len(),
        });
        Ok(self.reset(matrix))
    }

    /// Use an externally supplied matrix as the original.
    pub fn import(&mut self, matrix: DependencyMatrix) -> &DependencyMatrix {
        tracing::info!(session = %self.id, activities = matrix.len(), "Imported matrix");
        self.origin = Some(Origin::Import);
        self.reset(matrix)
    }

    fn reset(&mut self, matrix: DependencyMatrix) -> &DependencyMatrix {
        self.modified = None;
        self.groups.clear();
        self.edits = 0;
        self.last_operation = None;
        self.updated_at = Some(Utc::now());
        self.original.insert(matrix)
    }

    pub fn matrix(&self, source: MatrixSource) -> McpResult<&DependencyMatrix> {
        let original = self.original.as_ref().ok_or(McpError::NotReady)?;
        Ok(match source {
            MatrixSource::Original => original,
            MatrixSource::Modified => self.modified.as_ref().unwrap_or(original),
        })
    }

    /// Apply one edit to `source` and publish the result as the new modified
    /// matrix. Nothing is published when the edit fails.
    pub fn change(
        &mut self,
        operation: &str,
        source: MatrixSource,
        locks: &[Lock],
        mut params: Value,
    ) -> McpResult<EditOutcome> {
        if is_decollapse(operation) {
            self.attach_group(&mut params);
        }
        let outcome = apply_operation(operation, self.matrix(source)?, locks, params)?;

        if let Some(group) = &outcome.collapsed {
            self.groups
                .insert(group.collapsed_activity.clone(), group.clone());
        }
        if is_decollapse(operation) {
            self.groups
                .retain(|name, _| outcome.matrix.contains(name));
        }
        self.modified = Some(outcome.matrix.clone());
        self.edits += 1;
        self.last_operation = Some(operation.to_string());
        self.updated_at = Some(Utc::now());
        Ok(outcome)
    }

    /// Supply the recorded group unless the caller passed one explicitly.
    fn attach_group(&self, params: &mut Value) {
        let Some(fields) = params.as_object_mut() else {
            return;
        };
        if fields.get("group").is_some_and(|g| !g.is_null()) {
            return;
        }
        let recorded = fields
            .get("collapsed_activity")
            .and_then(Value::as_str)
            .and_then(|name| self.groups.get(name))
            .and_then(|group| serde_json::to_value(group).ok());
        if let Some(group) = recorded {
            fields.insert("group".to_string(), group);
        }
    }

    /// Original versus modified. Empty until something has been edited.
    pub fn diff(&self) -> McpResult<DiffReport> {
        let original = self.matrix(MatrixSource::Original)?;
        let modified = self.matrix(MatrixSource::Modified)?;
        Ok(diff(original, modified))
    }

    pub fn collapsed_groups(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            has_matrix: self.has_matrix(),
            has_modified: self.has_modified(),
            origin: self.origin.clone(),
            activities: self
                .matrix(MatrixSource::Modified)
                .map(|m| m.activities().to_vec())
                .unwrap_or_default(),
            thresholds: self.thresholds,
            edits: self.edits,
            last_operation: self.last_operation.clone(),
            collapsed_groups: self
                .collapsed_groups()
                .into_iter()
                .map(str::to_string)
                .collect(),
            started_at: self.started_at.to_rfc3339(),
            updated_at: self.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

fn is_decollapse(operation: &str) -> bool {
    matches!(operation, "de-collapse" | "decollapse" | "de_collapse")
}

/// Snapshot reported by `matrix_status` and the sessions resource.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub has_matrix: bool,
    pub has_modified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    pub activities: Vec<String>,
    pub thresholds: Thresholds,
    pub edits: usize,
    pub last_operation: Option<String>,
    pub collapsed_groups: Vec<String>,
    pub started_at: String,
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn traces() -> Vec<Vec<String>> {
        vec![
            vec!["A".into(), "B".into(), "C".into()],
            vec!["A".into(), "B".into(), "D".into()],
        ]
    }

    fn ready() -> MatrixSession {
        let mut session = MatrixSession::new("t", Thresholds::default());
        session.discover(&traces(), Thresholds::default()).unwrap();
        session
    }

    #[test]
    fn test_not_ready_before_discovery() {
        let session = MatrixSession::new("t", Thresholds::default());
        assert!(matches!(
            session.matrix(MatrixSource::Original),
            Err(McpError::NotReady)
        ));
        assert!(matches!(session.diff(), Err(McpError::NotReady)));
    }

    #[test]
    fn test_empty_traces_rejected() {
        let mut session = MatrixSession::new("t", Thresholds::default());
        let err = session
            .discover(&[vec![" ".into()]], Thresholds::default())
            .unwrap_err();
        assert!(matches!(err, McpError::InputError(_)));
    }

    #[test]
    fn test_modified_falls_back_to_original() {
        let session = ready();
        assert_eq!(
            session.matrix(MatrixSource::Modified).unwrap(),
            session.matrix(MatrixSource::Original).unwrap()
        );
        assert!(session.diff().unwrap().is_empty());
    }

    #[test]
    fn test_failed_change_publishes_nothing() {
        let mut session = ready();
        let err = session
            .change("delete", MatrixSource::Original, &[], json!({"activity": "Z"}))
            .unwrap_err();
        assert!(matches!(err, McpError::UnknownActivity(_)));
        assert!(!session.has_modified());
    }

    #[test]
    fn test_chained_edits_from_modified() {
        let mut session = ready();
        session
            .change("delete", MatrixSource::Modified, &[], json!({"activity": "C"}))
            .unwrap();
        session
            .change("delete", MatrixSource::Modified, &[], json!({"activity": "D"}))
            .unwrap();
        let modified = session.matrix(MatrixSource::Modified).unwrap();
        assert_eq!(modified.activities(), &["A", "B"]);
        assert_eq!(session.diff().unwrap().removed_activities, vec!["C", "D"]);
        assert_eq!(session.status().edits, 2);
    }

    #[test]
    fn test_decollapse_uses_recorded_group() {
        let mut session = ready();
        session
            .change(
                "collapse",
                MatrixSource::Original,
                &[],
                json!({"collapsed_activity": "G", "collapse_activities": ["C", "D"]}),
            )
            .unwrap();
        assert_eq!(session.collapsed_groups(), vec!["G"]);
        session
            .change(
                "de-collapse",
                MatrixSource::Modified,
                &[],
                json!({"collapsed_activity": "G"}),
            )
            .unwrap();
        assert_eq!(
            session.matrix(MatrixSource::Modified).unwrap(),
            session.matrix(MatrixSource::Original).unwrap()
        );
        assert!(session.collapsed_groups().is_empty());
    }

    #[test]
    fn test_rediscovery_clears_edits() {
        let mut session = ready();
        session
            .change("skip", MatrixSource::Original, &[], json!({"activity": "B"}))
            .unwrap();
        session.discover(&traces(), Thresholds::default()).unwrap();
        assert!(!session.has_modified());
        assert_eq!(session.status().edits, 0);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_discovery_logged_once_at_info() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            ready();
        });
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("Discovered dependency matrix").count(), 1);
        assert!(!text.contains("Replaced original matrix"));
    }
}
